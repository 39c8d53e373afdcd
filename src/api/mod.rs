// ==========================================
// 供应链碳足迹计算器 - API 层
// ==========================================
// 职责: 提供会话与校验接口,供界面 / CLI 调用
// ==========================================

pub mod calculator_api;
pub mod error;
pub mod validator;

// 重导出核心类型
pub use calculator_api::CalculatorSession;
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use validator::{violation_codes, InputValidator, WizardStep};
