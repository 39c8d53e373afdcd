// ==========================================
// 供应链碳足迹计算器 - 配置层
// ==========================================
// 职责: 排放因子契约、默认因子、因子覆写管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod emission_factors;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use emission_factors::{EmissionFactorTable, EmissionFactors, FactorOverrides};
