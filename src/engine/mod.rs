// ==========================================
// 供应链碳足迹计算器 - 引擎层
// ==========================================
// 职责: 排放计算、持久化状态迁移
// 红线: Engine 不读写存储,不依赖界面;输入相同则输出逐位相同
// ==========================================

pub mod calculator;
pub mod migrator;

// 重导出核心引擎
pub use calculator::{compute, EmissionCalculator};
pub use migrator::{MigrationStep, StateMigrator};
