// ==========================================
// 供应链碳足迹计算器 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 手工纺织品供应链的批次 / 月度碳足迹估算
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 通用工具 - 数值归一化 / JSON 宽容读取
pub mod common;

// 领域层 - 输入记录与计算结果
pub mod domain;

// 数据仓储层 - 快照存取
pub mod repository;

// 引擎层 - 排放计算与状态迁移
pub mod engine;

// 配置层 - 排放因子
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 会话与校验
pub mod api;

// 报告摘要与导出
pub mod report;

// 应用层 - 组件组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AreaUnit, CalculationScope, EmissionCategory, VehicleClass, WaterSource};

// 领域实体
pub use domain::{
    CalculationResult, ElectricityEntry, InputRecord, LaborStats, MaterialBreakdown, PeriodMeta,
    TransportLeg, WaterEntry,
};

// 引擎
pub use engine::{compute, EmissionCalculator, MigrationStep, StateMigrator};

// 配置
pub use config::{EmissionFactorTable, EmissionFactors, FactorOverrides};

// API
pub use api::{ApiError, ApiResult, CalculatorSession, InputValidator, WizardStep};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Folkcharm Impact Calculator";

// 输入快照存储 key（版本化,结构变化时递增）
pub const STATE_STORAGE_KEY: &str = "folkcharm_calc_state_v3";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(STATE_STORAGE_KEY.ends_with("_v3"));
    }
}
