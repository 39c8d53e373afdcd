// ==========================================
// 供应链碳足迹计算器 - 应用层
// ==========================================
// 职责: 组装数据库、配置与会话,供 CLI / 嵌入方使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
