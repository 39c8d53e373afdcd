// ==========================================
// 供应链碳足迹计算器 - 应用状态
// ==========================================
// 职责: 持有共享数据库连接,组装配置管理器与快照仓储
// 说明: CLI 与嵌入方都从这里拿到会话,避免各自打开连接
// ==========================================

use crate::api::calculator_api::CalculatorSession;
use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::config::emission_factors::EmissionFactors;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::migrator::StateMigrator;
use crate::repository::state_repo::CalculatorStateRepository;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "FOLKCHARM_IMPACT_DB_PATH";

// ==========================================
// AppState - 应用共享状态
// ==========================================
pub struct AppState {
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 打开数据库并初始化各组件
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // 界面语言来自配置,缺省 en
        match config_manager.get_locale() {
            Ok(locale) => {
                let applied = crate::i18n::set_locale(&locale);
                tracing::debug!(requested = %locale, applied, "界面语言已设置");
            }
            Err(e) => tracing::warn!("读取界面语言失败，使用默认语言: {}", e),
        }

        Ok(Self {
            db_path,
            conn,
            config_manager,
        })
    }

    /// 打开计算器会话（共享连接）
    pub fn open_session(
        &self,
        migrator: StateMigrator,
    ) -> ApiResult<CalculatorSession<CalculatorStateRepository>> {
        let repo = CalculatorStateRepository::from_connection(self.conn.clone());
        CalculatorSession::open(repo, migrator)
    }

    /// 当前生效的排放因子（默认值 + 覆写）
    pub fn emission_factors(&self) -> ApiResult<EmissionFactors> {
        self.config_manager
            .load_emission_factors()
            .map_err(|e| ApiError::InternalError(format!("加载排放因子失败: {}", e)))
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 FOLKCHARM_IMPACT_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./folkcharm_impact.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("folkcharm-impact-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("folkcharm-impact");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("folkcharm_impact.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_manager::config_keys;
    use crate::config::emission_factors::EmissionFactorTable;
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_shares_connection() {
        // AppState::new 会切换全局 locale
        let _guard = crate::i18n::LOCALE_TEST_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let tmp = NamedTempFile::new().unwrap();
        let state = AppState::new(tmp.path().to_string_lossy().to_string()).unwrap();

        state
            .config_manager
            .set_config_value(config_keys::EF_GRID_ELECTRICITY, "0.5")
            .unwrap();
        assert_eq!(state.emission_factors().unwrap().grid_electricity(), 0.5);

        let migrator = StateMigrator::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let mut session = state.open_session(migrator).unwrap();
        session.update(|r| r.production.item_quantity = 3).unwrap();

        let reopened = state.open_session(migrator).unwrap();
        assert_eq!(reopened.record().production.item_quantity, 3);
    }
}
