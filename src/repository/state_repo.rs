// ==========================================
// 供应链碳足迹计算器 - 输入快照仓储
// ==========================================
// 职责: 以版本化 key 保存/读取整条输入记录（JSON 文本）
// 红线: Repository 不含业务逻辑,不做形状迁移
//       读出的原始文本交给 engine::migrator 解释
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema};
use crate::domain::record::InputRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// StateStore Trait
// ==========================================
// 用途: 会话层只依赖此接口,便于测试替换
// 实现者: CalculatorStateRepository（rusqlite）、MemoryStateStore（内存）
pub trait StateStore: Send + Sync {
    /// 读取原始快照文本
    ///
    /// # 返回
    /// - Ok(Some(String)): 找到快照
    /// - Ok(None): 该 key 无快照
    /// - Err: 存储错误
    fn load_raw(&self, key: &str) -> RepositoryResult<Option<String>>;

    /// 写入原始快照文本（覆盖）
    fn save_raw(&self, key: &str, value: &str) -> RepositoryResult<()>;

    /// 删除快照,返回是否确有删除
    fn delete(&self, key: &str) -> RepositoryResult<bool>;

    /// 序列化并保存整条记录
    fn save(&self, key: &str, record: &InputRecord) -> RepositoryResult<()> {
        let json = serde_json::to_string(record)?;
        self.save_raw(key, &json)
    }
}

// ==========================================
// CalculatorStateRepository - SQLite 实现
// ==========================================
pub struct CalculatorStateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CalculatorStateRepository {
    /// 打开数据库并确保 schema 存在
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = Connection::open(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例（调用方负责 init_schema）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 列出所有快照 key（按 key 升序）
    pub fn list_keys(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key FROM state_kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// 快照最后更新时间（SQLite datetime 文本）
    pub fn updated_at(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let ts = conn
            .query_row(
                "SELECT updated_at FROM state_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(ts)
    }
}

impl StateStore for CalculatorStateRepository {
    fn load_raw(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM state_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_raw(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO state_kv (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        tracing::debug!(key = key, bytes = value.len(), "输入快照已保存");
        Ok(())
    }

    fn delete(&self, key: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM state_kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }
}

// ==========================================
// MemoryStateStore - 内存实现（测试 / 临时会话）
// ==========================================
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以预置快照创建（用于模拟历史版本数据）
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut map) = store.entries.lock() {
            map.insert(key.to_string(), value.to_string());
        }
        store
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl StateStore for MemoryStateStore {
    fn load_raw(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn save_raw(&self, key: &str, value: &str) -> RepositoryResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> RepositoryResult<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }
}
