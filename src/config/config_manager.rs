// ==========================================
// 供应链碳足迹计算器 - 配置管理器
// ==========================================
// 职责: 排放因子覆写的加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// 红线: 配置缺失/格式错误/负数 → 回退默认值并告警,不中断计算
// ==========================================

use crate::config::emission_factors::EmissionFactors;
use crate::db::{init_schema, open_sqlite_connection};
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接执行建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            init_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法,供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 删除 global scope 的配置值（恢复默认）
    ///
    /// # 返回
    /// - true: 删除了已有配置
    /// - false: 配置本不存在
    pub fn remove_config_value(&self, key: &str) -> Result<bool, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
        )?;
        Ok(affected > 0)
    }

    /// 读取非负因子配置,带默认值
    ///
    /// 配置缺失 → default
    /// 无法解析 / NaN / 无穷 / 负数 → default + warn
    fn get_factor_or_default(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default_value = default,
                    "因子配置非法，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 加载排放因子（默认值 + config_kv 覆写）
    pub fn load_emission_factors(&self) -> Result<EmissionFactors, Box<dyn Error>> {
        let d = EmissionFactors::default();

        let factors = EmissionFactors {
            transport_light: self.get_factor_or_default(config_keys::EF_TRANSPORT_LIGHT, d.transport_light)?,
            transport_heavy: self.get_factor_or_default(config_keys::EF_TRANSPORT_HEAVY, d.transport_heavy)?,
            recycled_yarn: self.get_factor_or_default(config_keys::EF_RECYCLED_YARN, d.recycled_yarn)?,
            leftover_cotton: self.get_factor_or_default(config_keys::EF_LEFTOVER_COTTON, d.leftover_cotton)?,
            virgin_cotton: self.get_factor_or_default(config_keys::EF_VIRGIN_COTTON, d.virgin_cotton)?,
            soc_per_hectare: self.get_factor_or_default(config_keys::SOC_EMISSIONS_PER_HA, d.soc_per_hectare)?,
            grid_electricity: self.get_factor_or_default(config_keys::EF_GRID_ELECTRICITY, d.grid_electricity)?,
            water_tap_per_liter: self.get_factor_or_default(config_keys::EF_WATER_TAP, d.water_tap_per_liter)?,
            water_soft_per_liter: self.get_factor_or_default(config_keys::EF_WATER_SOFT, d.water_soft_per_liter)?,
            accessory_weight_per_item_kg: self.get_factor_or_default(
                config_keys::ACCESSORY_WEIGHT_PER_ITEM_KG,
                d.accessory_weight_per_item_kg,
            )?,
            accessory: self.get_factor_or_default(config_keys::EF_ACCESSORY, d.accessory)?,
            sewing_machine_power_kw: self.get_factor_or_default(
                config_keys::SEWING_MACHINE_POWER_KW,
                d.sewing_machine_power_kw,
            )?,
            wage_rate_per_hour: self.get_factor_or_default(config_keys::WAGE_RATE_PER_HOUR, d.wage_rate_per_hour)?,
        };

        tracing::debug!(?factors, "排放因子已加载");
        Ok(factors)
    }

    /// 获取界面语言（默认 en）
    pub fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(config_keys::LOCALE)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "en".to_string()))
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 导出报表时附带因子口径,保证结果可复现
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 覆盖现有的 global 配置,快照中没有的键保持不变
    /// - `__meta_` 前缀的键为元信息,不回写
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            if key.starts_with("__meta_") {
                continue;
            }
            let affected = tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
            count += affected;
        }

        tx.commit()?;

        Ok(count)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 运输
    pub const EF_TRANSPORT_LIGHT: &str = "ef_transport_light";
    pub const EF_TRANSPORT_HEAVY: &str = "ef_transport_heavy";

    // 原材料
    pub const EF_RECYCLED_YARN: &str = "ef_recycled_yarn";
    pub const EF_LEFTOVER_COTTON: &str = "ef_leftover_cotton";
    pub const EF_VIRGIN_COTTON: &str = "ef_virgin_cotton";
    pub const SOC_EMISSIONS_PER_HA: &str = "soc_emissions_per_ha"; // 占位系数

    // 能源与用水
    pub const EF_GRID_ELECTRICITY: &str = "ef_grid_electricity";
    pub const EF_WATER_TAP: &str = "ef_water_tap";   // 每升
    pub const EF_WATER_SOFT: &str = "ef_water_soft"; // 每升

    // 生产
    pub const ACCESSORY_WEIGHT_PER_ITEM_KG: &str = "accessory_weight_per_item_kg";
    pub const EF_ACCESSORY: &str = "ef_accessory"; // 占位系数
    pub const SEWING_MACHINE_POWER_KW: &str = "sewing_machine_power_kw";
    pub const WAGE_RATE_PER_HOUR: &str = "wage_rate_per_hour";

    // 界面
    pub const LOCALE: &str = "locale";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::emission_factors::EF_GRID_ELECTRICITY;

    fn memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_table_empty() {
        let manager = memory_manager();
        let factors = manager.load_emission_factors().unwrap();
        assert_eq!(factors, EmissionFactors::default());
        assert_eq!(manager.get_locale().unwrap(), "en");
    }

    #[test]
    fn test_override_and_remove() {
        let manager = memory_manager();
        manager.set_config_value(config_keys::EF_GRID_ELECTRICITY, "0.5").unwrap();
        assert_eq!(manager.load_emission_factors().unwrap().grid_electricity, 0.5);

        assert!(manager.remove_config_value(config_keys::EF_GRID_ELECTRICITY).unwrap());
        assert_eq!(
            manager.load_emission_factors().unwrap().grid_electricity,
            EF_GRID_ELECTRICITY
        );
        assert!(!manager.remove_config_value(config_keys::EF_GRID_ELECTRICITY).unwrap());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let manager = memory_manager();
        manager.set_config_value(config_keys::EF_GRID_ELECTRICITY, "-1").unwrap();
        manager.set_config_value(config_keys::EF_ACCESSORY, "abc").unwrap();
        manager.set_config_value(config_keys::EF_TRANSPORT_LIGHT, "NaN").unwrap();

        let factors = manager.load_emission_factors().unwrap();
        let defaults = EmissionFactors::default();
        assert_eq!(factors.grid_electricity, defaults.grid_electricity);
        assert_eq!(factors.accessory, defaults.accessory);
        assert_eq!(factors.transport_light, defaults.transport_light);
    }

    #[test]
    fn test_snapshot_round_trip_skips_meta_keys() {
        let source = memory_manager();
        source.set_config_value(config_keys::EF_WATER_TAP, "0.0006").unwrap();
        let snapshot = source.get_config_snapshot().unwrap();

        let target = memory_manager();
        let mut map: HashMap<String, String> = serde_json::from_str(&snapshot).unwrap();
        map.insert("__meta_exported_by".to_string(), "test".to_string());
        let restored = target
            .restore_config_from_snapshot(&serde_json::to_string(&map).unwrap())
            .unwrap();

        assert_eq!(restored, 1);
        assert_eq!(target.load_emission_factors().unwrap().water_tap_per_liter, 0.0006);
        assert_eq!(target.get_global_config_value("__meta_exported_by").unwrap(), None);
    }
}
