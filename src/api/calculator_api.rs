// ==========================================
// 供应链碳足迹计算器 - 计算器会话 API
// ==========================================
// 职责:
// 1. 打开会话时读取并迁移持久化快照
// 2. 每次编辑后整对象写回（write-after-every-edit）
// 3. 按需调用引擎得到结果（结果不落库）
// 红线: 持久化失败不丢内存中的编辑,错误向上返回由调用方决定是否重试
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{InputValidator, WizardStep};
use crate::config::emission_factors::EmissionFactorTable;
use crate::domain::record::{ElectricityEntry, InputRecord, TransportLeg, WaterEntry};
use crate::domain::result::CalculationResult;
use crate::engine::calculator::EmissionCalculator;
use crate::engine::migrator::StateMigrator;
use crate::repository::state_repo::StateStore;
use crate::STATE_STORAGE_KEY;

// ==========================================
// CalculatorSession - 单用户计算会话
// ==========================================
pub struct CalculatorSession<S: StateStore> {
    store: S,
    key: String,
    migrator: StateMigrator,
    calculator: EmissionCalculator,
    validator: InputValidator,
    record: InputRecord,
}

impl<S: StateStore> CalculatorSession<S> {
    /// 以默认存储 key 打开会话
    pub fn open(store: S, migrator: StateMigrator) -> ApiResult<Self> {
        Self::open_with_key(store, STATE_STORAGE_KEY, migrator)
    }

    /// 打开会话
    ///
    /// # 返回
    /// - 有快照: 迁移后的记录（损坏快照降级为空记录）
    /// - 无快照: 空记录（不立即写入）
    /// - Err: 存储读取失败
    pub fn open_with_key(store: S, key: &str, migrator: StateMigrator) -> ApiResult<Self> {
        let record = match store.load_raw(key)? {
            Some(raw) => migrator.migrate_str(&raw),
            None => {
                tracing::info!(key = key, "未找到输入快照，使用空记录");
                migrator.default_record()
            }
        };

        tracing::info!(
            key = key,
            legs = record.logistics.len(),
            electricity_entries = record.electricity.len(),
            water_entries = record.water.len(),
            "计算器会话已打开"
        );

        Ok(Self {
            store,
            key: key.to_string(),
            migrator,
            calculator: EmissionCalculator::new(),
            validator: InputValidator::new(),
            record,
        })
    }

    /// 当前输入记录
    pub fn record(&self) -> &InputRecord {
        &self.record
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// 修改记录并整对象写回
    pub fn update<F>(&mut self, edit: F) -> ApiResult<()>
    where
        F: FnOnce(&mut InputRecord),
    {
        edit(&mut self.record);
        self.persist()
    }

    /// 用外部快照替换当前记录（导入）,快照同样经过迁移
    pub fn import_snapshot(&mut self, raw: &str) -> ApiResult<()> {
        self.record = self.migrator.migrate_str(raw);
        tracing::info!(key = %self.key, "已导入输入快照");
        self.persist()
    }

    /// 重新开始: 清空为默认记录并写回
    pub fn restart(&mut self) -> ApiResult<()> {
        self.record = self.migrator.default_record();
        tracing::info!(key = %self.key, "计算器已重置");
        self.persist()
    }

    // ===== 运输段 =====

    /// 追加运输段,返回条目 id
    pub fn add_transport_leg(&mut self, leg: TransportLeg) -> ApiResult<String> {
        let id = leg.id.clone();
        self.record.logistics.entries.push(leg);
        self.persist()?;
        Ok(id)
    }

    /// 按 id 删除运输段
    pub fn remove_transport_leg(&mut self, id: &str) -> ApiResult<()> {
        let entries = &mut self.record.logistics.entries;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(ApiError::NotFound(format!("运输段(id={})不存在", id)));
        }
        self.persist()
    }

    /// 运输段为空时按原材料预填
    ///
    /// # 返回
    /// - 新增的运输段数量（已有运输段时为 0,不做任何修改）
    pub fn seed_transport_legs(&mut self) -> ApiResult<usize> {
        if !self.record.logistics.is_empty() {
            return Ok(0);
        }
        let legs = self.record.materials.seeded_transport_legs();
        let count = legs.len();
        self.record.logistics.entries = legs;
        self.persist()?;
        Ok(count)
    }

    // ===== 电力 =====

    pub fn add_electricity_entry(&mut self, entry: ElectricityEntry) -> ApiResult<String> {
        let id = entry.id.clone();
        self.record.electricity.entries.push(entry);
        self.persist()?;
        Ok(id)
    }

    pub fn remove_electricity_entry(&mut self, id: &str) -> ApiResult<()> {
        let entries = &mut self.record.electricity.entries;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(ApiError::NotFound(format!("电力条目(id={})不存在", id)));
        }
        self.persist()
    }

    // ===== 用水 =====

    pub fn add_water_entry(&mut self, entry: WaterEntry) -> ApiResult<String> {
        let id = entry.id.clone();
        self.record.water.entries.push(entry);
        self.persist()?;
        Ok(id)
    }

    pub fn remove_water_entry(&mut self, id: &str) -> ApiResult<()> {
        let entries = &mut self.record.water.entries;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(ApiError::NotFound(format!("用水条目(id={})不存在", id)));
        }
        self.persist()
    }

    // ===== 计算 / 校验 =====

    /// 基于当前记录计算结果
    pub fn results<F>(&self, factors: &F) -> CalculationResult
    where
        F: EmissionFactorTable + ?Sized,
    {
        self.calculator.compute(&self.record, factors)
    }

    /// 校验向导步骤
    pub fn validate_step(&self, step: WizardStep) -> ApiResult<()> {
        self.validator.validate_step(&self.record, step)
    }

    /// 整条记录写回存储
    fn persist(&self) -> ApiResult<()> {
        self.store.save(&self.key, &self.record).map_err(|e| {
            tracing::warn!(key = %self.key, error = %e, "输入快照写回失败");
            ApiError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::emission_factors::EmissionFactors;
    use crate::domain::types::{EmissionCategory, VehicleClass};
    use crate::repository::state_repo::MemoryStateStore;
    use chrono::NaiveDate;

    fn migrator() -> StateMigrator {
        StateMigrator::new(NaiveDate::from_ymd_opt(2026, 2, 14).unwrap())
    }

    #[test]
    fn test_open_without_snapshot_uses_empty_record() {
        let session = CalculatorSession::open(MemoryStateStore::new(), migrator()).unwrap();
        assert_eq!(session.record(), &migrator().default_record());
        assert_eq!(session.store().load_raw(STATE_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_every_edit_is_persisted() {
        let mut session = CalculatorSession::open(MemoryStateStore::new(), migrator()).unwrap();
        session
            .update(|r| r.materials.recycled_yarn.weight_kg = 4.0)
            .unwrap();
        let id = session
            .add_transport_leg(TransportLeg::new("Studio", 4.0, 10.0, VehicleClass::Light))
            .unwrap();

        let raw = session.store().load_raw(STATE_STORAGE_KEY).unwrap().unwrap();
        let stored: InputRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(&stored, session.record());

        session.remove_transport_leg(&id).unwrap();
        assert!(session.record().logistics.is_empty());
        assert!(matches!(
            session.remove_transport_leg(&id),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_seed_only_when_empty() {
        let mut session = CalculatorSession::open(MemoryStateStore::new(), migrator()).unwrap();
        session
            .update(|r| r.materials.farmer_cotton.weight_kg = 30.0)
            .unwrap();
        assert_eq!(session.seed_transport_legs().unwrap(), 1);
        assert_eq!(session.seed_transport_legs().unwrap(), 0);
        assert_eq!(session.record().logistics.entries[0].description, "Farm to Spinner");
    }

    #[test]
    fn test_restart_clears_and_persists() {
        let mut session = CalculatorSession::open(MemoryStateStore::new(), migrator()).unwrap();
        session
            .add_electricity_entry(ElectricityEntry::new("Studio", 12.0))
            .unwrap();
        session.restart().unwrap();

        assert_eq!(session.record(), &migrator().default_record());
        let raw = session.store().load_raw(STATE_STORAGE_KEY).unwrap().unwrap();
        assert_eq!(migrator().migrate_str(&raw), migrator().default_record());
    }

    #[test]
    fn test_results_follow_record() {
        let mut session = CalculatorSession::open(MemoryStateStore::new(), migrator()).unwrap();
        session
            .add_electricity_entry(ElectricityEntry::new("Studio", 10.0))
            .unwrap();
        let result = session.results(&EmissionFactors::default());
        assert!((result.category(EmissionCategory::Electricity) - 3.99).abs() < 1e-9);
    }
}
