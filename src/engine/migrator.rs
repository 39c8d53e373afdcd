// ==========================================
// 供应链碳足迹计算器 - 持久化状态迁移器
// ==========================================
// 职责: 任意历史版本的持久化快照 → 当前版本 InputRecord
// 红线:
// - 全函数: 任何输入都返回合法记录,绝不向展示层抛错
// - 确定性、无副作用: 读写存储由调用方负责,"今天" 由调用方注入
// - 每条规则独立且幂等
// ==========================================
// 规则（按顺序）:
// R1 logistics 为旧版固定路线形状（无 entries）→ 空动态列表
// R2 缺少 electricity → 空列表
// R3 缺少 water → 空列表
// R4 缺少 meta → {batch, today, today}；缺少 startDate 但有旧版 date → 复制到起止日期
// R5 存在旧版 delivery → 删除
// R6 解码失败 → 默认空记录 + 记录日志
// ==========================================

use crate::common::json_utils::{field, read_array, read_count, read_number, read_optional_string, read_string};
use crate::domain::record::{
    new_entry_id, ElectricityEntry, EntryList, FarmerCottonInput, InputRecord, MaterialInputs,
    PeriodMeta, ProductionInputs, TransportLeg, WaterEntry, WeightInput,
};
use crate::domain::types::{CalculationScope, VehicleClass, WaterSource};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

// ==========================================
// MigrationStep - 已应用的迁移步骤（可解释性）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationStep {
    ResetFixedRouteLogistics,  // R1
    AddedElectricitySection,   // R2
    AddedWaterSection,         // R3
    SynthesizedMeta,           // R4: 缺少 meta
    CopiedLegacyDate,          // R4: 旧版单日期字段
    FilledMissingPeriodDate,   // R4: 起止日期缺一
    SwappedReversedPeriod,     // 起始日期晚于结束日期
    RemovedDeliverySection,    // R5
    ReplacedNonObjectRoot,     // 根节点不是对象
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MigrationStep::ResetFixedRouteLogistics => "RESET_FIXED_ROUTE_LOGISTICS",
            MigrationStep::AddedElectricitySection => "ADDED_ELECTRICITY_SECTION",
            MigrationStep::AddedWaterSection => "ADDED_WATER_SECTION",
            MigrationStep::SynthesizedMeta => "SYNTHESIZED_META",
            MigrationStep::CopiedLegacyDate => "COPIED_LEGACY_DATE",
            MigrationStep::FilledMissingPeriodDate => "FILLED_MISSING_PERIOD_DATE",
            MigrationStep::SwappedReversedPeriod => "SWAPPED_REVERSED_PERIOD",
            MigrationStep::RemovedDeliverySection => "REMOVED_DELIVERY_SECTION",
            MigrationStep::ReplacedNonObjectRoot => "REPLACED_NON_OBJECT_ROOT",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// StateMigrator - 状态迁移器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct StateMigrator {
    today: NaiveDate,
}

impl StateMigrator {
    /// 创建迁移器
    ///
    /// # 参数
    /// - today: 合成默认期间时使用的日期（由调用方注入,保证纯函数）
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// 以本地日期创建迁移器
    pub fn for_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    fn today_str(&self) -> String {
        self.today.format("%Y-%m-%d").to_string()
    }

    /// 默认空记录
    pub fn default_record(&self) -> InputRecord {
        InputRecord::empty(self.today)
    }

    // ==========================================
    // 入口
    // ==========================================

    /// 从原始字节迁移（R6: 解码失败降级为默认记录）
    pub fn migrate_bytes(&self, raw: &[u8]) -> InputRecord {
        match serde_json::from_slice::<Value>(raw) {
            Ok(value) => self.migrate_value(value),
            Err(e) => {
                tracing::warn!(error = %e, bytes = raw.len(), "持久化状态解码失败，使用默认空记录");
                self.default_record()
            }
        }
    }

    /// 从 JSON 字符串迁移（R6: 解码失败降级为默认记录）
    pub fn migrate_str(&self, raw: &str) -> InputRecord {
        self.migrate_bytes(raw.as_bytes())
    }

    /// 从已解码的 JSON 值迁移
    pub fn migrate_value(&self, value: Value) -> InputRecord {
        if !value.is_object() {
            tracing::warn!(kind = json_kind(&value), "持久化状态根节点不是对象，使用默认空记录");
            return self.default_record();
        }

        let (normalized, steps) = self.normalize(value);
        if !steps.is_empty() {
            let applied: Vec<String> = steps.iter().map(|s| s.to_string()).collect();
            tracing::info!(steps = ?applied, "持久化状态已迁移到当前版本");
        }

        self.read_record(&normalized)
    }

    // ==========================================
    // 形状归一化（R1-R5）
    // ==========================================

    /// 对 JSON 值应用迁移规则,返回归一化后的值与已应用步骤
    ///
    /// 对当前版本的快照再次执行时不产生任何步骤（幂等）
    pub fn normalize(&self, value: Value) -> (Value, Vec<MigrationStep>) {
        let mut steps = Vec::new();

        let mut root = match value {
            Value::Object(map) => map,
            _ => {
                steps.push(MigrationStep::ReplacedNonObjectRoot);
                Map::new()
            }
        };

        self.normalize_logistics(&mut root, &mut steps);
        self.ensure_entry_section(&mut root, "electricity", MigrationStep::AddedElectricitySection, &mut steps);
        self.ensure_entry_section(&mut root, "water", MigrationStep::AddedWaterSection, &mut steps);
        self.normalize_meta(&mut root, &mut steps);

        // R5: 旧版 delivery 已被通用运输段取代
        if root.remove("delivery").is_some() {
            steps.push(MigrationStep::RemovedDeliverySection);
        }

        for step in &steps {
            tracing::debug!(step = %step, "迁移规则已应用");
        }

        (Value::Object(root), steps)
    }

    /// R1: logistics 缺少动态列表 → 空列表
    fn normalize_logistics(&self, root: &mut Map<String, Value>, steps: &mut Vec<MigrationStep>) {
        let has_entries = root
            .get("logistics")
            .and_then(|l| l.get("entries"))
            .map(Value::is_array)
            .unwrap_or(false);

        if has_entries {
            return;
        }

        match root.get("logistics") {
            Some(Value::Null) | None => {
                root.insert("logistics".to_string(), json!({ "entries": [] }));
            }
            Some(_) => {
                // 旧版固定路线（farmToSpinner 等）不做转换,直接清空
                root.insert("logistics".to_string(), json!({ "entries": [] }));
                steps.push(MigrationStep::ResetFixedRouteLogistics);
            }
        }
    }

    /// R2/R3: 缺少动态列表区块 → 空列表
    fn ensure_entry_section(
        &self,
        root: &mut Map<String, Value>,
        key: &str,
        step: MigrationStep,
        steps: &mut Vec<MigrationStep>,
    ) {
        let has_entries = root
            .get(key)
            .and_then(|s| s.get("entries"))
            .map(Value::is_array)
            .unwrap_or(false);

        if !has_entries {
            root.insert(key.to_string(), json!({ "entries": [] }));
            steps.push(step);
        }
    }

    /// R4: 期间元数据
    fn normalize_meta(&self, root: &mut Map<String, Value>, steps: &mut Vec<MigrationStep>) {
        let legacy_root_date = root.remove("date").and_then(non_empty_string);

        let mut meta = match root.remove("meta") {
            Some(Value::Object(m)) => m,
            _ => {
                steps.push(MigrationStep::SynthesizedMeta);
                Map::new()
            }
        };

        let legacy_date = meta
            .remove("date")
            .and_then(non_empty_string)
            .or(legacy_root_date);

        let scope = meta
            .get("scope")
            .and_then(Value::as_str)
            .map(CalculationScope::from_str)
            .unwrap_or_default();
        meta.insert("scope".to_string(), json!(scope.as_str()));

        let mut start = meta.get("startDate").cloned().and_then(non_empty_string);
        let mut end = meta.get("endDate").cloned().and_then(non_empty_string);

        if start.is_none() {
            if let Some(date) = legacy_date {
                start = Some(date.clone());
                end = Some(date);
                steps.push(MigrationStep::CopiedLegacyDate);
            }
        }

        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            (Some(s), None) => {
                steps.push(MigrationStep::FilledMissingPeriodDate);
                (s.clone(), s)
            }
            (None, Some(e)) => {
                steps.push(MigrationStep::FilledMissingPeriodDate);
                (e.clone(), e)
            }
            (None, None) => {
                if !steps.contains(&MigrationStep::SynthesizedMeta) {
                    steps.push(MigrationStep::FilledMissingPeriodDate);
                }
                let today = self.today_str();
                (today.clone(), today)
            }
        };

        let (start, end) = if start > end {
            steps.push(MigrationStep::SwappedReversedPeriod);
            (end, start)
        } else {
            (start, end)
        };

        meta.insert("startDate".to_string(), json!(start));
        meta.insert("endDate".to_string(), json!(end));
        root.insert("meta".to_string(), Value::Object(meta));
    }

    // ==========================================
    // 宽容读取（归一化后的 JSON → 强类型记录）
    // ==========================================

    fn read_record(&self, root: &Value) -> InputRecord {
        let empty = json!({});
        let meta = field(root, &["meta"]).unwrap_or(&empty);
        let materials = field(root, &["materials"]).unwrap_or(&empty);
        let logistics = field(root, &["logistics"]).unwrap_or(&empty);
        let electricity = field(root, &["electricity"]).unwrap_or(&empty);
        let water = field(root, &["water"]).unwrap_or(&empty);
        let production = field(root, &["production"]).unwrap_or(&empty);

        InputRecord {
            meta: self.read_meta(meta),
            materials: read_materials(materials),
            logistics: EntryList {
                entries: read_array(logistics, &["entries"])
                    .iter()
                    .filter(|v| v.is_object())
                    .map(read_transport_leg)
                    .collect(),
            },
            electricity: EntryList {
                entries: read_array(electricity, &["entries"])
                    .iter()
                    .filter(|v| v.is_object())
                    .map(read_electricity_entry)
                    .collect(),
            },
            water: EntryList {
                entries: read_array(water, &["entries"])
                    .iter()
                    .filter(|v| v.is_object())
                    .map(read_water_entry)
                    .collect(),
            },
            production: read_production(production),
        }
    }

    fn read_meta(&self, meta: &Value) -> PeriodMeta {
        let today = self.today_str();
        PeriodMeta {
            scope: field(meta, &["scope"])
                .and_then(Value::as_str)
                .map(CalculationScope::from_str)
                .unwrap_or_default(),
            start_date: read_optional_string(meta, &["startDate"]).unwrap_or_else(|| today.clone()),
            end_date: read_optional_string(meta, &["endDate"]).unwrap_or(today),
        }
    }
}

impl Default for StateMigrator {
    fn default() -> Self {
        Self::for_today()
    }
}

fn read_materials(materials: &Value) -> MaterialInputs {
    let empty = json!({});
    let farmer = field(materials, &["farmerCotton"]).unwrap_or(&empty);
    let recycled = field(materials, &["scGrand", "recycledYarn"]).unwrap_or(&empty);
    let leftover = field(materials, &["leftover", "leftoverCotton"]).unwrap_or(&empty);

    MaterialInputs {
        farmer_cotton: FarmerCottonInput {
            weight_kg: read_number(farmer, &["weight", "weightKg"]),
            farm_area_hectares: read_number(farmer, &["farmArea", "farmAreaHectares"]),
        },
        recycled_yarn: WeightInput {
            weight_kg: read_number(recycled, &["weight", "weightKg"]),
        },
        leftover_cotton: WeightInput {
            weight_kg: read_number(leftover, &["weight", "weightKg"]),
        },
    }
}

fn read_transport_leg(v: &Value) -> TransportLeg {
    TransportLeg {
        id: read_entry_id(v),
        description: read_string(v, &["description"]),
        weight_kg: read_number(v, &["weightKg", "weight"]),
        distance_km: read_number(v, &["distance", "distanceKm"]),
        vehicle_class: field(v, &["vehicleType", "vehicleClass"])
            .and_then(Value::as_str)
            .map(VehicleClass::from_str)
            .unwrap_or_default(),
    }
}

fn read_electricity_entry(v: &Value) -> ElectricityEntry {
    ElectricityEntry {
        id: read_entry_id(v),
        description: read_string(v, &["description"]),
        usage_kwh: read_number(v, &["usageKwh", "usage"]),
    }
}

fn read_water_entry(v: &Value) -> WaterEntry {
    WaterEntry {
        id: read_entry_id(v),
        description: read_string(v, &["description"]),
        usage_cubic_meters: read_number(v, &["usageM3", "usageCubicMeters"]),
        source_type: field(v, &["type", "sourceType"])
            .and_then(Value::as_str)
            .map(WaterSource::from_str)
            .unwrap_or_default(),
    }
}

fn read_production(production: &Value) -> ProductionInputs {
    ProductionInputs {
        sewing_hours: read_number(production, &["sewingHours"]),
        item_quantity: read_count(production, &["itemQuantity"]),
        logbook_file: read_optional_string(production, &["logbookFile"]),
    }
}

/// 条目缺少 id 时补发新 id（仅影响界面的增删定位,不影响计算）
fn read_entry_id(v: &Value) -> String {
    read_optional_string(v, &["id"]).unwrap_or_else(new_entry_id)
}

fn non_empty_string(v: Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrator() -> StateMigrator {
        StateMigrator::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    #[test]
    fn test_garbage_bytes_fall_back_to_default() {
        let m = migrator();
        let record = m.migrate_str("{not json");
        assert_eq!(record, m.default_record());
    }

    #[test]
    fn test_non_object_root_falls_back_to_default() {
        let m = migrator();
        assert_eq!(m.migrate_str("[1,2,3]"), m.default_record());
        assert_eq!(m.migrate_str("null"), m.default_record());
    }

    #[test]
    fn test_fixed_route_logistics_is_reset() {
        let raw = json!({
            "logistics": {
                "farmToSpinner": {"distance": 50, "vehicleType": "Light Vehicle"},
                "scGrandToFolkcharm": {"distance": 10, "vehicleType": ""}
            }
        });
        let (normalized, steps) = migrator().normalize(raw);
        assert_eq!(normalized["logistics"], json!({"entries": []}));
        assert!(steps.contains(&MigrationStep::ResetFixedRouteLogistics));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = json!({
            "date": "2025-06-01",
            "materials": {"scGrand": {"weight": 3}},
            "delivery": {"finalDistance": 10, "vehicleType": ""}
        });
        let m = migrator();
        let (once, first_steps) = m.normalize(raw);
        assert!(!first_steps.is_empty());

        let (twice, second_steps) = m.normalize(once.clone());
        assert_eq!(once, twice);
        assert!(second_steps.is_empty());
    }

    #[test]
    fn test_legacy_date_is_copied_into_meta() {
        let raw = json!({"meta": {"scope": "batch", "date": "2025-02-10"}});
        let record = migrator().migrate_value(raw);
        assert_eq!(record.meta.start_date, "2025-02-10");
        assert_eq!(record.meta.end_date, "2025-02-10");
    }

    #[test]
    fn test_missing_meta_synthesized_with_today() {
        let (normalized, steps) = migrator().normalize(json!({}));
        assert_eq!(normalized["meta"]["scope"], "batch");
        assert_eq!(normalized["meta"]["startDate"], "2026-10-19");
        assert_eq!(normalized["meta"]["endDate"], "2026-10-19");
        assert!(steps.contains(&MigrationStep::SynthesizedMeta));
    }

    #[test]
    fn test_reversed_period_is_swapped() {
        let raw = json!({"meta": {"scope": "monthly", "startDate": "2026-05", "endDate": "2026-02"}});
        let record = migrator().migrate_value(raw);
        assert_eq!(record.meta.scope, CalculationScope::Monthly);
        assert_eq!(record.meta.start_date, "2026-02");
        assert_eq!(record.meta.end_date, "2026-05");
    }

    #[test]
    fn test_malformed_leaves_read_as_zero() {
        let raw = json!({
            "materials": {
                "farmerCotton": {"weight": "abc", "farmArea": -2},
                "scGrand": {"weight": null},
                "leftover": "oops"
            },
            "logistics": {"entries": [
                {"id": "a", "weightKg": "120", "distance": 30, "vehicleType": "Heavy Vehicle"},
                "not-an-entry"
            ]},
            "production": {"sewingHours": "NaN", "itemQuantity": 12.7}
        });
        let record = migrator().migrate_value(raw);
        assert_eq!(record.materials.farmer_cotton.weight_kg, 0.0);
        assert_eq!(record.materials.farmer_cotton.farm_area_hectares, 0.0);
        assert_eq!(record.materials.recycled_yarn.weight_kg, 0.0);
        assert_eq!(record.materials.leftover_cotton.weight_kg, 0.0);
        assert_eq!(record.logistics.len(), 1);
        assert_eq!(record.logistics.entries[0].weight_kg, 120.0);
        assert_eq!(record.logistics.entries[0].vehicle_class, VehicleClass::Heavy);
        assert_eq!(record.production.sewing_hours, 0.0);
        assert_eq!(record.production.item_quantity, 12);
    }

    #[test]
    fn test_descriptive_aliases_are_accepted() {
        let raw = json!({
            "materials": {
                "farmerCotton": {"weightKg": 100, "farmAreaHectares": 0.5},
                "recycledYarn": {"weightKg": 20},
                "leftoverCotton": {"weightKg": 7}
            },
            "logistics": {"entries": [
                {"id": "l1", "weightKg": 1000, "distanceKm": 200, "vehicleClass": "light"}
            ]},
            "water": {"entries": [
                {"id": "w1", "usageCubicMeters": 3, "sourceType": "soft"}
            ]}
        });
        let record = migrator().migrate_value(raw);
        assert_eq!(record.materials.farmer_cotton.farm_area_hectares, 0.5);
        assert_eq!(record.materials.recycled_yarn.weight_kg, 20.0);
        assert_eq!(record.materials.leftover_cotton.weight_kg, 7.0);
        assert_eq!(record.logistics.entries[0].distance_km, 200.0);
        assert_eq!(record.logistics.entries[0].vehicle_class, VehicleClass::Light);
        assert_eq!(record.water.entries[0].source_type, WaterSource::Soft);
        assert_eq!(record.water.entries[0].usage_cubic_meters, 3.0);
    }

    #[test]
    fn test_current_snapshot_round_trips_unchanged() {
        let m = migrator();
        let mut record = m.default_record();
        record.materials.farmer_cotton.weight_kg = 42.0;
        record.logistics.entries.push(TransportLeg::new("Farm to Spinner", 42.0, 12.0, VehicleClass::Light));
        record.production.logbook_file = Some("logbook-03.pdf".to_string());

        let raw = serde_json::to_string(&record).unwrap();
        assert_eq!(m.migrate_str(&raw), record);
    }
}
