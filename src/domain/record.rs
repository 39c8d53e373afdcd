// ==========================================
// 供应链碳足迹计算器 - 输入记录领域模型
// ==========================================
// 红线: 全系统只有这一份"当前版本"记录结构
//       历史形状的兼容全部在 engine::migrator 中处理
// 序列化: camelCase,字段名与前端 localStorage 快照一致
// ==========================================

use crate::domain::types::{CalculationScope, VehicleClass, WaterSource};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 生成动态条目 ID（UUID v4）
pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

// ==========================================
// InputRecord - 一个批次/月度的完整输入快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    pub meta: PeriodMeta,
    pub materials: MaterialInputs,
    pub logistics: EntryList<TransportLeg>,
    pub electricity: EntryList<ElectricityEntry>,
    pub water: EntryList<WaterEntry>,
    pub production: ProductionInputs,
}

impl InputRecord {
    /// 创建空记录（会话开始 / 重新开始时使用）
    pub fn empty(today: NaiveDate) -> Self {
        Self {
            meta: PeriodMeta::single_day(today),
            materials: MaterialInputs::default(),
            logistics: EntryList::default(),
            electricity: EntryList::default(),
            water: EntryList::default(),
            production: ProductionInputs::default(),
        }
    }

    /// 以本地日期创建空记录
    pub fn empty_today() -> Self {
        Self::empty(chrono::Local::now().date_naive())
    }
}

// ==========================================
// PeriodMeta - 核算期间（仅用于展示,引擎不读取）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMeta {
    pub scope: CalculationScope,
    pub start_date: String, // Batch: YYYY-MM-DD / Monthly: YYYY-MM
    pub end_date: String,
}

impl PeriodMeta {
    /// 单日批次期间
    pub fn single_day(date: NaiveDate) -> Self {
        let d = date.format("%Y-%m-%d").to_string();
        Self {
            scope: CalculationScope::Batch,
            start_date: d.clone(),
            end_date: d,
        }
    }

    /// 期间是否有序（两种格式均可按字典序比较）
    pub fn is_ordered(&self) -> bool {
        self.start_date <= self.end_date
    }
}

// ==========================================
// MaterialInputs - 原材料
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialInputs {
    pub farmer_cotton: FarmerCottonInput,
    #[serde(rename = "scGrand", alias = "recycledYarn")]
    pub recycled_yarn: WeightInput,
    #[serde(rename = "leftover", alias = "leftoverCotton")]
    pub leftover_cotton: WeightInput,
}

impl MaterialInputs {
    /// 原材料总重（kg）
    pub fn total_weight_kg(&self) -> f64 {
        self.farmer_cotton.weight_kg + self.recycled_yarn.weight_kg + self.leftover_cotton.weight_kg
    }

    /// 根据原材料推导初始运输段（距离为 0、未选车型）
    ///
    /// - 农户棉 > 0 → "Farm to Spinner"
    /// - 再生纱 > 0 → "Factory to Studio"
    /// - 都没有 → 一个空白运输段
    pub fn seeded_transport_legs(&self) -> Vec<TransportLeg> {
        let mut legs = Vec::new();
        if self.farmer_cotton.weight_kg > 0.0 {
            legs.push(TransportLeg::new(
                "Farm to Spinner",
                self.farmer_cotton.weight_kg,
                0.0,
                VehicleClass::Unset,
            ));
        }
        if self.recycled_yarn.weight_kg > 0.0 {
            legs.push(TransportLeg::new(
                "Factory to Studio",
                self.recycled_yarn.weight_kg,
                0.0,
                VehicleClass::Unset,
            ));
        }
        if legs.is_empty() {
            legs.push(TransportLeg::blank());
        }
        legs
    }
}

/// 农户棉: 重量 + 种植面积（公顷,仅重量 > 0 时有意义）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmerCottonInput {
    #[serde(rename = "weight", alias = "weightKg")]
    pub weight_kg: f64,
    #[serde(rename = "farmArea", alias = "farmAreaHectares")]
    pub farm_area_hectares: f64,
}

/// 仅含重量的原材料（再生纱 / 边角余料棉）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightInput {
    #[serde(rename = "weight", alias = "weightKg")]
    pub weight_kg: f64,
}

// ==========================================
// EntryList - 动态条目列表
// ==========================================
// 持久化形状: { "entries": [...] }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryList<T> {
    pub entries: Vec<T>,
}

impl<T> Default for EntryList<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> EntryList<T> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ==========================================
// TransportLeg - 运输段
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportLeg {
    pub id: String,
    pub description: String,
    pub weight_kg: f64,
    #[serde(rename = "distance", alias = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "vehicleType", alias = "vehicleClass")]
    pub vehicle_class: VehicleClass,
}

impl TransportLeg {
    /// 新建空白运输段（未选择车型）
    pub fn blank() -> Self {
        Self::new("", 0.0, 0.0, VehicleClass::Unset)
    }

    pub fn new(description: &str, weight_kg: f64, distance_km: f64, vehicle_class: VehicleClass) -> Self {
        Self {
            id: new_entry_id(),
            description: description.to_string(),
            weight_kg,
            distance_km,
            vehicle_class,
        }
    }
}

// ==========================================
// ElectricityEntry - 电力使用
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityEntry {
    pub id: String,
    pub description: String,
    pub usage_kwh: f64,
}

impl ElectricityEntry {
    pub fn new(description: &str, usage_kwh: f64) -> Self {
        Self {
            id: new_entry_id(),
            description: description.to_string(),
            usage_kwh,
        }
    }
}

// ==========================================
// WaterEntry - 用水
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterEntry {
    pub id: String,
    pub description: String,
    #[serde(rename = "usageM3", alias = "usageCubicMeters")]
    pub usage_cubic_meters: f64,
    #[serde(rename = "type", alias = "sourceType")]
    pub source_type: WaterSource,
}

impl WaterEntry {
    pub fn new(description: &str, usage_cubic_meters: f64, source_type: WaterSource) -> Self {
        Self {
            id: new_entry_id(),
            description: description.to_string(),
            usage_cubic_meters,
            source_type,
        }
    }
}

// ==========================================
// ProductionInputs - 生产
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionInputs {
    pub sewing_hours: f64,
    pub item_quantity: u64,
    /// 生产日志凭证（不参与计算）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logbook_file: Option<String>,
}
