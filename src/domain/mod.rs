// ==========================================
// 供应链碳足迹计算器 - 领域模型层
// ==========================================
// 职责: 定义输入记录、计算结果与领域类型
// 红线: 不含存储逻辑,排放计算全部在 engine 中
// ==========================================

pub mod record;
pub mod result;
pub mod types;

// 重导出核心类型
pub use record::{
    new_entry_id, ElectricityEntry, EntryList, FarmerCottonInput, InputRecord, MaterialInputs,
    PeriodMeta, ProductionInputs, TransportLeg, WaterEntry, WeightInput,
};
pub use result::{CalculationResult, LaborStats, MaterialBreakdown};
pub use types::{AreaUnit, CalculationScope, EmissionCategory, VehicleClass, WaterSource};
