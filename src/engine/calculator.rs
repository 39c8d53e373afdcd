// ==========================================
// 供应链碳足迹计算器 - 排放计算引擎
// ==========================================
// 职责: InputRecord × EmissionFactorTable → CalculationResult
// 红线:
// - 纯函数: 无 I/O、无随机、不修改入参
// - 非法/缺失数值按 0 计,引擎没有失败路径
// - 动态列表求和与条目顺序无关
// - 除节省量外,任何类别小计不得为负；节省量不从总排放中扣减
// ==========================================

use crate::common::numeric::{non_negative, order_independent_sum};
use crate::config::emission_factors::EmissionFactorTable;
use crate::domain::record::{ElectricityEntry, InputRecord, MaterialInputs, TransportLeg, WaterEntry};
use crate::domain::result::{CalculationResult, LaborStats, MaterialBreakdown};
use crate::domain::types::EmissionCategory;
use std::collections::BTreeMap;
use tracing::instrument;

/// 立方米 → 升
const LITERS_PER_CUBIC_METER: f64 = 1000.0;

/// 千克 → 吨
const KG_PER_TONNE: f64 = 1000.0;

// ==========================================
// EmissionCalculator - 排放计算引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionCalculator;

impl EmissionCalculator {
    /// 创建新的排放计算引擎
    pub fn new() -> Self {
        Self
    }

    /// 计算完整结果
    ///
    /// 步骤:
    /// 1) 原材料（农户棉面积 × SOC、再生纱、边角料）+ 再生纱节省量
    /// 2) 运输（逐段求和）
    /// 3) 电力（逐条求和）
    /// 4) 用水（m³ → L,逐条求和）
    /// 5) 生产（辅料 + 未单独计量电力时的缝纫电耗估算）
    /// 6) 总重 / 总排放 / 强度 / 工资
    #[instrument(
        skip(self, input, factors),
        fields(
            legs = input.logistics.len(),
            electricity_entries = input.electricity.len(),
            water_entries = input.water.len()
        )
    )]
    pub fn compute<F>(&self, input: &InputRecord, factors: &F) -> CalculationResult
    where
        F: EmissionFactorTable + ?Sized,
    {
        // 1. 原材料
        let material_breakdown = self.material_breakdown(&input.materials, factors);
        let material_savings_kg = self.recycled_yarn_savings(&input.materials, factors);

        // 2-4. 动态列表
        let logistics = self.logistics_emissions(&input.logistics.entries, factors);
        let electricity = self.electricity_emissions(&input.electricity.entries, factors);
        let water = self.water_emissions(&input.water.entries, factors);

        // 5. 生产
        let electricity_tracked = !input.electricity.is_empty();
        let production = self.production_emissions(input, factors, electricity_tracked);

        let materials = material_breakdown.farmer_cotton_kg
            + material_breakdown.recycled_yarn_kg
            + material_breakdown.leftover_cotton_kg;

        let mut emissions_by_category = BTreeMap::new();
        emissions_by_category.insert(EmissionCategory::Materials, materials);
        emissions_by_category.insert(EmissionCategory::Logistics, logistics);
        emissions_by_category.insert(EmissionCategory::Electricity, electricity);
        emissions_by_category.insert(EmissionCategory::Water, water);
        emissions_by_category.insert(EmissionCategory::Production, production);

        // 6. 汇总（按类别固定顺序累加,与报表展示一致）
        let total_emissions_kg: f64 = emissions_by_category.values().sum();
        let total_product_weight_kg = self.total_product_weight(input, factors);
        let emission_intensity_kg_per_kg = intensity(total_emissions_kg, total_product_weight_kg);

        let sewing_hours = non_negative(input.production.sewing_hours);
        let wage_rate_per_hour = non_negative(factors.wage_rate_per_hour());
        let labor = LaborStats {
            sewing_hours,
            wage_rate_per_hour,
            estimated_wages: sewing_hours * wage_rate_per_hour,
        };

        tracing::debug!(
            total_emissions_kg,
            total_product_weight_kg,
            emission_intensity_kg_per_kg,
            "排放计算完成"
        );

        CalculationResult {
            emissions_by_category,
            total_emissions_kg,
            total_product_weight_kg,
            emission_intensity_kg_per_kg,
            material_savings_kg,
            material_breakdown,
            labor,
        }
    }

    // ==========================================
    // 原材料
    // ==========================================

    /// 原材料排放明细
    ///
    /// - 农户棉: 种植面积(ha) × SOC 占位系数（与重量无关）
    /// - 再生纱: 重量 × 再生纱因子
    /// - 边角料: 重量 × 边角料因子（默认 0,零排放分摊）
    pub fn material_breakdown<F>(&self, materials: &MaterialInputs, factors: &F) -> MaterialBreakdown
    where
        F: EmissionFactorTable + ?Sized,
    {
        MaterialBreakdown {
            farmer_cotton_kg: non_negative(materials.farmer_cotton.farm_area_hectares)
                * non_negative(factors.soc_per_hectare()),
            recycled_yarn_kg: non_negative(materials.recycled_yarn.weight_kg)
                * non_negative(factors.recycled_yarn()),
            leftover_cotton_kg: non_negative(materials.leftover_cotton.weight_kg)
                * non_negative(factors.leftover_cotton()),
        }
    }

    /// 再生纱相对原生棉的避免排放
    ///
    /// 重量 > 0 时 = 重量 × (原生棉因子 − 再生纱因子),否则 0。
    /// 因子差可为负,节省量不做非负截断。
    pub fn recycled_yarn_savings<F>(&self, materials: &MaterialInputs, factors: &F) -> f64
    where
        F: EmissionFactorTable + ?Sized,
    {
        let weight = non_negative(materials.recycled_yarn.weight_kg);
        if weight > 0.0 {
            weight * (non_negative(factors.virgin_cotton()) - non_negative(factors.recycled_yarn()))
        } else {
            0.0
        }
    }

    // ==========================================
    // 运输
    // ==========================================

    /// 单段运输排放: (kg / 1000) × km × 车型因子
    ///
    /// 车型未选择、距离 ≤ 0、重量 ≤ 0 → 0
    pub fn transport_leg_emissions<F>(&self, leg: &TransportLeg, factors: &F) -> f64
    where
        F: EmissionFactorTable + ?Sized,
    {
        let weight = non_negative(leg.weight_kg);
        let distance = non_negative(leg.distance_km);
        if !leg.vehicle_class.is_set() || weight == 0.0 || distance == 0.0 {
            return 0.0;
        }

        (weight / KG_PER_TONNE) * distance * non_negative(factors.transport(leg.vehicle_class))
    }

    /// 全部运输段排放之和
    pub fn logistics_emissions<F>(&self, legs: &[TransportLeg], factors: &F) -> f64
    where
        F: EmissionFactorTable + ?Sized,
    {
        order_independent_sum(legs.iter().map(|leg| self.transport_leg_emissions(leg, factors)))
    }

    // ==========================================
    // 电力 / 用水
    // ==========================================

    /// 电力排放: Σ kWh × 电网因子
    pub fn electricity_emissions<F>(&self, entries: &[ElectricityEntry], factors: &F) -> f64
    where
        F: EmissionFactorTable + ?Sized,
    {
        let grid = non_negative(factors.grid_electricity());
        order_independent_sum(entries.iter().map(|e| non_negative(e.usage_kwh) * grid))
    }

    /// 用水排放: Σ m³ × 1000 × 水源因子(每升)
    pub fn water_emissions<F>(&self, entries: &[WaterEntry], factors: &F) -> f64
    where
        F: EmissionFactorTable + ?Sized,
    {
        order_independent_sum(entries.iter().map(|e| {
            non_negative(e.usage_cubic_meters)
                * LITERS_PER_CUBIC_METER
                * non_negative(factors.water_per_liter(e.source_type))
        }))
    }

    // ==========================================
    // 生产
    // ==========================================

    /// 生产排放
    ///
    /// - 辅料: 件数 × 每件辅料重量 × 辅料因子
    /// - 缝纫电耗: 仅当电力未单独录入（电力列表为空）时,
    ///   按 工时 × 缝纫机功率 × 电网因子 估算,避免重复计算
    pub fn production_emissions<F>(&self, input: &InputRecord, factors: &F, electricity_tracked: bool) -> f64
    where
        F: EmissionFactorTable + ?Sized,
    {
        let accessories = self.accessory_weight_kg(input, factors) * non_negative(factors.accessory());

        let sewing = if electricity_tracked {
            0.0
        } else {
            non_negative(input.production.sewing_hours)
                * non_negative(factors.sewing_machine_power_kw())
                * non_negative(factors.grid_electricity())
        };

        accessories + sewing
    }

    /// 辅料总重（kg）
    fn accessory_weight_kg<F>(&self, input: &InputRecord, factors: &F) -> f64
    where
        F: EmissionFactorTable + ?Sized,
    {
        input.production.item_quantity as f64 * non_negative(factors.accessory_weight_per_item())
    }

    /// 产品总重（kg）= 三类原材料重量 + 辅料重量
    pub fn total_product_weight<F>(&self, input: &InputRecord, factors: &F) -> f64
    where
        F: EmissionFactorTable + ?Sized,
    {
        let m = &input.materials;
        non_negative(m.farmer_cotton.weight_kg)
            + non_negative(m.recycled_yarn.weight_kg)
            + non_negative(m.leftover_cotton.weight_kg)
            + self.accessory_weight_kg(input, factors)
    }
}

/// 便捷入口: 使用无状态引擎计算
pub fn compute<F>(input: &InputRecord, factors: &F) -> CalculationResult
where
    F: EmissionFactorTable + ?Sized,
{
    EmissionCalculator::new().compute(input, factors)
}

/// 排放强度 = 总排放 / 总重
///
/// 总重 ≤ 0、任一方溢出为 ∞ 或结果非有限时为 0（强度永不为 NaN / ∞）
fn intensity(total_emissions_kg: f64, total_product_weight_kg: f64) -> f64 {
    if !(total_emissions_kg.is_finite() && total_product_weight_kg.is_finite()) {
        tracing::warn!(
            total_emissions_kg,
            total_product_weight_kg,
            "汇总值溢出，排放强度按 0 计"
        );
        return 0.0;
    }
    if total_product_weight_kg <= 0.0 {
        return 0.0;
    }
    let value = total_emissions_kg / total_product_weight_kg;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
