// ==========================================
// 供应链碳足迹计算器 - 计算结果模型
// ==========================================
// 红线: 纯派生视图,每次输入变化后从零重算,不落库
// ==========================================

use crate::common::numeric::non_negative;
use crate::domain::types::EmissionCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// CalculationResult - 引擎输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// 分类排放（kg CO2e）,五个类别恒定出现
    pub emissions_by_category: BTreeMap<EmissionCategory, f64>,

    /// 总排放（kg CO2e）= 各类别之和,不扣减节省量
    pub total_emissions_kg: f64,

    /// 产品总重（kg）= 原材料重量 + 辅料重量
    pub total_product_weight_kg: f64,

    /// 排放强度（kg CO2e / kg 产品）,总重为 0 时为 0
    pub emission_intensity_kg_per_kg: f64,

    /// 再生纱相对原生棉的避免排放（可为负,单独展示）
    pub material_savings_kg: f64,

    /// 原材料排放明细
    pub material_breakdown: MaterialBreakdown,

    /// 社会影响统计（工时 / 工资）
    pub labor: LaborStats,
}

impl CalculationResult {
    /// 读取单个类别排放（缺失按 0）
    pub fn category(&self, category: EmissionCategory) -> f64 {
        self.emissions_by_category
            .get(&category)
            .copied()
            .unwrap_or(0.0)
    }

    /// 单件产品碳足迹估算
    ///
    /// # 参数
    /// - item_weight_kg: 单件产品重量（kg）
    ///
    /// # 返回
    /// - item_weight_kg × 排放强度；重量非法或 ≤ 0 时为 0
    pub fn product_footprint(&self, item_weight_kg: f64) -> f64 {
        non_negative(item_weight_kg) * self.emission_intensity_kg_per_kg
    }

    /// 类别占总排放的百分比（总排放为 0 或溢出时为 0）
    pub fn category_share_pct(&self, category: EmissionCategory) -> f64 {
        if self.total_emissions_kg > 0.0 && self.total_emissions_kg.is_finite() {
            let pct = self.category(category) / self.total_emissions_kg * 100.0;
            if pct.is_finite() {
                pct
            } else {
                0.0
            }
        } else {
            0.0
        }
    }
}

/// 原材料排放明细（kg CO2e）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialBreakdown {
    pub farmer_cotton_kg: f64,
    pub recycled_yarn_kg: f64,
    pub leftover_cotton_kg: f64,
}

/// 工时与工资估算
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborStats {
    pub sewing_hours: f64,
    pub wage_rate_per_hour: f64,
    pub estimated_wages: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> CalculationResult {
        let mut by_category = BTreeMap::new();
        for c in EmissionCategory::ALL {
            by_category.insert(c, 0.0);
        }
        by_category.insert(EmissionCategory::Logistics, 30.0);
        by_category.insert(EmissionCategory::Electricity, 10.0);

        CalculationResult {
            emissions_by_category: by_category,
            total_emissions_kg: 40.0,
            total_product_weight_kg: 20.0,
            emission_intensity_kg_per_kg: 2.0,
            material_savings_kg: 0.0,
            material_breakdown: MaterialBreakdown::default(),
            labor: LaborStats::default(),
        }
    }

    #[test]
    fn test_product_footprint() {
        let result = sample_result();
        assert_eq!(result.product_footprint(0.25), 0.5);
        assert_eq!(result.product_footprint(-1.0), 0.0);
        assert_eq!(result.product_footprint(f64::NAN), 0.0);
    }

    #[test]
    fn test_category_share() {
        let result = sample_result();
        assert_eq!(result.category_share_pct(EmissionCategory::Logistics), 75.0);
        assert_eq!(result.category_share_pct(EmissionCategory::Water), 0.0);

        let mut overflowed = sample_result();
        overflowed.total_emissions_kg = f64::INFINITY;
        overflowed
            .emissions_by_category
            .insert(EmissionCategory::Logistics, f64::INFINITY);
        assert_eq!(overflowed.category_share_pct(EmissionCategory::Logistics), 0.0);
    }

    #[test]
    fn test_serialized_category_keys() {
        let value = serde_json::to_value(sample_result()).unwrap();
        assert_eq!(value["emissionsByCategory"]["logistics"], 30.0);
        assert_eq!(value["totalEmissionsKg"], 40.0);
    }
}
