// ==========================================
// 供应链碳足迹计算器 - 向导步骤校验器
// ==========================================
// 职责: 按向导步骤检查输入是否允许"下一步"
// 红线: 校验只在界面侧调用,计算引擎从不依赖校验结果
//       （引擎对任何输入都能给出结果,校验只是提示）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::record::{InputRecord, PeriodMeta};
use crate::domain::types::CalculationScope;
use crate::i18n::{t, t_with_args};

// ==========================================
// WizardStep - 向导步骤
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Period,      // 核算期间
    Materials,   // 原材料
    Logistics,   // 运输
    Electricity, // 电力
    Water,       // 用水
    Production,  // 生产
}

impl WizardStep {
    /// 向导顺序
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Period,
        WizardStep::Materials,
        WizardStep::Logistics,
        WizardStep::Electricity,
        WizardStep::Water,
        WizardStep::Production,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "period" | "meta" => Some(WizardStep::Period),
            "materials" => Some(WizardStep::Materials),
            "logistics" => Some(WizardStep::Logistics),
            "electricity" => Some(WizardStep::Electricity),
            "water" => Some(WizardStep::Water),
            "production" => Some(WizardStep::Production),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Period => "period",
            WizardStep::Materials => "materials",
            WizardStep::Logistics => "logistics",
            WizardStep::Electricity => "electricity",
            WizardStep::Water => "water",
            WizardStep::Production => "production",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 违规代码
// ==========================================
pub mod violation_codes {
    pub const INVALID_DATE: &str = "INVALID_DATE";
    pub const PERIOD_REVERSED: &str = "PERIOD_REVERSED";
    pub const MATERIAL_WEIGHT_REQUIRED: &str = "MATERIAL_WEIGHT_REQUIRED";
    pub const FARM_AREA_REQUIRED: &str = "FARM_AREA_REQUIRED";
    pub const NEGATIVE_VALUE: &str = "NEGATIVE_VALUE";
    pub const VEHICLE_REQUIRED: &str = "VEHICLE_REQUIRED";
    pub const SEWING_HOURS_REQUIRED: &str = "SEWING_HOURS_REQUIRED";
    pub const ITEM_QUANTITY_REQUIRED: &str = "ITEM_QUANTITY_REQUIRED";
}

use violation_codes::*;

// ==========================================
// InputValidator - 步骤校验器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct InputValidator;

impl InputValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验单个步骤
    ///
    /// # 返回
    /// - Ok(()): 允许进入下一步
    /// - Err(ApiError::ValidationFailed): 携带全部违规明细
    pub fn validate_step(&self, record: &InputRecord, step: WizardStep) -> ApiResult<()> {
        let violations = self.violations_for(record, step);
        if violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(step = %step, count = violations.len(), "步骤校验未通过");
            Err(ApiError::ValidationFailed {
                step: step.as_str().to_string(),
                violations,
            })
        }
    }

    /// 收集单个步骤的全部违规（不短路）
    pub fn violations_for(&self, record: &InputRecord, step: WizardStep) -> Vec<ValidationViolation> {
        let mut violations = Vec::new();
        match step {
            WizardStep::Period => self.check_period(&record.meta, &mut violations),
            WizardStep::Materials => self.check_materials(record, &mut violations),
            WizardStep::Logistics => self.check_logistics(record, &mut violations),
            WizardStep::Electricity => self.check_electricity(record, &mut violations),
            WizardStep::Water => self.check_water(record, &mut violations),
            WizardStep::Production => self.check_production(record, &mut violations),
        }
        violations
    }

    /// 按向导顺序校验全部步骤
    pub fn validate_all(&self, record: &InputRecord) -> Vec<ValidationViolation> {
        WizardStep::ALL
            .iter()
            .flat_map(|step| self.violations_for(record, *step))
            .collect()
    }

    // ===== 核算期间 =====

    fn check_period(&self, meta: &PeriodMeta, out: &mut Vec<ValidationViolation>) {
        let start_ok = is_valid_period_date(meta.scope, &meta.start_date);
        let end_ok = is_valid_period_date(meta.scope, &meta.end_date);

        if !start_ok {
            out.push(invalid_date("meta.startDate", meta.scope, &meta.start_date));
        }
        if !end_ok {
            out.push(invalid_date("meta.endDate", meta.scope, &meta.end_date));
        }
        if start_ok && end_ok && !meta.is_ordered() {
            out.push(ValidationViolation::new(
                PERIOD_REVERSED,
                "meta.endDate",
                t("validation.period_reversed"),
            ));
        }
    }

    // ===== 原材料 =====

    fn check_materials(&self, record: &InputRecord, out: &mut Vec<ValidationViolation>) {
        let m = &record.materials;

        check_not_negative(m.farmer_cotton.weight_kg, "materials.farmerCotton.weight", out);
        check_not_negative(m.farmer_cotton.farm_area_hectares, "materials.farmerCotton.farmArea", out);
        check_not_negative(m.recycled_yarn.weight_kg, "materials.scGrand.weight", out);
        check_not_negative(m.leftover_cotton.weight_kg, "materials.leftover.weight", out);

        if !(m.total_weight_kg() > 0.0) {
            out.push(ValidationViolation::new(
                MATERIAL_WEIGHT_REQUIRED,
                "materials",
                t("validation.material_weight_required"),
            ));
        }

        if m.farmer_cotton.weight_kg > 0.0 && !(m.farmer_cotton.farm_area_hectares > 0.0) {
            out.push(ValidationViolation::new(
                FARM_AREA_REQUIRED,
                "materials.farmerCotton.farmArea",
                t("validation.farm_area_required"),
            ));
        }
    }

    // ===== 运输 =====

    fn check_logistics(&self, record: &InputRecord, out: &mut Vec<ValidationViolation>) {
        for (i, leg) in record.logistics.entries.iter().enumerate() {
            let prefix = format!("logistics.entries[{}]", i);
            check_not_negative(leg.weight_kg, &format!("{}.weightKg", prefix), out);
            check_not_negative(leg.distance_km, &format!("{}.distance", prefix), out);

            if leg.distance_km > 0.0 && !leg.vehicle_class.is_set() {
                let index = (i + 1).to_string();
                out.push(ValidationViolation::new(
                    VEHICLE_REQUIRED,
                    format!("{}.vehicleType", prefix),
                    t_with_args("validation.vehicle_required", &[("index", index.as_str())]),
                ));
            }
        }
    }

    // ===== 电力 / 用水 =====

    fn check_electricity(&self, record: &InputRecord, out: &mut Vec<ValidationViolation>) {
        for (i, entry) in record.electricity.entries.iter().enumerate() {
            check_not_negative(entry.usage_kwh, &format!("electricity.entries[{}].usageKwh", i), out);
        }
    }

    fn check_water(&self, record: &InputRecord, out: &mut Vec<ValidationViolation>) {
        for (i, entry) in record.water.entries.iter().enumerate() {
            check_not_negative(entry.usage_cubic_meters, &format!("water.entries[{}].usageM3", i), out);
        }
    }

    // ===== 生产 =====

    fn check_production(&self, record: &InputRecord, out: &mut Vec<ValidationViolation>) {
        let p = &record.production;
        check_not_negative(p.sewing_hours, "production.sewingHours", out);

        if !(p.sewing_hours > 0.0) {
            out.push(ValidationViolation::new(
                SEWING_HOURS_REQUIRED,
                "production.sewingHours",
                t("validation.sewing_hours_required"),
            ));
        }
        if p.item_quantity == 0 {
            out.push(ValidationViolation::new(
                ITEM_QUANTITY_REQUIRED,
                "production.itemQuantity",
                t("validation.item_quantity_required"),
            ));
        }
    }
}

/// 日期格式: Batch = YYYY-MM-DD, Monthly = YYYY-MM
fn is_valid_period_date(scope: CalculationScope, value: &str) -> bool {
    match scope {
        CalculationScope::Batch => {
            value.len() == 10 && NaiveDate::parse_from_str(value, scope.date_format()).is_ok()
        }
        CalculationScope::Monthly => {
            value.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").is_ok()
        }
    }
}

fn invalid_date(field: &str, scope: CalculationScope, value: &str) -> ValidationViolation {
    let expected = match scope {
        CalculationScope::Batch => "YYYY-MM-DD",
        CalculationScope::Monthly => "YYYY-MM",
    };
    ValidationViolation::new(
        INVALID_DATE,
        field,
        t_with_args("validation.invalid_date", &[("value", value), ("format", expected)]),
    )
}

/// 负数与非有限值（NaN / ∞）都视为非法
fn check_not_negative(value: f64, field: &str, out: &mut Vec<ValidationViolation>) {
    if !(value.is_finite() && value >= 0.0) {
        out.push(ValidationViolation::new(
            NEGATIVE_VALUE,
            field,
            t_with_args("validation.negative_value", &[("field", field)]),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{TransportLeg, WaterEntry};
    use crate::domain::types::{VehicleClass, WaterSource};

    fn record() -> InputRecord {
        InputRecord::empty(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())
    }

    fn codes(v: &[ValidationViolation]) -> Vec<&str> {
        v.iter().map(|x| x.code.as_str()).collect()
    }

    #[test]
    fn test_empty_materials_step_fails() {
        let v = InputValidator::new().violations_for(&record(), WizardStep::Materials);
        assert_eq!(codes(&v), vec![MATERIAL_WEIGHT_REQUIRED]);
    }

    #[test]
    fn test_farm_area_required_with_farmer_cotton() {
        let mut r = record();
        r.materials.farmer_cotton.weight_kg = 50.0;
        let v = InputValidator::new().violations_for(&r, WizardStep::Materials);
        assert_eq!(codes(&v), vec![FARM_AREA_REQUIRED]);

        r.materials.farmer_cotton.farm_area_hectares = 0.4;
        assert!(InputValidator::new().validate_step(&r, WizardStep::Materials).is_ok());
    }

    #[test]
    fn test_vehicle_required_only_when_distance_entered() {
        let mut r = record();
        r.logistics.entries.push(TransportLeg::new("a", 10.0, 0.0, VehicleClass::Unset));
        r.logistics.entries.push(TransportLeg::new("b", 10.0, 25.0, VehicleClass::Unset));
        let v = InputValidator::new().violations_for(&r, WizardStep::Logistics);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].code, VEHICLE_REQUIRED);
        assert_eq!(v[0].field, "logistics.entries[1].vehicleType");
    }

    #[test]
    fn test_negative_and_nan_values_flagged() {
        let mut r = record();
        r.water.entries.push(WaterEntry::new("x", -1.0, WaterSource::Tap));
        r.water.entries.push(WaterEntry::new("y", f64::NAN, WaterSource::Soft));
        let v = InputValidator::new().violations_for(&r, WizardStep::Water);
        assert_eq!(codes(&v), vec![NEGATIVE_VALUE, NEGATIVE_VALUE]);
    }

    #[test]
    fn test_production_requires_hours_and_items() {
        let mut r = record();
        let err = InputValidator::new()
            .validate_step(&r, WizardStep::Production)
            .unwrap_err();
        match err {
            ApiError::ValidationFailed { step, violations } => {
                assert_eq!(step, "production");
                assert_eq!(codes(&violations), vec![SEWING_HOURS_REQUIRED, ITEM_QUANTITY_REQUIRED]);
            }
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }

        r.production.sewing_hours = 8.0;
        r.production.item_quantity = 20;
        assert!(InputValidator::new().validate_step(&r, WizardStep::Production).is_ok());
    }

    #[test]
    fn test_period_formats_per_scope() {
        let mut r = record();
        assert!(InputValidator::new().validate_step(&r, WizardStep::Period).is_ok());

        r.meta.scope = CalculationScope::Monthly;
        let v = InputValidator::new().violations_for(&r, WizardStep::Period);
        assert_eq!(codes(&v), vec![INVALID_DATE, INVALID_DATE]);

        r.meta.start_date = "2026-05".to_string();
        r.meta.end_date = "2026-03".to_string();
        let v = InputValidator::new().violations_for(&r, WizardStep::Period);
        assert_eq!(codes(&v), vec![PERIOD_REVERSED]);
    }

    #[test]
    fn test_step_from_str() {
        assert_eq!(WizardStep::from_str("Water"), Some(WizardStep::Water));
        assert_eq!(WizardStep::from_str("meta"), Some(WizardStep::Period));
        assert_eq!(WizardStep::from_str("delivery"), None);
    }
}
