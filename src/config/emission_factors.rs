// ==========================================
// 供应链碳足迹计算器 - 排放因子表
// ==========================================
// 职责: 定义引擎依赖的因子查询契约 + 默认因子
// 红线: 引擎只依赖 EmissionFactorTable 契约,不依赖具体数值
//       因子属于配置数据,数值准确性不在本系统保证范围内
// ==========================================

use crate::domain::types::{VehicleClass, WaterSource};
use serde::{Deserialize, Serialize};

// ==========================================
// 默认因子常量
// ==========================================

/// 轻型车运输因子（kg CO2e / t·km）
pub const EF_TRANSPORT_LIGHT: f64 = 0.245;
/// 重型车运输因子（kg CO2e / t·km）
pub const EF_TRANSPORT_HEAVY: f64 = 0.129;

/// 再生纱（kg CO2e / kg）
pub const EF_RECYCLED_YARN: f64 = 0.35;
/// 边角余料棉（零排放分摊）
pub const EF_LEFTOVER_COTTON: f64 = 0.0;
/// 原生棉基线（占位值,用于计算再生纱避免排放）
pub const EF_VIRGIN_COTTON: f64 = 1.80;

/// 土壤有机碳占位系数（kg CO2e / ha）= 15 / 莱 × 6.25 莱/公顷
pub const PLACEHOLDER_SOC_EMISSIONS_PER_HA: f64 = 93.75;

/// 电网因子（kg CO2e / kWh）
pub const EF_GRID_ELECTRICITY: f64 = 0.399;

/// 自来水（kg CO2e / L）
pub const EF_WATER_TAP_PER_LITER: f64 = 0.000541;
/// 软化水（kg CO2e / L）
pub const EF_WATER_SOFT_PER_LITER: f64 = 0.000790;

/// 每件辅料重量（kg）
pub const WEIGHT_ACCESSORY_PER_ITEM_KG: f64 = 0.05;
/// 辅料因子（kg CO2e / kg,占位值）
pub const EF_ACCESSORY: f64 = 2.1;

/// 缝纫机功率（kW）
pub const POWER_SEWING_MACHINE_KW: f64 = 0.25;

/// 缝纫工时工资（THB / h）
pub const WAGE_RATE_THB_PER_HOUR: f64 = 60.0;

// ==========================================
// EmissionFactorTable - 因子查询契约
// ==========================================
// 实现者: EmissionFactors（默认/配置加载）, FactorOverrides（按项覆写）
pub trait EmissionFactorTable {
    /// 运输因子（kg CO2e / t·km）,Unset 返回 0
    fn transport(&self, vehicle: VehicleClass) -> f64;

    /// 再生纱因子（kg CO2e / kg）
    fn recycled_yarn(&self) -> f64;

    /// 边角余料棉因子（kg CO2e / kg）
    fn leftover_cotton(&self) -> f64;

    /// 原生棉基线因子（kg CO2e / kg）
    fn virgin_cotton(&self) -> f64;

    /// 土壤有机碳因子（kg CO2e / ha）
    fn soc_per_hectare(&self) -> f64;

    /// 电网因子（kg CO2e / kWh）
    fn grid_electricity(&self) -> f64;

    /// 用水因子（kg CO2e / L）
    fn water_per_liter(&self, source: WaterSource) -> f64;

    /// 每件辅料重量（kg）
    fn accessory_weight_per_item(&self) -> f64;

    /// 辅料因子（kg CO2e / kg）
    fn accessory(&self) -> f64;

    /// 缝纫机功率（kW）
    fn sewing_machine_power_kw(&self) -> f64;

    /// 工时工资（每小时）
    fn wage_rate_per_hour(&self) -> f64;
}

// ==========================================
// EmissionFactors - 因子值对象
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionFactors {
    pub transport_light: f64,
    pub transport_heavy: f64,
    pub recycled_yarn: f64,
    pub leftover_cotton: f64,
    pub virgin_cotton: f64,
    pub soc_per_hectare: f64,
    pub grid_electricity: f64,
    pub water_tap_per_liter: f64,
    pub water_soft_per_liter: f64,
    pub accessory_weight_per_item_kg: f64,
    pub accessory: f64,
    pub sewing_machine_power_kw: f64,
    pub wage_rate_per_hour: f64,
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self {
            transport_light: EF_TRANSPORT_LIGHT,
            transport_heavy: EF_TRANSPORT_HEAVY,
            recycled_yarn: EF_RECYCLED_YARN,
            leftover_cotton: EF_LEFTOVER_COTTON,
            virgin_cotton: EF_VIRGIN_COTTON,
            soc_per_hectare: PLACEHOLDER_SOC_EMISSIONS_PER_HA,
            grid_electricity: EF_GRID_ELECTRICITY,
            water_tap_per_liter: EF_WATER_TAP_PER_LITER,
            water_soft_per_liter: EF_WATER_SOFT_PER_LITER,
            accessory_weight_per_item_kg: WEIGHT_ACCESSORY_PER_ITEM_KG,
            accessory: EF_ACCESSORY,
            sewing_machine_power_kw: POWER_SEWING_MACHINE_KW,
            wage_rate_per_hour: WAGE_RATE_THB_PER_HOUR,
        }
    }
}

impl EmissionFactorTable for EmissionFactors {
    fn transport(&self, vehicle: VehicleClass) -> f64 {
        match vehicle {
            VehicleClass::Light => self.transport_light,
            VehicleClass::Heavy => self.transport_heavy,
            VehicleClass::Unset => 0.0,
        }
    }

    fn recycled_yarn(&self) -> f64 {
        self.recycled_yarn
    }

    fn leftover_cotton(&self) -> f64 {
        self.leftover_cotton
    }

    fn virgin_cotton(&self) -> f64 {
        self.virgin_cotton
    }

    fn soc_per_hectare(&self) -> f64 {
        self.soc_per_hectare
    }

    fn grid_electricity(&self) -> f64 {
        self.grid_electricity
    }

    fn water_per_liter(&self, source: WaterSource) -> f64 {
        match source {
            WaterSource::Tap => self.water_tap_per_liter,
            WaterSource::Soft => self.water_soft_per_liter,
        }
    }

    fn accessory_weight_per_item(&self) -> f64 {
        self.accessory_weight_per_item_kg
    }

    fn accessory(&self) -> f64 {
        self.accessory
    }

    fn sewing_machine_power_kw(&self) -> f64 {
        self.sewing_machine_power_kw
    }

    fn wage_rate_per_hour(&self) -> f64 {
        self.wage_rate_per_hour
    }
}

// ==========================================
// FactorOverrides - 按项覆写的因子表
// ==========================================
// 用途: 在不改引擎的前提下替换个别因子（例如地区电网因子）
// 未覆写的项委托给 base
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorOverrides<B> {
    pub base: B,
    #[serde(default)]
    pub grid_electricity: Option<f64>,
    #[serde(default)]
    pub transport_light: Option<f64>,
    #[serde(default)]
    pub transport_heavy: Option<f64>,
    #[serde(default)]
    pub water_tap_per_liter: Option<f64>,
    #[serde(default)]
    pub water_soft_per_liter: Option<f64>,
    #[serde(default)]
    pub soc_per_hectare: Option<f64>,
    #[serde(default)]
    pub accessory: Option<f64>,
}

impl<B: EmissionFactorTable> FactorOverrides<B> {
    pub fn new(base: B) -> Self {
        Self {
            base,
            grid_electricity: None,
            transport_light: None,
            transport_heavy: None,
            water_tap_per_liter: None,
            water_soft_per_liter: None,
            soc_per_hectare: None,
            accessory: None,
        }
    }

    /// 覆写电网因子
    pub fn with_grid_electricity(mut self, value: f64) -> Self {
        self.grid_electricity = Some(value);
        self
    }

    /// 覆写运输因子（Unset 忽略）
    pub fn with_transport(mut self, vehicle: VehicleClass, value: f64) -> Self {
        match vehicle {
            VehicleClass::Light => self.transport_light = Some(value),
            VehicleClass::Heavy => self.transport_heavy = Some(value),
            VehicleClass::Unset => {}
        }
        self
    }

    /// 覆写用水因子
    pub fn with_water(mut self, source: WaterSource, value: f64) -> Self {
        match source {
            WaterSource::Tap => self.water_tap_per_liter = Some(value),
            WaterSource::Soft => self.water_soft_per_liter = Some(value),
        }
        self
    }

    /// 覆写土壤有机碳占位系数
    pub fn with_soc_per_hectare(mut self, value: f64) -> Self {
        self.soc_per_hectare = Some(value);
        self
    }

    /// 覆写辅料因子
    pub fn with_accessory(mut self, value: f64) -> Self {
        self.accessory = Some(value);
        self
    }
}

impl<B: EmissionFactorTable> EmissionFactorTable for FactorOverrides<B> {
    fn transport(&self, vehicle: VehicleClass) -> f64 {
        let overridden = match vehicle {
            VehicleClass::Light => self.transport_light,
            VehicleClass::Heavy => self.transport_heavy,
            VehicleClass::Unset => None,
        };
        overridden.unwrap_or_else(|| self.base.transport(vehicle))
    }

    fn recycled_yarn(&self) -> f64 {
        self.base.recycled_yarn()
    }

    fn leftover_cotton(&self) -> f64 {
        self.base.leftover_cotton()
    }

    fn virgin_cotton(&self) -> f64 {
        self.base.virgin_cotton()
    }

    fn soc_per_hectare(&self) -> f64 {
        self.soc_per_hectare
            .unwrap_or_else(|| self.base.soc_per_hectare())
    }

    fn grid_electricity(&self) -> f64 {
        self.grid_electricity
            .unwrap_or_else(|| self.base.grid_electricity())
    }

    fn water_per_liter(&self, source: WaterSource) -> f64 {
        let overridden = match source {
            WaterSource::Tap => self.water_tap_per_liter,
            WaterSource::Soft => self.water_soft_per_liter,
        };
        overridden.unwrap_or_else(|| self.base.water_per_liter(source))
    }

    fn accessory_weight_per_item(&self) -> f64 {
        self.base.accessory_weight_per_item()
    }

    fn accessory(&self) -> f64 {
        self.accessory.unwrap_or_else(|| self.base.accessory())
    }

    fn sewing_machine_power_kw(&self) -> f64 {
        self.base.sewing_machine_power_kw()
    }

    fn wage_rate_per_hour(&self) -> f64 {
        self.base.wage_rate_per_hour()
    }
}

impl<T: EmissionFactorTable + ?Sized> EmissionFactorTable for &T {
    fn transport(&self, vehicle: VehicleClass) -> f64 {
        (**self).transport(vehicle)
    }

    fn recycled_yarn(&self) -> f64 {
        (**self).recycled_yarn()
    }

    fn leftover_cotton(&self) -> f64 {
        (**self).leftover_cotton()
    }

    fn virgin_cotton(&self) -> f64 {
        (**self).virgin_cotton()
    }

    fn soc_per_hectare(&self) -> f64 {
        (**self).soc_per_hectare()
    }

    fn grid_electricity(&self) -> f64 {
        (**self).grid_electricity()
    }

    fn water_per_liter(&self, source: WaterSource) -> f64 {
        (**self).water_per_liter(source)
    }

    fn accessory_weight_per_item(&self) -> f64 {
        (**self).accessory_weight_per_item()
    }

    fn accessory(&self) -> f64 {
        (**self).accessory()
    }

    fn sewing_machine_power_kw(&self) -> f64 {
        (**self).sewing_machine_power_kw()
    }

    fn wage_rate_per_hour(&self) -> f64 {
        (**self).wage_rate_per_hour()
    }
}
