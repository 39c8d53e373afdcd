// ==========================================
// 供应链碳足迹计算器 - 领域类型定义
// ==========================================
// 约定: 持久化字符串与前端 localStorage 快照保持一致
// 红线: 未知取值一律降级为默认值,不报错
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 核算口径 (Calculation Scope)
// ==========================================
// 序列化格式: snake_case ("batch" / "monthly")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationScope {
    Batch,   // 单批次（日期格式 YYYY-MM-DD）
    Monthly, // 月度汇总（日期格式 YYYY-MM）
}

impl Default for CalculationScope {
    fn default() -> Self {
        CalculationScope::Batch
    }
}

impl fmt::Display for CalculationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl CalculationScope {
    /// 从字符串解析口径（未知值回退为 Batch）
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => CalculationScope::Monthly,
            _ => CalculationScope::Batch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationScope::Batch => "batch",
            CalculationScope::Monthly => "monthly",
        }
    }

    /// 该口径下日期字段的 chrono 格式串
    pub fn date_format(&self) -> &'static str {
        match self {
            CalculationScope::Batch => "%Y-%m-%d",
            CalculationScope::Monthly => "%Y-%m",
        }
    }
}

// ==========================================
// 运输车型 (Vehicle Class)
// ==========================================
// 持久化: "Light Vehicle" / "Heavy Vehicle" / ""（未选择）
// Unset 的运输段排放恒为 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleClass {
    Light, // 轻型车
    Heavy, // 重型车
    Unset, // 未选择
}

impl Default for VehicleClass {
    fn default() -> Self {
        VehicleClass::Unset
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_storage_str())
    }
}

impl VehicleClass {
    /// 从字符串解析车型
    ///
    /// 同时接受前端标签 ("Light Vehicle") 与简写 ("light" / "LIGHT")
    pub fn from_str(s: &str) -> Self {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "light vehicle" | "light" => VehicleClass::Light,
            "heavy vehicle" | "heavy" => VehicleClass::Heavy,
            _ => VehicleClass::Unset,
        }
    }

    /// 转换为持久化字符串
    pub fn to_storage_str(&self) -> &'static str {
        match self {
            VehicleClass::Light => "Light Vehicle",
            VehicleClass::Heavy => "Heavy Vehicle",
            VehicleClass::Unset => "",
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, VehicleClass::Unset)
    }
}

impl From<String> for VehicleClass {
    fn from(s: String) -> Self {
        VehicleClass::from_str(&s)
    }
}

impl From<VehicleClass> for String {
    fn from(v: VehicleClass) -> Self {
        v.to_storage_str().to_string()
    }
}

// ==========================================
// 用水类型 (Water Source)
// ==========================================
// 持久化: "tap" / "soft"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WaterSource {
    Tap,  // 自来水
    Soft, // 软化水
}

impl Default for WaterSource {
    fn default() -> Self {
        WaterSource::Tap
    }
}

impl fmt::Display for WaterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_storage_str())
    }
}

impl WaterSource {
    /// 从字符串解析用水类型（未知值回退为 Tap）
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "soft" | "soft water" => WaterSource::Soft,
            _ => WaterSource::Tap,
        }
    }

    pub fn to_storage_str(&self) -> &'static str {
        match self {
            WaterSource::Tap => "tap",
            WaterSource::Soft => "soft",
        }
    }
}

impl From<String> for WaterSource {
    fn from(s: String) -> Self {
        WaterSource::from_str(&s)
    }
}

impl From<WaterSource> for String {
    fn from(v: WaterSource) -> Self {
        v.to_storage_str().to_string()
    }
}

// ==========================================
// 排放类别 (Emission Category)
// ==========================================
// 顺序即报表展示顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionCategory {
    Materials,   // 原材料
    Logistics,   // 运输
    Electricity, // 电力
    Water,       // 用水
    Production,  // 生产（辅料 + 估算缝纫电耗）
}

impl EmissionCategory {
    pub const ALL: [EmissionCategory; 5] = [
        EmissionCategory::Materials,
        EmissionCategory::Logistics,
        EmissionCategory::Electricity,
        EmissionCategory::Water,
        EmissionCategory::Production,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmissionCategory::Materials => "materials",
            EmissionCategory::Logistics => "logistics",
            EmissionCategory::Electricity => "electricity",
            EmissionCategory::Water => "water",
            EmissionCategory::Production => "production",
        }
    }

    /// i18n 标签键
    pub fn label_key(&self) -> String {
        format!("category.{}", self.as_str())
    }
}

impl fmt::Display for EmissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 面积单位 (Area Unit)
// ==========================================
// 引擎口径统一为公顷；录入端可按英亩/莱输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    Hectare,
    Acre,
    Rai,
}

/// 1 英亩 = 0.404686 公顷
pub const HECTARES_PER_ACRE: f64 = 0.404686;

/// 1 公顷 = 6.25 莱
pub const RAI_PER_HECTARE: f64 = 6.25;

impl AreaUnit {
    /// 换算为公顷
    pub fn to_hectares(&self, value: f64) -> f64 {
        match self {
            AreaUnit::Hectare => value,
            AreaUnit::Acre => value * HECTARES_PER_ACRE,
            AreaUnit::Rai => value / RAI_PER_HECTARE,
        }
    }

    /// 由公顷换算为本单位
    pub fn from_hectares(&self, hectares: f64) -> f64 {
        match self {
            AreaUnit::Hectare => hectares,
            AreaUnit::Acre => hectares / HECTARES_PER_ACRE,
            AreaUnit::Rai => hectares * RAI_PER_HECTARE,
        }
    }
}
