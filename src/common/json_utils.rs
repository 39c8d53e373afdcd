// ==========================================
// 供应链碳足迹计算器 - JSON 宽容读取工具
// ==========================================
// 职责: 从"形状未知"的 serde_json::Value 中按别名读取字段
// 红线: 任何读取都不返回错误,缺失/类型不符按默认值处理
// ==========================================

use crate::common::numeric::{to_non_negative_count, to_non_negative_number};
use serde_json::Value;

/// 按别名顺序查找字段（跳过 null）
///
/// # 参数
/// - `obj`: 任意 JSON 值（非对象时直接返回 None）
/// - `keys`: 候选字段名,按优先级排列
///
/// # 示例
/// ```
/// use folkcharm_impact::common::field;
/// use serde_json::json;
///
/// let v = json!({"weightKg": null, "weight": 12});
/// assert_eq!(field(&v, &["weightKg", "weight"]), Some(&json!(12)));
/// assert_eq!(field(&v, &["missing"]), None);
/// ```
pub fn field<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = obj.as_object()?;
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

/// 读取非负数值字段（缺失/非法按 0）
pub fn read_number(obj: &Value, keys: &[&str]) -> f64 {
    field(obj, keys).map(to_non_negative_number).unwrap_or(0.0)
}

/// 读取非负整数计数字段（缺失/非法按 0）
pub fn read_count(obj: &Value, keys: &[&str]) -> u64 {
    field(obj, keys).map(to_non_negative_count).unwrap_or(0)
}

/// 读取字符串字段
///
/// - String: 原样
/// - Number / Bool: 转为字符串（旧版本 id 可能是数字）
/// - 其他: 空串
pub fn read_string(obj: &Value, keys: &[&str]) -> String {
    read_optional_string(obj, keys).unwrap_or_default()
}

/// 读取可选字符串字段（空串视为 None）
pub fn read_optional_string(obj: &Value, keys: &[&str]) -> Option<String> {
    let raw = match field(obj, keys)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

/// 读取数组字段（缺失或非数组返回空切片）
pub fn read_array<'a>(obj: &'a Value, keys: &[&str]) -> &'a [Value] {
    field(obj, keys)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
