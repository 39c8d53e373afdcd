// ==========================================
// 供应链碳足迹计算器 - 数值归一化
// ==========================================
// 红线: NaN / 无穷 / 负数 / 缺失 一律视为 0（零贡献,不报错）
// 用途: 迁移器读取 JSON 叶子节点、引擎读取 f64 字段时统一调用
// ==========================================

use serde_json::Value;

/// 将 f64 归一化为有限非负数
///
/// # 规则
/// - 有限且 > 0: 原样返回
/// - NaN / ±∞ / ≤ 0 / -0.0: 返回 0.0
///
/// # 示例
/// ```
/// use folkcharm_impact::common::non_negative;
///
/// assert_eq!(non_negative(12.5), 12.5);
/// assert_eq!(non_negative(-3.0), 0.0);
/// assert_eq!(non_negative(f64::NAN), 0.0);
/// ```
pub fn non_negative(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

/// 将任意 JSON 值归一化为有限非负数
///
/// # 规则
/// - Number: 取 f64 后走 [`non_negative`]
/// - String: 去空白后按 f64 解析（前端表单常以字符串存数值）,失败按 0
/// - Null / Bool / Array / Object: 0
///
/// # 示例
/// ```
/// use folkcharm_impact::common::to_non_negative_number;
/// use serde_json::json;
///
/// assert_eq!(to_non_negative_number(&json!(40)), 40.0);
/// assert_eq!(to_non_negative_number(&json!("0.5")), 0.5);
/// assert_eq!(to_non_negative_number(&json!(null)), 0.0);
/// assert_eq!(to_non_negative_number(&json!("abc")), 0.0);
/// ```
pub fn to_non_negative_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().map(non_negative).unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(non_negative)
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// 将任意 JSON 值归一化为非负整数计数（小数部分截断）
pub fn to_non_negative_count(value: &Value) -> u64 {
    let x = to_non_negative_number(value).trunc();
    if x >= u64::MAX as f64 {
        u64::MAX
    } else {
        x as u64
    }
}

/// 与顺序无关的求和
///
/// 浮点加法不满足结合律,直接按录入顺序累加时,调换条目顺序可能改变末位。
/// 此处先按 `total_cmp` 排序再累加,保证同一组数值的结果逐位一致。
pub fn order_independent_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut items: Vec<f64> = values.into_iter().collect();
    items.sort_by(|a, b| a.total_cmp(b));
    items.into_iter().sum()
}
