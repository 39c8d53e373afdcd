// ==========================================
// 供应链碳足迹计算器 - 公共工具模块
// ==========================================
// 职责: 数值归一化与宽容 JSON 读取
// 目标: "非法数值按 0 计" 的口径集中在一处
// ==========================================

/// 数值归一化工具
pub mod numeric;

/// JSON 宽容读取工具
pub mod json_utils;

// 重新导出常用函数
pub use json_utils::{field, read_array, read_count, read_number, read_optional_string, read_string};
pub use numeric::{non_negative, order_independent_sum, to_non_negative_count, to_non_negative_number};
