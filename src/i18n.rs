// ==========================================
// 供应链碳足迹计算器 - 界面文案
// ==========================================
// 文案表: locales/en.yml、locales/zh-CN.yml（lib.rs 中 i18n! 加载）
// 语言: en 为缺省与回退,另支持 zh-CN
// 红线: 语言只影响文案,不影响任何计算结果
// ==========================================

use crate::domain::types::EmissionCategory;

/// 缺省 / 回退语言
pub const DEFAULT_LOCALE: &str = "en";

/// 已提供文案表的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh-CN"];

/// 把配置里的语言写法归一到已支持的语言代码
///
/// 大小写与 `_` / `-` 不敏感,地区后缀按主语言匹配（en-US → en,zh / zh_cn → zh-CN）。
/// 无法识别时返回 None
pub fn resolve_locale(locale: &str) -> Option<&'static str> {
    let normalized = locale.trim().replace('_', "-").to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }

    if let Some(exact) = SUPPORTED_LOCALES
        .iter()
        .find(|l| l.to_ascii_lowercase() == normalized)
    {
        return Some(*exact);
    }

    match normalized.split('-').next() {
        Some("en") => Some("en"),
        Some("zh") => Some("zh-CN"),
        _ => None,
    }
}

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换界面语言,返回实际生效的语言
///
/// 未知语言回退到 [`DEFAULT_LOCALE`] 并记 warn
pub fn set_locale(locale: &str) -> &'static str {
    let applied = match resolve_locale(locale) {
        Some(l) => l,
        None => {
            tracing::warn!(requested = locale, fallback = DEFAULT_LOCALE, "不支持的界面语言");
            DEFAULT_LOCALE
        }
    };
    rust_i18n::set_locale(applied);
    applied
}

/// 翻译消息（无参数）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息,替换 `%{name}` 占位符
///
/// ```no_run
/// use folkcharm_impact::i18n::t_with_args;
/// let msg = t_with_args("validation.vehicle_required", &[("index", "2")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |text, (name, value)| {
        text.replace(&format!("%{{{}}}", name), value)
    })
}

/// 排放类别的本地化名称
pub fn category_label(category: EmissionCategory) -> String {
    t(&category.label_key())
}

/// 测试共用: rust-i18n 的 locale 为全局状态,涉及文案断言的测试需串行
#[cfg(test)]
pub(crate) static LOCALE_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
