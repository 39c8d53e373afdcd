// ==========================================
// 供应链碳足迹计算器 - 日志
// ==========================================
// 输出: stderr（stdout 留给 CLI 的 JSON / 表格输出）
// 级别: RUST_LOG,缺省 info
// 格式: FOLKCHARM_IMPACT_LOG_FORMAT=json 切换为结构化 JSON
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 输出格式环境变量
pub const LOG_FORMAT_ENV: &str = "FOLKCHARM_IMPACT_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// 解析环境变量值（大小写不敏感）,无法识别时按 Text
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    /// 从 [`LOG_FORMAT_ENV`] 读取
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|v| Self::from_env_value(&v))
            .unwrap_or_default()
    }
}

/// 初始化日志（CLI 入口调用一次）
///
/// ```no_run
/// folkcharm_impact::logging::init();
/// ```
pub fn init() {
    init_with_format(LogFormat::from_env());
}

/// 以指定格式初始化日志,重复初始化时静默忽略
pub fn init_with_format(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

/// 测试用: debug 级别,输出交给测试框架捕获
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
