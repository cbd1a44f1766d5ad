// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志输出选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// JSON 行格式（便于采集）
    pub json: bool,
    /// 未设置 RUST_LOG 时使用 debug 级别
    pub verbose: bool,
}

impl LogOptions {
    /// 默认过滤器（RUST_LOG 优先）
    pub fn default_directive(&self) -> &'static str {
        if self.verbose {
            "lab_equipment_import=debug,info"
        } else {
            "info"
        }
    }
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=lab_equipment_import=trace
///
/// # 示例
/// ```no_run
/// use lab_equipment_import::logging::{self, LogOptions};
/// logging::init(LogOptions::default());
/// ```
pub fn init(options: LogOptions) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_directive()));

    // 日志写到 stderr，stdout 留给命令输出
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let result = if options.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("日志系统初始化失败: {}", e);
    }
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(LogOptions::default().default_directive(), "info");
        let verbose = LogOptions {
            verbose: true,
            ..LogOptions::default()
        };
        assert!(verbose.default_directive().contains("debug"));
    }

    #[test]
    fn test_init_test_is_idempotent() {
        init_test();
        init_test();
        tracing::debug!("logging ready");
    }
}
