use std::io;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub include_file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            include_file_location: false,
        }
    }
}

impl LoggingConfig {
    /// 根据 debug 开关创建配置
    pub fn from_debug(debug: bool) -> Self {
        Self {
            level: if debug { Level::DEBUG } else { Level::INFO },
            include_file_location: debug,
            ..Default::default()
        }
    }

    /// 默认的过滤指令，例如 `branch_report=info`
    pub fn default_directive(&self) -> String {
        format!("branch_report={}", self.level.as_str().to_lowercase())
    }
}

/// 设置日志系统
///
/// 日志写到 stderr，stdout 只留给最终的确认信息。
pub fn setup_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::from_default_env().add_directive(config.default_directive().parse()?);

    let layer = fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true);

    let layer = if config.include_file_location {
        layer.with_file(true).with_line_number(true).boxed()
    } else {
        layer.boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()?;

    Ok(())
}
