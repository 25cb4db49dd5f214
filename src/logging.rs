use std::str::FromStr;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;
use crate::error::ConfigError;

/// Log file rotation period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Hourly,
    Daily,
    Never,
}

impl FromStr for Rotation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(Rotation::Hourly),
            "daily" => Ok(Rotation::Daily),
            "never" => Ok(Rotation::Never),
            other => Err(ConfigError::Invalid(format!(
                "rotation `{}` (expected hourly, daily or never)",
                other
            ))),
        }
    }
}

impl Rotation {
    fn appender(self, dir: &str, file: &str) -> RollingFileAppender {
        match self {
            Rotation::Hourly => rolling::hourly(dir, file),
            Rotation::Daily => rolling::daily(dir, file),
            Rotation::Never => rolling::never(dir, file),
        }
    }
}

/// Dependencies (hyper, reqwest) log at `warn`; this crate at the configured level.
/// `RUST_LOG` overrides both.
pub fn default_directives(log_level: &str) -> String {
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), log_level)
}

/// Install the global subscriber; keep the returned guard alive to flush the file writer
pub fn init_logging(config: &AppConfig) -> Result<WorkerGuard, TryInitError> {
    // Validated on load; an unknown value here falls back to a single file
    let rotation = config.rotation.parse().unwrap_or(Rotation::Never);
    let (non_blocking, guard) =
        tracing_appender::non_blocking(rotation.appender(&config.log_dir, &config.log_file));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).try_init()?;
    } else {
        let file_layer = fmt::layer()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).try_init()?;
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_parse() {
        assert_eq!("hourly".parse::<Rotation>().unwrap(), Rotation::Hourly);
        assert_eq!("daily".parse::<Rotation>().unwrap(), Rotation::Daily);
        assert_eq!("never".parse::<Rotation>().unwrap(), Rotation::Never);
        assert!("weekly".parse::<Rotation>().is_err());
    }

    #[test]
    fn test_default_directives_scope_crate() {
        assert_eq!(default_directives("debug"), "warn,dataflow_control=debug");
    }
}
