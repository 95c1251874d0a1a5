use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter directive for the configured level
///
/// Per-allocation events are logged under the `REGNO` target; they are
/// switched off unless `enable_tracing` is set.
pub fn filter_directive(config: &AppConfig) -> String {
    if config.enable_tracing {
        config.log_level.clone()
    } else {
        format!("{},REGNO=off", config.log_level)
    }
}

/// Filter for the stdout layer, if it should differ from the file layer
pub fn console_filter(config: &AppConfig) -> Option<EnvFilter> {
    let level = config.console_level.as_deref()?;
    let directive = if config.enable_tracing {
        level.to_string()
    } else {
        format!("{},REGNO=off", level)
    };
    match EnvFilter::try_new(&directive) {
        Ok(filter) => Some(filter),
        Err(e) => {
            eprintln!("Ignoring console_level '{}': {}", level, e);
            None
        }
    }
}

/// Install the global subscriber; keep the guard alive until shutdown
///
/// JSON mode writes only to the log file. Text mode writes to the file and to
/// stdout, with `console_level` narrowing what reaches the terminal.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer()
            .with_target(false)
            .with_ansi(true)
            .with_filter(console_filter(config));
        registry.with(file_layer).with(stdout_layer).init();
    }

    tracing::info!(
        log_dir = %config.log_dir,
        log_file = %config.log_file,
        rotation = %config.rotation,
        json = config.use_json,
        allocation_trace = config.enable_tracing,
        "Logging initialized"
    );

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn config(enable_tracing: bool) -> AppConfig {
        AppConfig::from_yaml(&format!(
            "log_level: info\nlog_dir: ./logs\nlog_file: t.log\nuse_json: false\nrotation: never\nenable_tracing: {enable_tracing}\n"
        ))
        .unwrap()
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(&config(true)), "info");
        assert_eq!(filter_directive(&config(false)), "info,REGNO=off");
    }

    #[test]
    fn test_console_filter() {
        assert!(console_filter(&config(true)).is_none());

        let mut quiet = config(false);
        quiet.console_level = Some("warn".into());
        let filter = console_filter(&quiet).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        quiet.console_level = Some("olympiad_registration=loud".into());
        assert!(console_filter(&quiet).is_none());
    }

    #[test]
    fn test_filter_directive_parses() {
        assert!(EnvFilter::try_new(filter_directive(&config(false))).is_ok());
    }
}
