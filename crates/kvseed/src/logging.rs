use std::path::PathBuf;

use kvseed_config::LogFilter;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

const LOG_FILE_NAME: &str = "kvseed.log";

macro_rules! create_logfile {
    ($log_dir:ident, $log_level:ident) => {
        tracing_subscriber::fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily($log_dir, LOG_FILE_NAME))
            .with_filter(LevelFilter::from($log_level))
    };
}

macro_rules! create_printer {
    ($p:expr, $log_level:ident) => {
        tracing_subscriber::fmt::layer()
            .with_writer($p)
            .with_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::from($log_level).into())
                    .from_env_lossy(),
            )
    };
}

/// Install the global subscriber.
///
/// Logs go to stderr so they never mix with the rows printed on stdout.
/// `RUST_LOG` overrides `log_level` for stderr; the optional log file always
/// uses `log_level`.
pub fn setup_logging(log_dir: Option<PathBuf>, log_level: LogFilter) {
    let registry = tracing_subscriber::registry().with(create_printer!(std::io::stderr, log_level));
    if let Some(log_dir) = log_dir {
        registry.with(create_logfile!(log_dir, log_level)).init();
    } else {
        registry.init();
    }
}
