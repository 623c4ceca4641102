use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Output always goes to stderr: in stdio mode stdout carries protocol frames only.
pub fn init(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}
