//! Logging setup: `RUST_LOG` wins when set, otherwise the level from the
//! settings file. Diagnostics go to stderr so the rendered diff on stdout
//! stays pipeable.

use tracing_subscriber::EnvFilter;

use super::settings::LoggerSettings;

pub fn setup_logging(settings: &LoggerSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.clone()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if settings.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
