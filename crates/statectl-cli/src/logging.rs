use std::io;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::{LogFormat, LogLevel};

/// Install the global subscriber, writing to stderr. `RUST_LOG` takes
/// precedence over `level` when set.
pub fn init(level: LogLevel, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let layer = fmt::layer().with_writer(io::stderr);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .try_init()
                .ok();
        }
        LogFormat::Logfmt => {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .ok();
        }
    }
}
