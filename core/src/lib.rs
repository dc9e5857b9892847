pub mod config;
pub mod error;
pub mod model;

use crate::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber. Returns `false` if one was already set.
pub fn init_tracing(logging: &LoggingConfig) -> bool {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (json_layer, fmt_layer) = if logging.json {
        (Some(tracing_subscriber::fmt::layer().json().with_target(false)), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer().with_target(false)))
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(json_layer)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
