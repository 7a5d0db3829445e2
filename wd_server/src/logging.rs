//! Structured logging configuration.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,hyper=warn,tower_http=warn";

/// Initialize structured logging
///
/// Log levels come from the `RUST_LOG` env var. Records emitted by the
/// engine through the `log` facade are captured as well.
///
/// # Example
///
/// ```no_run
/// use wd_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a connection lifecycle event with structured fields
pub fn log_connection_event(event: &str, connection: &str, detail: Option<&str>) {
    tracing::info!(
        event = event,
        connection = connection,
        detail = detail,
        "CONNECTION: {}",
        event
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_log_connection_event() {
        // Just ensure it doesn't panic without a subscriber
        log_connection_event("opened", "conn-1", None);
        log_connection_event("rejected", "conn-2", Some("The game already has two players."));
    }
}
