//! Logging integration for searchy-rs.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-field
//! resolution spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; otherwise a structured JSON format is used.
/// Installing a second subscriber is silently ignored.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for the join resolution of a single field.
///
/// # Examples
///
/// ```
/// use searchy_core::logging::resolution_span;
///
/// let span = resolution_span("Person", "nickNames");
/// let _guard = span.enter();
/// tracing::debug!("resolving join");
/// ```
pub fn resolution_span(entity_type: &str, field_name: &str) -> tracing::Span {
    tracing::debug_span!("join_resolution", entity = entity_type, field = field_name)
}
