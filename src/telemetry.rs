//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! LOG_LEVEL sets the filter, either a bare level ("debug") or full
//! directives; LOG_FORMAT picks "pretty" (default) or "json". Targets,
//! file and line are included so the quiz/advisor/http sources stay
//! distinguishable in one stream.

use tracing_subscriber::EnvFilter;

/// Default directives: chatty for our own targets, calm for the stack.
const DEFAULT_DIRECTIVES: &str =
    "info,quiz=debug,advisor=debug,tonedeck_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // The fmt and json builders are different types; init inside each arm.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
