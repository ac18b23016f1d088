// Telemetry module for structured logging and metrics

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging with JSON formatting
///
/// `RUST_LOG` takes precedence over `log_level` when set. Fails if a global
/// subscriber is already installed.
#[tracing::instrument(skip_all)]
pub fn init_logging(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(log_level = log_level, "Structured logging initialized");

    Ok(())
}

/// Register metric descriptions with whatever recorder the host installed
///
/// - passhash_hash_total: records produced, labelled by outcome
/// - passhash_verify_total: verifications, labelled by outcome
/// - passhash_hash_duration_seconds: time spent deriving new records
pub fn describe_metrics() {
    describe_counter!(
        "passhash_hash_total",
        "Total number of password hash operations"
    );
    describe_counter!(
        "passhash_verify_total",
        "Total number of password verifications"
    );
    describe_histogram!(
        "passhash_hash_duration_seconds",
        "Duration of password hash derivation in seconds"
    );
}

#[inline]
pub fn record_hash(outcome: &'static str, cost: u32) {
    counter!("passhash_hash_total", "outcome" => outcome, "cost" => cost.to_string())
        .increment(1);
}

#[inline]
pub fn record_hash_duration(cost: u32, duration_seconds: f64) {
    histogram!("passhash_hash_duration_seconds", "cost" => cost.to_string())
        .record(duration_seconds);
}

/// Outcome is one of `match`, `mismatch`, or an error kind
#[inline]
pub fn record_verify(outcome: &'static str) {
    counter!("passhash_verify_total", "outcome" => outcome).increment(1);
}
