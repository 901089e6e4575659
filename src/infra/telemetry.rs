use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "civitas_backend_requests_total",
            Unit::Count,
            "Backend REST requests by method and outcome."
        );
        describe_histogram!(
            "civitas_backend_request_ms",
            Unit::Milliseconds,
            "Backend REST request latency in milliseconds."
        );
        describe_counter!(
            "civitas_optimistic_rollbacks_total",
            Unit::Count,
            "Optimistic admin changes rolled back after a failed request."
        );
        describe_counter!(
            "civitas_uploads_total",
            Unit::Count,
            "Admin image uploads by outcome."
        );
        describe_counter!(
            "civitas_intake_submissions_total",
            Unit::Count,
            "Public callback and membership submissions by outcome."
        );
    });
}
