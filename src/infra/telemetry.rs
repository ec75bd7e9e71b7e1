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
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
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
            "blocksite_cache_hit_total",
            Unit::Count,
            "Documents reused from the render cache."
        );
        describe_counter!(
            "blocksite_cache_miss_total",
            Unit::Count,
            "Documents fetched and rendered because the cache had no matching stamp."
        );
        describe_counter!(
            "blocksite_documents_failed_total",
            Unit::Count,
            "Documents excluded from a build after a fetch or render failure."
        );
        describe_counter!(
            "blocksite_pages_written_total",
            Unit::Count,
            "Final pages written with navigation."
        );
        describe_histogram!(
            "blocksite_render_ms",
            Unit::Milliseconds,
            "Block tree render latency in milliseconds."
        );
    });
}
