use opentelemetry_sdk::trace::{self, RandomIdGenerator, Sampler, Tracer};
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::model::configuration::{TelemetryConfiguration, TelemetryExporter};

/// Logs on stdout, filtered by `log_filter`, plus spans sent to the configured exporter
pub fn get_subscriber(
    service_name: &str,
    configuration: &TelemetryConfiguration,
) -> impl Subscriber + Sync + Send {
    let exporter = configuration
        .exporter
        .as_ref()
        .and_then(|exporter| build_exporter_layer(service_name, exporter));

    Registry::default()
        .with(exporter)
        .with(EnvFilter::new(&configuration.log_filter))
        .with(tracing_subscriber::fmt::Layer::new())
}

/// Install the subscriber globally, `log` records included
pub fn init_subscriber(
    subscriber: impl Subscriber + Sync + Send + 'static,
) -> Result<(), TryInitError> {
    subscriber.try_init()
}

/// Flush the spans still waiting for an exporter
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

// A broken exporter only costs the traces, the service still starts
fn build_exporter_layer<S>(
    service_name: &str,
    exporter: &TelemetryExporter,
) -> Option<OpenTelemetryLayer<S, Tracer>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let tracer = match exporter {
        TelemetryExporter::Datadog { agent_endpoint } => opentelemetry_datadog::new_pipeline()
            .with_service_name(service_name)
            .with_agent_endpoint(agent_endpoint)
            .with_trace_config(
                trace::config()
                    .with_sampler(Sampler::AlwaysOn)
                    .with_id_generator(RandomIdGenerator::default()),
            )
            .install_batch(opentelemetry_sdk::runtime::Tokio),
        TelemetryExporter::Jaeger => opentelemetry_jaeger::new_agent_pipeline()
            .with_service_name(service_name)
            .install_batch(opentelemetry_sdk::runtime::Tokio),
    };

    match tracer {
        Ok(tracer) => Some(tracing_opentelemetry::layer().with_tracer(tracer)),
        Err(err) => {
            eprintln!("Cannot export traces to {:?}: {}", exporter, err);
            None
        }
    }
}
