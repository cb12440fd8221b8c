//! Logging and optional OTLP trace export.
//!
//! Logs always go to stdout through `tracing-subscriber`. When
//! `OTEL_EXPORTER_OTLP_ENDPOINT` is set, spans are also exported over gRPC.

use anyhow::{Context, Result, anyhow};
use base64ct::{Base64, Encoding};
use opentelemetry::{
    KeyValue, global, propagation::TextMapCompositePropagator, trace::TracerProvider as _,
};
use opentelemetry_otlp::{Compression, SpanExporter, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    Resource,
    propagation::{BaggagePropagator, TraceContextPropagator},
    trace::SdkTracerProvider,
};
use std::{env, sync::OnceLock, time::Duration};
use tonic::{
    metadata::{Ascii, Binary, MetadataKey, MetadataMap, MetadataValue},
    transport::ClientTlsConfig,
};
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};
use ulid::Ulid;

const ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
const HEADERS_VAR: &str = "OTEL_EXPORTER_OTLP_HEADERS";
const PROTOCOL_VAR: &str = "OTEL_EXPORTER_OTLP_PROTOCOL";
const INSTANCE_VAR: &str = "OTEL_SERVICE_INSTANCE_ID";

const EXPORT_TIMEOUT: Duration = Duration::from_secs(3);
const QUIET_TARGETS: [&str; 3] = ["hyper=error", "tokio=error", "opentelemetry_sdk=warn"];

static PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Where and how spans are shipped, read from the standard `OTEL_*` variables.
struct Collector {
    endpoint: String,
    metadata: MetadataMap,
    instance_id: String,
}

impl Collector {
    fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// `None` when no endpoint is configured.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        let Some(endpoint) = lookup(ENDPOINT_VAR) else {
            return Ok(None);
        };

        if let Some(protocol) = lookup(PROTOCOL_VAR).filter(|p| p.as_str() != "grpc") {
            debug!("{PROTOCOL_VAR}={protocol} ignored; spans are exported over gRPC");
        }

        let metadata = match lookup(HEADERS_VAR) {
            Some(raw) => collector_metadata(&raw).with_context(|| format!("invalid {HEADERS_VAR}"))?,
            None => MetadataMap::new(),
        };

        Ok(Some(Self {
            endpoint: with_scheme(&endpoint),
            metadata,
            instance_id: lookup(INSTANCE_VAR).unwrap_or_else(|| Ulid::new().to_string()),
        }))
    }

    /// Host checked against the collector certificate; only for `https` endpoints.
    fn tls_domain(&self) -> Option<&str> {
        let authority = self.endpoint.strip_prefix("https://")?.split('/').next()?;
        authority.split(':').next().filter(|host| !host.is_empty())
    }

    fn exporter(&self) -> Result<SpanExporter> {
        let mut builder = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&self.endpoint)
            .with_compression(Compression::Gzip)
            .with_timeout(EXPORT_TIMEOUT);

        if let Some(domain) = self.tls_domain() {
            builder = builder.with_tls_config(
                ClientTlsConfig::new()
                    .domain_name(domain)
                    .with_native_roots(),
            );
        }
        if !self.metadata.is_empty() {
            builder = builder.with_metadata(self.metadata.clone());
        }

        Ok(builder.build()?)
    }

    fn provider(&self) -> Result<SdkTracerProvider> {
        let resource = Resource::builder_empty()
            .with_attributes([
                KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                KeyValue::new("service.instance.id", self.instance_id.clone()),
            ])
            .build();

        Ok(SdkTracerProvider::builder()
            .with_batch_exporter(self.exporter()?)
            .with_resource(resource)
            .build())
    }
}

/// gRPC needs a scheme; bare `host:port` endpoints are assumed to be TLS.
fn with_scheme(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint.trim_end_matches('/'))
    }
}

/// Parse `key=value,key=value` into gRPC metadata.
///
/// Keys are lowercased. Keys ending in `-bin` take base64 values and are sent
/// as binary metadata. Entries without `=` are skipped.
fn collector_metadata(raw: &str) -> Result<MetadataMap> {
    let mut metadata = MetadataMap::new();

    for (key, value) in raw.split(',').filter_map(|pair| pair.split_once('=')) {
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        if key.ends_with("-bin") {
            let name = MetadataKey::<Binary>::from_bytes(key.as_bytes())
                .map_err(|e| anyhow!("metadata key {key}: {e}"))?;
            let bytes = Base64::decode_vec(value)
                .map_err(|e| anyhow!("metadata key {key}: value is not base64: {e}"))?;
            metadata.insert_bin(name, MetadataValue::from_bytes(&bytes));
        } else {
            let name = MetadataKey::<Ascii>::from_bytes(key.as_bytes())
                .map_err(|e| anyhow!("metadata key {key}: {e}"))?;
            let value: MetadataValue<Ascii> = value
                .parse()
                .map_err(|e| anyhow!("metadata key {key}: {e}"))?;
            metadata.insert(name, value);
        }
    }

    Ok(metadata)
}

fn env_filter(default: Level) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    for directive in QUIET_TARGETS {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

fn install_provider(provider: SdkTracerProvider) {
    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));
    global::set_tracer_provider(provider.clone());
    let _ = PROVIDER.set(provider);
}

/// Install the global subscriber, exporting spans when a collector is configured.
///
/// `verbosity_level` defaults to `ERROR`; `RUST_LOG` directives still apply.
///
/// # Errors
/// Returns an error if the OTLP settings are invalid, the exporter cannot be
/// built, or a global subscriber is already installed.
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let filter = env_filter(verbosity_level.unwrap_or(Level::ERROR))?;
    let stdout = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .pretty();
    let registry = Registry::default().with(stdout);

    match Collector::from_env()? {
        Some(collector) => {
            let provider = collector.provider()?;
            let tracer = provider.tracer(env!("CARGO_PKG_NAME"));
            install_provider(provider);

            let spans = tracing_opentelemetry::layer().with_tracer(tracer);
            tracing::subscriber::set_global_default(registry.with(spans).with(filter))?;
            debug!(endpoint = %collector.endpoint, "exporting spans");
        }
        None => tracing::subscriber::set_global_default(registry.with(filter))?,
    }

    Ok(())
}

/// Flush pending spans; does nothing when no collector was configured.
pub fn shutdown_tracer() {
    let Some(provider) = PROVIDER.get() else {
        return;
    };
    if let Err(err) = provider.shutdown() {
        debug!("tracer provider shutdown: {err}");
    }
}
