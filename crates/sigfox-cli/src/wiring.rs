// crates/sigfox-cli/src/wiring.rs
// ============================================================================
// Module: CLI Component Wiring
// Description: Builds pipeline components from a validated configuration.
// Purpose: Turn sigfox-pipeline.toml into step handlers and callback ingestors.
// Dependencies: sigfox-broker, sigfox-config, sigfox-runtime, sigfox-steps
// ============================================================================

//! ## Overview
//! Each `build_*` function maps one config section onto the collaborator
//! implementations shipped with the workspace. [`build_step_handler`] and
//! [`build_callback_ingestor`] assemble the two process entry points.
//! Invariants:
//! - Callers pass a configuration that already passed `validate()`.
//! - Log publishers and JSON-line sinks append to their files.
//! - A missing token variable is a wiring error, never an anonymous request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs::File;
use std::fs::OpenOptions;
use std::sync::Arc;

use sigfox_broker::DEFAULT_METADATA_ENDPOINT;
use sigfox_broker::DEFAULT_ROUTE_KEY;
use sigfox_broker::HttpTriggerDecoder;
use sigfox_broker::JsonLinesEventSink;
use sigfox_broker::LogPublisher;
use sigfox_broker::MetadataRouteSource;
use sigfox_broker::PubSubConfig;
use sigfox_broker::PubSubPublisher;
use sigfox_broker::QueueTriggerDecoder;
use sigfox_broker::StderrEventSink;
use sigfox_config::CallbackConfig;
use sigfox_config::DedupConfig;
use sigfox_config::FunctionConfig;
use sigfox_config::PipelineConfig;
use sigfox_config::PublisherConfig;
use sigfox_config::PublisherKind;
use sigfox_config::RoutingConfig;
use sigfox_config::SinkKind;
use sigfox_config::TelemetryConfig;
use sigfox_config::TriggerKind;
use sigfox_core::Clock;
use sigfox_core::DedupCheck;
use sigfox_core::EventSink;
use sigfox_core::NoopEventSink;
use sigfox_core::Publisher;
use sigfox_core::RouteLookup;
use sigfox_core::SystemClock;
use sigfox_core::TriggerDecoder;
use sigfox_runtime::CachedRouteLookup;
use sigfox_runtime::CallbackIngestor;
use sigfox_runtime::DownlinkData;
use sigfox_runtime::InMemorySeenStore;
use sigfox_runtime::RecentMessageFilter;
use sigfox_runtime::StaticRouteTable;
use sigfox_runtime::StepHandler;
use sigfox_runtime::StepHandlerBuilder;
use sigfox_steps::BuiltinStep;
use sigfox_steps::StepDependencies;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while assembling components from configuration.
#[derive(Debug, Error)]
pub enum WiringError {
    /// Publisher could not be constructed.
    #[error("publisher: {0}")]
    Publisher(String),
    /// Event sink could not be constructed.
    #[error("telemetry: {0}")]
    Telemetry(String),
    /// Route source could not be constructed.
    #[error("routing: {0}")]
    Routing(String),
    /// Step task could not be built.
    #[error("step: {0}")]
    Step(String),
    /// Handler builder rejected its collaborators.
    #[error("handler: {0}")]
    Handler(String),
    /// Callback settings could not be applied.
    #[error("callback: {0}")]
    Callback(String),
}

// ============================================================================
// SECTION: Collaborators
// ============================================================================

/// Builds the queue publisher selected by `config`.
///
/// # Errors
///
/// Returns [`WiringError::Publisher`] when the log file cannot be opened, the
/// token variable is unset, or the HTTP client cannot be built.
pub fn build_publisher(config: &PublisherConfig) -> Result<Arc<dyn Publisher>, WiringError> {
    match config.kind {
        PublisherKind::Log => match &config.path {
            Some(path) => {
                let file =
                    open_append(path).map_err(|err| WiringError::Publisher(err.to_string()))?;
                Ok(Arc::new(LogPublisher::new(file)))
            }
            None => Ok(Arc::new(LogPublisher::new(std::io::stderr()))),
        },
        PublisherKind::Pubsub => {
            let mut settings = PubSubConfig::new(config.project.clone().unwrap_or_default());
            if let Some(endpoint) = &config.endpoint {
                settings.endpoint.clone_from(endpoint);
            }
            if let Some(token_env) = &config.token_env {
                let token = env::var(token_env).map_err(|_| {
                    WiringError::Publisher(format!("token variable {token_env} is not set"))
                })?;
                settings.bearer_token = Some(token);
            }
            settings.connect_timeout = config.connect_timeout();
            settings.request_timeout = config.request_timeout();
            let publisher =
                PubSubPublisher::new(settings).map_err(|err| WiringError::Publisher(err.to_string()))?;
            Ok(Arc::new(publisher))
        }
    }
}

/// Builds the event sink selected by `config`.
///
/// # Errors
///
/// Returns [`WiringError::Telemetry`] when the JSON-lines file cannot be opened.
pub fn build_event_sink(config: &TelemetryConfig) -> Result<Arc<dyn EventSink>, WiringError> {
    match (config.sink, &config.path) {
        (SinkKind::Stderr, _) => Ok(Arc::new(StderrEventSink)),
        (SinkKind::None, _) => Ok(Arc::new(NoopEventSink)),
        (SinkKind::Jsonl, Some(path)) => {
            let file = open_append(path).map_err(|err| WiringError::Telemetry(err.to_string()))?;
            Ok(Arc::new(JsonLinesEventSink::new(file)))
        }
        (SinkKind::Jsonl, None) => {
            Err(WiringError::Telemetry("jsonl sink requires a path".to_string()))
        }
    }
}

/// Builds the trigger decoder, with `force_http` overriding the configured kind.
#[must_use]
pub fn build_decoder(config: &FunctionConfig, force_http: bool) -> Arc<dyn TriggerDecoder> {
    if force_http || config.trigger == TriggerKind::Http {
        Arc::new(HttpTriggerDecoder::new(config.source_path.clone()))
    } else {
        Arc::new(QueueTriggerDecoder::new())
    }
}

/// Builds the static route table described by `config`.
#[must_use]
pub fn static_route_table(config: &RoutingConfig) -> StaticRouteTable {
    let table = config.routes.iter().fold(StaticRouteTable::new(), |table, entry| {
        table.with_entry(entry.devices.iter().cloned(), entry.route.clone())
    });
    match &config.default_route {
        Some(route) => table.with_default(route.clone()),
        None => table,
    }
}

/// Builds the route lookup, if any route source is configured.
///
/// # Errors
///
/// Returns [`WiringError::Routing`] when the metadata endpoint is not a URL.
pub fn build_route_lookup(
    config: &RoutingConfig,
    clock: &Arc<dyn Clock>,
) -> Result<Option<Arc<dyn RouteLookup>>, WiringError> {
    if let Some(metadata) = &config.metadata {
        let endpoint = metadata.endpoint.as_deref().unwrap_or(DEFAULT_METADATA_ENDPOINT);
        let key = metadata.key.as_deref().unwrap_or(DEFAULT_ROUTE_KEY);
        let source = MetadataRouteSource::new(endpoint, key)
            .map_err(|err| WiringError::Routing(err.to_string()))?;
        let lookup = CachedRouteLookup::new(source, Arc::clone(clock)).with_ttl(config.cache_ttl());
        return Ok(Some(Arc::new(lookup)));
    }
    if config.is_configured() {
        return Ok(Some(Arc::new(static_route_table(config))));
    }
    Ok(None)
}

/// Builds the duplicate filter when enabled.
#[must_use]
pub fn build_dedup(config: &DedupConfig, clock: &Arc<dyn Clock>) -> Option<Arc<dyn DedupCheck>> {
    if !config.enabled {
        return None;
    }
    let store =
        InMemorySeenStore::new(Arc::clone(clock)).with_ttl(config.ttl()).with_capacity(config.capacity);
    Some(Arc::new(RecentMessageFilter::new(store)))
}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Assembles the step handler for built-in step `function`.
///
/// # Errors
///
/// Returns [`WiringError`] when the function is not a built-in step, a
/// collaborator cannot be built, or the handler builder rejects the result.
pub fn build_step_handler(
    config: &PipelineConfig,
    function: &str,
    force_http: bool,
) -> Result<StepHandler, WiringError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let step =
        function.parse::<BuiltinStep>().map_err(|err| WiringError::Step(err.to_string()))?;
    let deps = StepDependencies {
        text_fields: config.decode.text_fields.clone(),
        routes: build_route_lookup(&config.routing, &clock)?,
    };
    let task = step.build(&deps).map_err(|err| WiringError::Step(err.to_string()))?;
    let mut builder = StepHandlerBuilder::new(function)
        .decoder(build_decoder(&config.function, force_http))
        .task(task)
        .publisher(build_publisher(&config.publisher)?)
        .events(build_event_sink(&config.telemetry)?)
        .clock(Arc::clone(&clock))
        .flush_timeout(config.telemetry.flush_timeout())
        .unpack_body(config.dispatch.unpack_body);
    if let Some(dedup) = build_dedup(&config.dedup, &clock) {
        builder = builder.dedup(dedup);
    }
    builder.build().map_err(|err| WiringError::Handler(err.to_string()))
}

/// Assembles the callback ingestor.
///
/// # Errors
///
/// Returns [`WiringError`] when a collaborator cannot be built or the
/// downlink data is malformed.
pub fn build_callback_ingestor(config: &PipelineConfig) -> Result<CallbackIngestor, WiringError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ingestor = CallbackIngestor::new(
        build_publisher(&config.publisher)?,
        build_event_sink(&config.telemetry)?,
        clock,
    )
    .with_flush_timeout(config.telemetry.flush_timeout());
    apply_callback_settings(ingestor, &config.callback)
}

/// Applies the `[callback]` section to `ingestor`.
fn apply_callback_settings(
    mut ingestor: CallbackIngestor,
    config: &CallbackConfig,
) -> Result<CallbackIngestor, WiringError> {
    if let Some(function) = &config.function {
        ingestor = ingestor.with_function(function.clone());
    }
    if let Some(data) = &config.downlink_data {
        let data = DownlinkData::parse(data).map_err(|err| WiringError::Callback(err.to_string()))?;
        ingestor = ingestor.with_downlink_data(data);
    }
    if let Some(max_age) = config.max_message_age() {
        ingestor = ingestor.with_max_message_age(max_age);
    }
    Ok(ingestor)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Opens `path` for appending, creating it when missing.
fn open_append(path: &str) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path.trim())
}
