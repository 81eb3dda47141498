// crates/sigfox-config/src/config.rs
// ============================================================================
// Module: Sigfox Pipeline Configuration
// Description: Configuration loading and validation for pipeline processes.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: sigfox-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then [`CONFIG_ENV_VAR`], then
//! [`DEFAULT_CONFIG_NAME`] in the working directory.
//! Invariants:
//! - An empty file yields [`PipelineConfig::default`], which validates.
//! - Every numeric window is non-zero and bounded.
//! - `routing.metadata` excludes static routes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;

use serde::Deserialize;
use sigfox_core::DeviceId;
use sigfox_core::Route;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "sigfox-pipeline.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SIGFOX_PIPELINE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a function or step name.
pub(crate) const MAX_NAME_LENGTH: usize = 128;
/// Maximum number of steps in one configured route.
pub(crate) const MAX_ROUTE_STEPS: usize = 64;
/// Maximum number of static route entries.
pub(crate) const MAX_ROUTE_ENTRIES: usize = 1024;
/// Maximum number of decoder text fields.
pub(crate) const MAX_TEXT_FIELDS: usize = 64;
/// Maximum timeout accepted for publisher and flush windows.
pub(crate) const MAX_TIMEOUT_MS: u64 = 300_000;
/// Maximum route cache and dedup retention.
pub(crate) const MAX_RETENTION_MS: u64 = 7 * 24 * 60 * 60 * 1000;
/// Maximum dedup store capacity.
pub(crate) const MAX_DEDUP_CAPACITY: usize = 1_000_000;
/// Hex digits required for callback downlink data.
pub(crate) const DOWNLINK_HEX_DIGITS: usize = 16;

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Complete `sigfox-pipeline.toml` model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Step function identity and trigger decoding.
    #[serde(default)]
    pub function: FunctionConfig,
    /// Dispatcher behaviour.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Queue publisher selection.
    #[serde(default)]
    pub publisher: PublisherConfig,
    /// Route resolution.
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Duplicate message filtering.
    #[serde(default)]
    pub dedup: DedupConfig,
    /// Event sink and flush settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Sigfox callback ingestion.
    #[serde(default)]
    pub callback: CallbackConfig,
    /// Structured payload decoding.
    #[serde(default)]
    pub decode: DecodeConfig,
    /// Optional config source metadata (not serialized).
    #[serde(skip)]
    pub source_modified_at: Option<SystemTime>,
}

impl PipelineConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source_modified_at = fs::metadata(&resolved).and_then(|meta| meta.modified()).ok();
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed or has the
    /// wrong shape.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.function.validate()?;
        self.publisher.validate()?;
        self.routing.validate()?;
        self.dedup.validate()?;
        self.telemetry.validate()?;
        self.callback.validate()?;
        self.decode.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Function
// ============================================================================

/// How a step invocation's raw trigger is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Queue push message with base64 `data`.
    #[default]
    Queue,
    /// Raw HTTP request body.
    Http,
}

/// Step function identity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionConfig {
    /// Step function name; also the dedup key suffix.
    #[serde(default)]
    pub name: Option<String>,
    /// Trigger encoding.
    #[serde(default)]
    pub trigger: TriggerKind,
    /// Request path reported as the hop source for HTTP triggers.
    #[serde(default)]
    pub source_path: Option<String>,
}

impl FunctionConfig {
    /// Validates the function section.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.name {
            validate_name("function.name", name)?;
        }
        if let Some(path) = &self.source_path {
            if self.trigger != TriggerKind::Http {
                return Err(ConfigError::Invalid(
                    "function.source_path requires trigger = \"http\"".to_string(),
                ));
            }
            validate_path_string("function.source_path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Dispatcher settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DispatchConfig {
    /// Publish body fields at the payload root.
    #[serde(default)]
    pub unpack_body: bool,
}

// ============================================================================
// SECTION: Publisher
// ============================================================================

/// Supported queue publishers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherKind {
    /// Write publish records as JSON lines without delivering them.
    #[default]
    Log,
    /// Google Pub/Sub REST API.
    Pubsub,
}

/// Queue publisher settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PublisherConfig {
    /// Publisher selection.
    #[serde(default)]
    pub kind: PublisherKind,
    /// Output file for the log publisher; stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
    /// Pub/Sub REST endpoint override.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Google Cloud project id.
    #[serde(default)]
    pub project: Option<String>,
    /// Environment variable holding the OAuth bearer token.
    #[serde(default)]
    pub token_env: Option<String>,
    /// TCP connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Whole-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            kind: PublisherKind::Log,
            path: None,
            endpoint: None,
            project: None,
            token_env: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl PublisherConfig {
    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validates the publisher section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_window("publisher.connect_timeout_ms", self.connect_timeout_ms, MAX_TIMEOUT_MS)?;
        validate_window("publisher.request_timeout_ms", self.request_timeout_ms, MAX_TIMEOUT_MS)?;
        if let Some(path) = &self.path {
            validate_path_string("publisher.path", path)?;
        }
        if let Some(endpoint) = &self.endpoint {
            validate_endpoint("publisher.endpoint", endpoint)?;
        }
        if let Some(token_env) = &self.token_env {
            validate_env_name("publisher.token_env", token_env)?;
        }
        match self.kind {
            PublisherKind::Log => {
                if self.project.is_some() || self.endpoint.is_some() {
                    return Err(ConfigError::Invalid(
                        "publisher.project and publisher.endpoint require kind = \"pubsub\""
                            .to_string(),
                    ));
                }
            }
            PublisherKind::Pubsub => {
                let project = self.project.as_deref().unwrap_or_default().trim();
                if project.is_empty() {
                    return Err(ConfigError::Invalid(
                        "pubsub publisher requires publisher.project".to_string(),
                    ));
                }
                if project.contains('/') {
                    return Err(ConfigError::Invalid(
                        "publisher.project must not contain '/'".to_string(),
                    ));
                }
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "publisher.path requires kind = \"log\"".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Routing
// ============================================================================

/// One static route table entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntryConfig {
    /// Devices this entry applies to.
    pub devices: Vec<DeviceId>,
    /// Steps those devices' messages follow.
    pub route: Route,
}

/// Remote route source read from project metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataConfig {
    /// Metadata server base URL override.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Project attribute key override.
    #[serde(default)]
    pub key: Option<String>,
}

/// Route resolution settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Freshness window for remotely fetched routes, in milliseconds.
    #[serde(default = "default_route_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    /// Route for devices no entry names.
    #[serde(default)]
    pub default_route: Option<Route>,
    /// Ordered static entries; the first match wins.
    #[serde(default)]
    pub routes: Vec<RouteEntryConfig>,
    /// Remote metadata route source.
    #[serde(default)]
    pub metadata: Option<MetadataConfig>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: default_route_cache_ttl_ms(),
            default_route: None,
            routes: Vec::new(),
            metadata: None,
        }
    }
}

impl RoutingConfig {
    /// Returns the route cache freshness window.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Returns true when any route source is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.default_route.is_some() || !self.routes.is_empty() || self.metadata.is_some()
    }

    /// Validates the routing section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_window("routing.cache_ttl_ms", self.cache_ttl_ms, MAX_RETENTION_MS)?;
        if self.routes.len() > MAX_ROUTE_ENTRIES {
            return Err(ConfigError::Invalid("routing.routes exceeds max entries".to_string()));
        }
        if let Some(route) = &self.default_route {
            validate_route("routing.default_route", route)?;
        }
        for (index, entry) in self.routes.iter().enumerate() {
            if entry.devices.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "routing.routes[{index}].devices must be non-empty"
                )));
            }
            if entry.devices.iter().any(|device| device.as_str().trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "routing.routes[{index}].devices must not contain empty ids"
                )));
            }
            validate_route(&format!("routing.routes[{index}].route"), &entry.route)?;
        }
        if let Some(metadata) = &self.metadata {
            if self.default_route.is_some() || !self.routes.is_empty() {
                return Err(ConfigError::Invalid(
                    "routing.metadata cannot be combined with static routes".to_string(),
                ));
            }
            if let Some(endpoint) = &metadata.endpoint {
                validate_endpoint("routing.metadata.endpoint", endpoint)?;
            }
            if let Some(key) = &metadata.key {
                validate_name("routing.metadata.key", key)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Dedup
// ============================================================================

/// Duplicate filter settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DedupConfig {
    /// Enables the in-memory seen-message filter.
    #[serde(default)]
    pub enabled: bool,
    /// Retention per processed message, in milliseconds.
    #[serde(default = "default_dedup_ttl_ms")]
    pub ttl_ms: u64,
    /// Maximum remembered messages.
    #[serde(default = "default_dedup_capacity")]
    pub capacity: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_ms: default_dedup_ttl_ms(),
            capacity: default_dedup_capacity(),
        }
    }
}

impl DedupConfig {
    /// Returns the retention window.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Validates the dedup section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_window("dedup.ttl_ms", self.ttl_ms, MAX_RETENTION_MS)?;
        if self.capacity == 0 || self.capacity > MAX_DEDUP_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "dedup.capacity must be between 1 and {MAX_DEDUP_CAPACITY}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Telemetry
// ============================================================================

/// Supported event sinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// JSON lines on stderr, written immediately.
    #[default]
    Stderr,
    /// JSON lines appended to `telemetry.path` on flush.
    Jsonl,
    /// Discard events.
    None,
}

/// Event sink settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: SinkKind,
    /// Output file for the `jsonl` sink.
    #[serde(default)]
    pub path: Option<String>,
    /// Upper bound on the end-of-invocation flush, in milliseconds.
    #[serde(default = "default_flush_timeout_ms")]
    pub flush_timeout_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::Stderr,
            path: None,
            flush_timeout_ms: default_flush_timeout_ms(),
        }
    }
}

impl TelemetryConfig {
    /// Returns the flush timeout.
    #[must_use]
    pub const fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }

    /// Validates the telemetry section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_window("telemetry.flush_timeout_ms", self.flush_timeout_ms, MAX_TIMEOUT_MS)?;
        match (self.sink, &self.path) {
            (SinkKind::Jsonl, Some(path)) => validate_path_string("telemetry.path", path),
            (SinkKind::Jsonl, None) => {
                Err(ConfigError::Invalid("jsonl sink requires telemetry.path".to_string()))
            }
            (_, Some(_)) => Err(ConfigError::Invalid(
                "telemetry.path requires sink = \"jsonl\"".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Callback
// ============================================================================

/// Sigfox callback ingestion settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackConfig {
    /// Function name recorded in the first hop.
    #[serde(default)]
    pub function: Option<String>,
    /// Request path recorded as the first hop source.
    #[serde(default)]
    pub path: Option<String>,
    /// Downlink payload returned when the device requests an acknowledgement.
    #[serde(default)]
    pub downlink_data: Option<String>,
    /// Maximum accepted age of a callback message, in milliseconds.
    #[serde(default)]
    pub max_message_age_ms: Option<u64>,
}

impl CallbackConfig {
    /// Returns the message age limit, if any.
    #[must_use]
    pub fn max_message_age(&self) -> Option<Duration> {
        self.max_message_age_ms.map(Duration::from_millis)
    }

    /// Validates the callback section.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(function) = &self.function {
            validate_name("callback.function", function)?;
        }
        if let Some(path) = &self.path {
            validate_path_string("callback.path", path)?;
        }
        if let Some(data) = &self.downlink_data
            && (data.len() != DOWNLINK_HEX_DIGITS
                || !data.chars().all(|digit| digit.is_ascii_hexdigit()))
        {
            return Err(ConfigError::Invalid(format!(
                "callback.downlink_data must be {DOWNLINK_HEX_DIGITS} hex digits"
            )));
        }
        if let Some(age) = self.max_message_age_ms {
            validate_window("callback.max_message_age_ms", age, MAX_RETENTION_MS)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Decode
// ============================================================================

/// Structured payload decoder settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecodeConfig {
    /// Field names decoded as three-letter text instead of numbers.
    #[serde(default)]
    pub text_fields: Vec<String>,
}

impl DecodeConfig {
    /// Validates the decode section.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.text_fields.len() > MAX_TEXT_FIELDS {
            return Err(ConfigError::Invalid("decode.text_fields exceeds max entries".to_string()));
        }
        for field in &self.text_fields {
            let valid = (1..=3).contains(&field.len())
                && field.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
            if !valid {
                return Err(ConfigError::Invalid(format!(
                    "decode.text_fields entry '{field}' must be 1-3 lowercase letters or digits"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a function, step, or key name.
fn validate_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ConfigError::Invalid(format!("{field} must not contain whitespace")));
    }
    Ok(())
}

/// Validates an HTTP(S) base URL.
fn validate_endpoint(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(ConfigError::Invalid(format!("{field} must include http:// or https://")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Validates an environment variable name.
fn validate_env_name(field: &str, value: &str) -> Result<(), ConfigError> {
    let valid = !value.is_empty()
        && value.len() <= MAX_NAME_LENGTH
        && !value.starts_with(|c: char| c.is_ascii_digit())
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{field} must be a valid environment variable name")))
    }
}

/// Validates that a millisecond window is within `1..=max`.
fn validate_window(field: &str, value: u64, max: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    if value > max {
        return Err(ConfigError::Invalid(format!("{field} must be at most {max}")));
    }
    Ok(())
}

/// Validates a configured route's steps.
fn validate_route(field: &str, route: &Route) -> Result<(), ConfigError> {
    if route.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must name at least one step")));
    }
    if route.len() > MAX_ROUTE_STEPS {
        return Err(ConfigError::Invalid(format!("{field} exceeds max steps")));
    }
    for step in route.steps() {
        validate_name(field, step.as_str())?;
    }
    Ok(())
}

/// Default publisher connect timeout.
pub(crate) const fn default_connect_timeout_ms() -> u64 {
    5_000
}

/// Default publisher request timeout.
pub(crate) const fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Default route cache freshness window.
pub(crate) const fn default_route_cache_ttl_ms() -> u64 {
    10_000
}

/// Default dedup retention.
pub(crate) const fn default_dedup_ttl_ms() -> u64 {
    600_000
}

/// Default dedup capacity.
pub(crate) const fn default_dedup_capacity() -> usize {
    10_000
}

/// Default event flush timeout.
pub(crate) const fn default_flush_timeout_ms() -> u64 {
    2_000
}
