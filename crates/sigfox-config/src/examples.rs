// crates/sigfox-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and the CLI.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `sigfox-pipeline.toml`. The example validates as-is and
//! is exercised by the config test suite.

/// Returns a canonical example `sigfox-pipeline.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[function]
name = "decodeStructuredMessage"
trigger = "queue"

[dispatch]
unpack_body = false

[publisher]
kind = "pubsub"
project = "sigfox-pipeline"
token_env = "SIGFOX_PUBSUB_TOKEN"
connect_timeout_ms = 5000
request_timeout_ms = 30000

[routing]
cache_ttl_ms = 10000
default_route = ["decodeStructuredMessage", "logToGoogleSheets"]

[[routing.routes]]
devices = ["1C8A7E", "2C30EB"]
route = ["decodeStructuredMessage", "routeMessage", "logToGoogleSheets"]

[dedup]
enabled = true
ttl_ms = 600000
capacity = 10000

[telemetry]
sink = "stderr"
flush_timeout_ms = 2000

[callback]
function = "sigfoxCallback"
path = "/sigfoxCallback"
downlink_data = "0102030405060708"
max_message_age_ms = 86400000

[decode]
text_fields = ["d1", "d2", "d3"]
"#,
    )
}
