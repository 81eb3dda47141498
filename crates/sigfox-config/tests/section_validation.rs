// crates/sigfox-config/tests/section_validation.rs
// ============================================================================
// Module: Config Section Validation Tests
// Description: Validate defaults and per-section invariants.
// Purpose: Ensure each section fails closed on inconsistent settings.
// ============================================================================

//! ## Overview
//! Parses TOML snippets and checks defaults and validation messages.

#![allow(dead_code, reason = "Common module may have unused helpers.")]

mod common;

use std::time::Duration;

use sigfox_config::PublisherKind;
use sigfox_config::SinkKind;
use sigfox_config::TriggerKind;
use sigfox_core::DeviceId;
use sigfox_core::StepName;

use crate::common::TestResult;
use crate::common::assert_toml_invalid;
use crate::common::config_from_toml;
use crate::common::minimal_config;

/// An empty document validates and carries the documented defaults.
#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = minimal_config()?;
    config.validate().map_err(|err| err.to_string())?;
    if config.function.trigger != TriggerKind::Queue || config.function.name.is_some() {
        return Err("function defaults wrong".to_string());
    }
    if config.dispatch.unpack_body {
        return Err("unpack_body should default to false".to_string());
    }
    if config.publisher.kind != PublisherKind::Log
        || config.publisher.connect_timeout() != Duration::from_secs(5)
        || config.publisher.request_timeout() != Duration::from_secs(30)
    {
        return Err("publisher defaults wrong".to_string());
    }
    if config.routing.cache_ttl() != Duration::from_secs(10) || config.routing.is_configured() {
        return Err("routing defaults wrong".to_string());
    }
    if config.dedup.enabled || config.dedup.ttl() != Duration::from_secs(600) {
        return Err("dedup defaults wrong".to_string());
    }
    if config.telemetry.sink != SinkKind::Stderr
        || config.telemetry.flush_timeout() != Duration::from_millis(2_000)
    {
        return Err("telemetry defaults wrong".to_string());
    }
    if config.callback.max_message_age().is_some() || !config.decode.text_fields.is_empty() {
        return Err("callback or decode defaults wrong".to_string());
    }
    Ok(())
}

/// Unknown enum values are parse errors.
#[test]
fn unknown_trigger_kind_is_parse_error() -> TestResult {
    match config_from_toml("[function]\ntrigger = \"smtp\"\n") {
        Err(message) if message.contains("config parse error") => Ok(()),
        Err(message) => Err(format!("unexpected error {message}")),
        Ok(_) => Err("unknown trigger kind should not parse".to_string()),
    }
}

/// Function names must not contain whitespace.
#[test]
fn function_name_rejects_whitespace() -> TestResult {
    assert_toml_invalid("[function]\nname = \"decode message\"\n", "function.name")
}

/// A source path only makes sense for HTTP triggers.
#[test]
fn source_path_requires_http_trigger() -> TestResult {
    assert_toml_invalid(
        "[function]\nsource_path = \"/decode\"\n",
        "function.source_path requires trigger",
    )?;
    let config =
        config_from_toml("[function]\ntrigger = \"http\"\nsource_path = \"/decode\"\n")?;
    config.validate().map_err(|err| err.to_string())
}

/// Pub/Sub needs a project id.
#[test]
fn pubsub_requires_project() -> TestResult {
    assert_toml_invalid("[publisher]\nkind = \"pubsub\"\n", "requires publisher.project")?;
    assert_toml_invalid(
        "[publisher]\nkind = \"pubsub\"\nproject = \"a/b\"\n",
        "must not contain '/'",
    )
}

/// Pub/Sub-only settings are rejected for the log publisher.
#[test]
fn log_publisher_rejects_pubsub_settings() -> TestResult {
    assert_toml_invalid("[publisher]\nproject = \"demo\"\n", "require kind = \"pubsub\"")
}

/// Endpoints must be HTTP URLs.
#[test]
fn publisher_endpoint_requires_scheme() -> TestResult {
    assert_toml_invalid(
        "[publisher]\nkind = \"pubsub\"\nproject = \"demo\"\nendpoint = \"pubsub.local\"\n",
        "publisher.endpoint must include http:// or https://",
    )
}

/// Token variables must be valid environment names.
#[test]
fn token_env_must_be_variable_name() -> TestResult {
    assert_toml_invalid(
        "[publisher]\nkind = \"pubsub\"\nproject = \"demo\"\ntoken_env = \"1TOKEN\"\n",
        "publisher.token_env",
    )
}

/// Zero timeouts are rejected.
#[test]
fn zero_timeouts_rejected() -> TestResult {
    assert_toml_invalid(
        "[publisher]\nconnect_timeout_ms = 0\n",
        "publisher.connect_timeout_ms must be greater than zero",
    )?;
    assert_toml_invalid(
        "[telemetry]\nflush_timeout_ms = 0\n",
        "telemetry.flush_timeout_ms must be greater than zero",
    )?;
    assert_toml_invalid("[routing]\ncache_ttl_ms = 0\n", "routing.cache_ttl_ms")
}

/// Oversized windows are rejected.
#[test]
fn oversized_flush_timeout_rejected() -> TestResult {
    assert_toml_invalid("[telemetry]\nflush_timeout_ms = 3600000\n", "must be at most")
}

/// Static routes parse device ids uppercased and steps in order.
#[test]
fn static_routes_parse_in_order() -> TestResult {
    let config = config_from_toml(
        "[routing]\ndefault_route = [\"log\"]\n\n[[routing.routes]]\ndevices = \
         [\"1c8a7e\"]\nroute = [\"decode\", \"log\"]\n",
    )?;
    config.validate().map_err(|err| err.to_string())?;
    let entry = config.routing.routes.first().ok_or("missing route entry")?;
    if entry.devices != vec![DeviceId::new("1C8A7E")] {
        return Err("device id should be uppercased".to_string());
    }
    if entry.route.steps() != [StepName::new("decode"), StepName::new("log")] {
        return Err("route steps out of order".to_string());
    }
    if !config.routing.is_configured() {
        return Err("routing should report configured".to_string());
    }
    Ok(())
}

/// Route entries need devices and steps.
#[test]
fn route_entries_require_devices_and_steps() -> TestResult {
    assert_toml_invalid(
        "[[routing.routes]]\ndevices = []\nroute = [\"log\"]\n",
        "routing.routes[0].devices must be non-empty",
    )?;
    assert_toml_invalid(
        "[[routing.routes]]\ndevices = [\"1C8A7E\"]\nroute = []\n",
        "routing.routes[0].route must name at least one step",
    )?;
    assert_toml_invalid("[routing]\ndefault_route = [\"\"]\n", "routing.default_route")
}

/// Metadata routing cannot be mixed with static routes.
#[test]
fn metadata_excludes_static_routes() -> TestResult {
    assert_toml_invalid(
        "[routing]\ndefault_route = [\"log\"]\n\n[routing.metadata]\nkey = \"sigfox-route\"\n",
        "cannot be combined with static routes",
    )?;
    let config = config_from_toml("[routing.metadata]\n")?;
    config.validate().map_err(|err| err.to_string())
}

/// Dedup capacity must be positive.
#[test]
fn dedup_capacity_must_be_positive() -> TestResult {
    assert_toml_invalid("[dedup]\nenabled = true\ncapacity = 0\n", "dedup.capacity")
}

/// The jsonl sink needs a path and only it accepts one.
#[test]
fn jsonl_sink_requires_path() -> TestResult {
    assert_toml_invalid("[telemetry]\nsink = \"jsonl\"\n", "jsonl sink requires telemetry.path")?;
    assert_toml_invalid(
        "[telemetry]\npath = \"events.jsonl\"\n",
        "telemetry.path requires sink",
    )?;
    let config = config_from_toml("[telemetry]\nsink = \"jsonl\"\npath = \"events.jsonl\"\n")?;
    config.validate().map_err(|err| err.to_string())
}

/// Downlink data must be exactly sixteen hex digits.
#[test]
fn downlink_data_must_be_sixteen_hex_digits() -> TestResult {
    assert_toml_invalid("[callback]\ndownlink_data = \"0102\"\n", "callback.downlink_data")?;
    assert_toml_invalid(
        "[callback]\ndownlink_data = \"01020304050607zz\"\n",
        "callback.downlink_data",
    )?;
    let config = config_from_toml("[callback]\ndownlink_data = \"0102030405060708\"\n")?;
    config.validate().map_err(|err| err.to_string())
}

/// The message age limit converts to a duration.
#[test]
fn callback_max_message_age_is_duration() -> TestResult {
    let config = config_from_toml("[callback]\nmax_message_age_ms = 60000\n")?;
    config.validate().map_err(|err| err.to_string())?;
    if config.callback.max_message_age() != Some(Duration::from_secs(60)) {
        return Err("max_message_age should be one minute".to_string());
    }
    assert_toml_invalid("[callback]\nmax_message_age_ms = 0\n", "callback.max_message_age_ms")
}

/// Text fields are short lowercase codes.
#[test]
fn text_fields_must_be_field_codes() -> TestResult {
    assert_toml_invalid("[decode]\ntext_fields = [\"Temp\"]\n", "decode.text_fields entry 'Temp'")?;
    let config = config_from_toml("[decode]\ntext_fields = [\"d1\", \"tmp\"]\n")?;
    config.validate().map_err(|err| err.to_string())
}
