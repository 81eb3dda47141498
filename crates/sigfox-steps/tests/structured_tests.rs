// crates/sigfox-steps/tests/structured_tests.rs
// ============================================================================
// Module: Structured Message Codec Tests
// Description: Fixture and property tests for the structured payload decoder.
// Purpose: Pin decoded field names and values for known sensor payloads.
// Dependencies: sigfox-steps, proptest
// ============================================================================

//! ## Overview
//! Decodes recorded sensor payloads and checks decoder error handling.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use proptest::prelude::*;
use serde_json::json;
use sigfox_steps::PayloadError;
use sigfox_steps::decode_message;
use sigfox_steps::decode_text;

/// No text fields.
const NUMERIC: [&str; 0] = [];

/// Verifies the counter, light, and temperature fixture.
#[test]
fn decodes_numeric_sensor_fixture() {
    let fields = decode_message("920e06272731741db051e600", &NUMERIC).unwrap();
    assert_eq!(serde_json::Value::Object(fields), json!({"ctr": 999, "lig": 754, "tmp": 23}));
}

/// Verifies text fields decode as three-letter words.
#[test]
fn decodes_text_fields_fixture() {
    let fields = decode_message("8013e569a0138c15c013f929", &["d1", "d2", "d3"]).unwrap();
    assert_eq!(serde_json::Value::Object(fields), json!({"d1": "zoe", "d2": "ell", "d3": "joy"}));
}

/// Verifies fields not listed as text stay numeric.
#[test]
fn unlisted_text_field_decodes_as_number() {
    let fields = decode_message("8013e569", &["d2"]).unwrap();
    assert_eq!(fields["d1"], json!(2_710.9));
}

/// Verifies an empty payload yields no fields.
#[test]
fn empty_payload_has_no_fields() {
    assert!(decode_message("", &NUMERIC).unwrap().is_empty());
}

/// Verifies partial chunks and non-hex input are rejected.
#[test]
fn malformed_payloads_are_rejected() {
    assert!(matches!(decode_message("920e0627273174", &NUMERIC), Err(PayloadError::PartialChunk(_))));
    assert!(matches!(decode_message("920e06zz", &NUMERIC), Err(PayloadError::InvalidHex(_))));
}

/// Verifies text decoding skips absent characters.
#[test]
fn decode_text_skips_absent_characters() {
    assert_eq!(decode_text(0x0e92), "ctr");
    assert_eq!(decode_text(0x1380), "d1");
    assert_eq!(decode_text(0), "");
}

proptest! {
    #[test]
    fn whole_chunks_always_decode(data in "([0-9a-f]{8}){0,6}") {
        let fields = decode_message(&data, &NUMERIC).unwrap();
        prop_assert!(fields.len() <= data.len() / 8);
    }

    #[test]
    fn decoded_text_is_at_most_three_chars(code in any::<u16>()) {
        let text = decode_text(code);
        prop_assert!(text.chars().count() <= 3);
        prop_assert!(text.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit()));
    }
}
