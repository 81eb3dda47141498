// crates/sigfox-broker/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for sigfox-broker tests.
// Purpose: Provide envelopes, writers, and a one-shot HTTP server.
// Dependencies: sigfox-core, serde_json, tiny_http
// ============================================================================

//! ## Overview
//! Provides shared helpers for publisher, trigger, source, and sink tests.

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

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use serde_json::json;
use sigfox_core::DeviceId;
use sigfox_core::Envelope;
use sigfox_core::Route;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Envelope Helpers
// ============================================================================

/// Creates a routed envelope for device `1C8A7E`.
pub fn sample_envelope() -> Envelope {
    let body = json!({"uuid": "ab0d40bd-dbc5-4076-b684-3f610d96e621", "data": "920e06272731741db051e600"});
    let mut envelope = Envelope::new(Some(DeviceId::new("1C8A7E")), body.as_object().cloned().unwrap());
    envelope.route = Route::new(["decodeStructuredMessage", "logToGoogleSheets"]);
    envelope
}

// ============================================================================
// SECTION: Shared Buffer for Write Testing
// ============================================================================

/// A thread-safe buffer for testing Write implementations.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    /// Written bytes.
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates a new empty shared buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contents as a string.
    pub fn to_string_lossy(&self) -> String {
        let guard = self.inner.lock().expect("buffer lock");
        String::from_utf8_lossy(&guard).to_string()
    }

    /// Returns the non-empty lines parsed as JSON.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.to_string_lossy()
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A writer that always fails, for testing error paths.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("simulated write failure"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// SECTION: One-Shot HTTP Server
// ============================================================================

/// Request captured by [`serve_once`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: String,
    /// Request URL path and query.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: String,
}

impl CapturedRequest {
    /// Returns the first header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serves one request with `status` and `body`, returning the base URL.
pub fn serve_once(status: u16, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let body = body.to_string();
    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request");
        let mut request_body = String::new();
        request.as_reader().read_to_string(&mut request_body).expect("read body");
        let captured = CapturedRequest {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|header| (header.field.to_string(), header.value.to_string()))
                .collect(),
            body: request_body,
        };
        let content_type = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
        let response = Response::from_string(body).with_status_code(status).with_header(content_type);
        let _ = request.respond(response);
        captured
    });
    (format!("http://{addr}"), handle)
}
