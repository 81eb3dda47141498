// crates/sigfox-broker/src/telemetry.rs
// ============================================================================
// Module: Sigfox Event Sinks
// Description: JSON-line event sinks for pipeline logs.
// Purpose: Emit structured pipeline events to stderr or a buffered writer.
// Dependencies: sigfox-core, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`StderrEventSink`] writes each event immediately as one JSON line.
//! [`JsonLinesEventSink`] buffers encoded lines in memory and writes them on
//! [`EventSink::flush`], which is how a step hands its log batch to the
//! platform at the end of an invocation. The flush write runs on tokio's
//! blocking pool.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use sigfox_core::EventSink;
use sigfox_core::EventSinkError;
use sigfox_core::PipelineEvent;

// ============================================================================
// SECTION: Stderr Sink
// ============================================================================

/// Event sink that writes JSON lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrEventSink;

impl EventSink for StderrEventSink {
    fn record(&self, event: &PipelineEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{payload}");
        }
    }
}

// ============================================================================
// SECTION: Buffered JSON Lines Sink
// ============================================================================

/// Event sink that buffers JSON lines until flushed.
///
/// # Invariants
/// - Lines are written in record order.
/// - A failed flush keeps nothing; the batch is dropped.
/// - Writes run on the blocking pool, so a caller's timeout can abandon a
///   stalled writer.
pub struct JsonLinesEventSink<W: Write + Send + 'static> {
    /// Encoded lines awaiting flush.
    pending: Mutex<Vec<String>>,
    /// Destination writer, shared with in-flight blocking writes.
    writer: Arc<Mutex<W>>,
}

impl<W: Write + Send + 'static> JsonLinesEventSink<W> {
    /// Creates a sink writing to `writer` on flush.
    pub fn new(writer: W) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Returns the number of buffered lines.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().map_or(0, |guard| guard.len())
    }

    /// Consumes the sink and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns [`EventSinkError::Write`] when a flush still holds the writer
    /// or the writer mutex is poisoned.
    pub fn into_inner(self) -> Result<W, EventSinkError> {
        Arc::try_unwrap(self.writer)
            .map_err(|_| EventSinkError::Write("event writer is still in use".to_string()))?
            .into_inner()
            .map_err(|_| EventSinkError::Write("event writer mutex poisoned".to_string()))
    }

    /// Takes the buffered lines.
    fn take_pending(&self) -> Result<Vec<String>, EventSinkError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| EventSinkError::Write("event buffer mutex poisoned".to_string()))?;
        Ok(std::mem::take(&mut *pending))
    }
}

/// Writes `lines` to `writer` and flushes it.
fn write_lines<W: Write>(writer: &Mutex<W>, lines: Vec<String>) -> Result<(), EventSinkError> {
    let mut writer = writer
        .lock()
        .map_err(|_| EventSinkError::Write("event writer mutex poisoned".to_string()))?;
    for line in lines {
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(|err| EventSinkError::Write(err.to_string()))?;
    }
    writer.flush().map_err(|err| EventSinkError::Write(err.to_string()))
}

#[async_trait]
impl<W: Write + Send + 'static> EventSink for JsonLinesEventSink<W> {
    fn record(&self, event: &PipelineEvent) {
        if let Ok(line) = serde_json::to_string(event)
            && let Ok(mut pending) = self.pending.lock()
        {
            pending.push(line);
        }
    }

    async fn flush(&self) -> Result<(), EventSinkError> {
        let lines = self.take_pending()?;
        let writer = Arc::clone(&self.writer);
        tokio::task::spawn_blocking(move || write_lines(&writer, lines))
            .await
            .map_err(|err| EventSinkError::Write(format!("event writer task failed: {err}")))?
    }
}
