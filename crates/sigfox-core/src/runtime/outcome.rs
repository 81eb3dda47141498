// crates/sigfox-core/src/runtime/outcome.rs
// ============================================================================
// Module: Sigfox Step Outcome
// Description: Explicit success-or-swallowed-failure result of a hop.
// Purpose: Thread recovered errors through task running and dispatch.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Task and publish failures never abort a hop. Instead of returning a bare
//! envelope and hiding the error in a log line, components return an
//! [`Outcome`] that always carries the envelope to continue with.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Envelope;
use crate::interfaces::PipelineError;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of running or dispatching one hop.
#[derive(Debug)]
pub enum Outcome {
    /// Hop completed without errors.
    Ok(Envelope),
    /// Hop hit recovered errors; `envelope` is the last-known-good state.
    Failed {
        /// Envelope to continue with.
        envelope: Envelope,
        /// Recovered errors in the order they occurred; never empty.
        errors: Vec<PipelineError>,
    },
}

impl Outcome {
    /// Builds a failed outcome carrying a single error.
    #[must_use]
    pub fn failed(envelope: Envelope, error: impl Into<PipelineError>) -> Self {
        Self::Failed {
            envelope,
            errors: vec![error.into()],
        }
    }

    /// Prepends `error` to this outcome's errors, turning `Ok` into `Failed`.
    #[must_use]
    pub fn with_prior_error(self, error: impl Into<PipelineError>) -> Self {
        let (envelope, later) = self.into_parts();
        let mut errors = Vec::with_capacity(later.len() + 1);
        errors.push(error.into());
        errors.extend(later);
        Self::Failed {
            envelope,
            errors,
        }
    }

    /// Returns the carried envelope.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        match self {
            Self::Ok(envelope) | Self::Failed { envelope, .. } => envelope,
        }
    }

    /// Consumes the outcome and returns the carried envelope.
    #[must_use]
    pub fn into_envelope(self) -> Envelope {
        match self {
            Self::Ok(envelope) | Self::Failed { envelope, .. } => envelope,
        }
    }

    /// Returns the first recovered error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&PipelineError> {
        self.errors().first()
    }

    /// Returns every recovered error.
    #[must_use]
    pub fn errors(&self) -> &[PipelineError] {
        match self {
            Self::Ok(_) => &[],
            Self::Failed { errors, .. } => errors,
        }
    }

    /// Returns true when a publish failed during the hop.
    #[must_use]
    pub fn publish_failed(&self) -> bool {
        self.errors().iter().any(|err| matches!(err, PipelineError::Publish(_)))
    }

    /// Returns true when no error was recovered.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Splits the outcome into its envelope and recovered errors.
    #[must_use]
    pub fn into_parts(self) -> (Envelope, Vec<PipelineError>) {
        match self {
            Self::Ok(envelope) => (envelope, Vec::new()),
            Self::Failed { envelope, errors } => (envelope, errors),
        }
    }
}
