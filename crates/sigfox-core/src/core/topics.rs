// crates/sigfox-core/src/core/topics.rs
// ============================================================================
// Module: Sigfox Queue Topics
// Description: Queue topic naming shared by every pipeline component.
// Purpose: Build bit-exact topic names for devices, steps, and broadcast.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Topic names are part of the wire contract between independently deployed
//! steps:
//! - `sigfox.devices.<DEVICE_ID>` for a single device (uppercased),
//! - `sigfox.devices.all` for the broadcast queue,
//! - `sigfox.types.<stepName>` for a processing step,
//! - `sigfox.devices.missing_device` when neither device nor type is known.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::DeviceId;
use crate::core::identifiers::StepName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix of per-device topics.
pub const DEVICE_TOPIC_PREFIX: &str = "sigfox.devices.";
/// Prefix of per-step topics.
pub const TYPE_TOPIC_PREFIX: &str = "sigfox.types.";
/// Device segment of the broadcast topic.
pub const ALL_DEVICES: &str = "all";
/// Device segment used when no device or type is known.
pub const MISSING_DEVICE: &str = "missing_device";

// ============================================================================
// SECTION: Topic Name
// ============================================================================

/// Fully qualified queue topic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicName(String);

impl TopicName {
    /// Wraps an already qualified topic name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the topic for a single device.
    #[must_use]
    pub fn for_device(device: &DeviceId) -> Self {
        Self(format!("{DEVICE_TOPIC_PREFIX}{}", device.as_str()))
    }

    /// Returns the topic for a processing step.
    #[must_use]
    pub fn for_type(step: &StepName) -> Self {
        Self(format!("{TYPE_TOPIC_PREFIX}{}", step.as_str()))
    }

    /// Returns the broadcast topic for all devices.
    #[must_use]
    pub fn all() -> Self {
        Self(format!("{DEVICE_TOPIC_PREFIX}{ALL_DEVICES}"))
    }

    /// Returns the fallback topic used when nothing else resolves.
    #[must_use]
    pub fn missing_device() -> Self {
        Self(format!("{DEVICE_TOPIC_PREFIX}{MISSING_DEVICE}"))
    }

    /// Resolves a topic from an optional device and step, device first.
    #[must_use]
    pub fn resolve(device: Option<&DeviceId>, step: Option<&StepName>) -> Self {
        match (device, step) {
            (Some(device), _) => Self::for_device(device),
            (None, Some(step)) => Self::for_type(step),
            (None, None) => Self::missing_device(),
        }
    }

    /// Returns the topic name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
