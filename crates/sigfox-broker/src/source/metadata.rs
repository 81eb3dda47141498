// crates/sigfox-broker/src/source/metadata.rs
// ============================================================================
// Module: Sigfox Metadata Route Source
// Description: Route source backed by a project metadata attribute.
// Purpose: Let operators change the default route without redeploying.
// Dependencies: sigfox-core, reqwest, url
// ============================================================================

//! ## Overview
//! [`MetadataRouteSource`] reads a project-wide attribute (default key
//! `sigfox-route`) from the instance metadata server. The attribute holds a
//! comma-separated step list such as `decodeStructuredMessage, logToGoogleSheets`.
//! The same route applies to every device.
//! Invariants:
//! - Every request carries `Metadata-Flavor: Google`.
//! - An empty attribute is reported as [`RouteLookupError::Invalid`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::redirect::Policy;
use sigfox_core::DeviceId;
use sigfox_core::Route;
use sigfox_core::RouteLookupError;
use sigfox_core::RouteSource;
use sigfox_core::parse_route_list;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default metadata server base URL.
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://metadata.google.internal";
/// Default attribute key holding the route.
pub const DEFAULT_ROUTE_KEY: &str = "sigfox-route";
/// Header required by the metadata server.
const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
/// Value of [`METADATA_FLAVOR_HEADER`].
const METADATA_FLAVOR_VALUE: &str = "Google";
/// Request timeout for metadata reads.
const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// SECTION: Metadata Route Source
// ============================================================================

/// Route source reading a project metadata attribute.
#[derive(Debug, Clone)]
pub struct MetadataRouteSource {
    /// HTTP client for metadata reads.
    client: Client,
    /// Fully resolved attribute URL.
    url: Url,
}

impl MetadataRouteSource {
    /// Creates a source for `key` on the metadata server at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteLookupError::Invalid`] when the endpoint or key does
    /// not form a valid URL, or the client cannot be built.
    pub fn new(endpoint: &str, key: &str) -> Result<Self, RouteLookupError> {
        let base = Url::parse(endpoint)
            .map_err(|err| RouteLookupError::Invalid(format!("invalid metadata endpoint: {err}")))?;
        let url = base
            .join(&format!("computeMetadata/v1/project/attributes/{key}"))
            .map_err(|err| RouteLookupError::Invalid(format!("invalid metadata key: {err}")))?;
        let client = Client::builder()
            .connect_timeout(METADATA_TIMEOUT)
            .timeout(METADATA_TIMEOUT)
            .redirect(Policy::none())
            .build()
            .map_err(|err| RouteLookupError::Invalid(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            url,
        })
    }

    /// Returns the attribute URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RouteSource for MetadataRouteSource {
    async fn fetch_route(&self, _device: Option<&DeviceId>) -> Result<Route, RouteLookupError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE)
            .send()
            .await
            .map_err(|err| RouteLookupError::Unavailable(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RouteLookupError::NotFound(self.url.path().to_string()));
        }
        if !status.is_success() {
            return Err(RouteLookupError::Unavailable(format!("metadata status {status}")));
        }
        let text = response.text().await.map_err(|err| RouteLookupError::Unavailable(err.to_string()))?;
        let route = parse_route_list(&text);
        if route.is_empty() {
            return Err(RouteLookupError::Invalid("metadata route is empty".to_string()));
        }
        Ok(route)
    }

    fn is_device_scoped(&self) -> bool {
        false
    }
}
