//! Kiln Control Plane Client
//!
//! A small, type-safe HTTP client for the declarative control plane that
//! stores Builds, BuildRuns, strategies, secrets and TaskRuns.
//!
//! The client only moves objects: it performs get/list/create/update calls
//! and maps HTTP failures onto [`ClientError`]. Validation and status
//! derivation live in the controller.
//!
//! # Example
//!
//! ```no_run
//! use kiln_client::ControlPlaneClient;
//!
//! # async fn example() -> kiln_client::Result<()> {
//! let client = ControlPlaneClient::new("http://localhost:8001");
//!
//! let builds = client.list_builds("default").await?;
//! println!("{} build(s)", builds.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
mod builds;
mod secrets;
mod strategies;
mod task_runs;

pub use error::{ClientError, Result};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// API group path of Build, BuildRun and strategy objects
const BUILD_API: &str = "apis/kiln.dev/v1";

/// API group path of TaskRun objects
const PIPELINE_API: &str = "apis/tekton.dev/v1";

/// API path of core objects (secrets)
const CORE_API: &str = "api/v1";

/// HTTP client for the control plane API
#[derive(Debug, Clone)]
pub struct ControlPlaneClient {
    /// Base URL of the control plane (e.g., "http://localhost:8001")
    base_url: String,
    /// Optional bearer token sent with every request
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl ControlPlaneClient {
    /// Create a new control plane client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the control plane API
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new control plane client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Authenticate every request with the given bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the control plane
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn namespaced_url(&self, api: &str, namespace: &str, resource: &str) -> String {
        format!(
            "{}/{}/namespaces/{}/{}",
            self.base_url, api, namespace, resource
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Not-found and conflict responses map to their dedicated error variants
    /// so callers can tell missing objects and stale writes apart from faults.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let url = response.url().path().to_string();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(match status.as_u16() {
                404 => ClientError::NotFound(url),
                409 => ClientError::Conflict(error_text),
                code => ClientError::api_error(code, error_text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Turns a not-found error into `None`
pub(crate) fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
