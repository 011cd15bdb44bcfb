//! Remote repository probing
//!
//! Checks whether a git repository answers the smart HTTP discovery request.
//! A failed probe is an answer, not a fault: unreachable repositories are
//! reported on the Build, so the probe never returns errors.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Capability answering whether a remote git repository is reachable
#[async_trait]
pub trait RepositoryProbe: Send + Sync {
    async fn is_reachable(&self, url: &Url) -> bool;
}

/// Probe using the git smart HTTP protocol
pub struct HttpRepositoryProbe {
    client: Client,
    timeout: Duration,
}

impl HttpRepositoryProbe {
    /// Creates a probe whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// URL of the ref advertisement of a repository
    fn discovery_url(url: &Url) -> String {
        format!(
            "{}/info/refs?service=git-upload-pack",
            url.as_str().trim_end_matches('/')
        )
    }
}

#[async_trait]
impl RepositoryProbe for HttpRepositoryProbe {
    async fn is_reachable(&self, url: &Url) -> bool {
        let discovery = Self::discovery_url(url);

        match self
            .client
            .get(&discovery)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "Probed remote repository");
                response.status().is_success()
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Remote repository probe failed");
                false
            }
        }
    }
}
