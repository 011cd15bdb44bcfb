//! Controller configuration
//!
//! Defines all configurable parameters of the controller: where the control
//! plane lives, which namespace is reconciled and how often, and which
//! container images the generated source steps use.

use std::time::Duration;

/// Controller configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Control plane base URL (e.g., "http://localhost:8001")
    pub control_plane_url: String,

    /// Bearer token for the control plane, if it requires one
    pub control_plane_token: Option<String>,

    /// Namespace whose Builds and BuildRuns are reconciled
    pub namespace: String,

    /// How often every object is resynced
    pub reconcile_interval: Duration,

    /// Maximum number of reconciliation passes running at once
    pub max_parallel_reconciles: usize,

    /// Image of the step fetching the default git source
    pub git_container_image: String,

    /// Image of the steps downloading auxiliary HTTP sources
    pub http_container_image: String,

    /// Upper bound for a single remote repository probe
    pub remote_repository_timeout: Duration,

    /// Timeout applied when neither the Build nor the BuildRun sets one
    pub default_build_timeout: Option<Duration>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(control_plane_url: String, namespace: String) -> Self {
        Self {
            control_plane_url,
            control_plane_token: None,
            namespace,
            reconcile_interval: Duration::from_secs(10),
            max_parallel_reconciles: 4,
            git_container_image: "ghcr.io/kiln-build/git:latest".to_string(),
            http_container_image: "docker.io/curlimages/curl:8.10.1".to_string(),
            remote_repository_timeout: Duration::from_secs(5),
            default_build_timeout: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - CONTROL_PLANE_URL (required)
    /// - CONTROL_PLANE_TOKEN (optional)
    /// - WATCH_NAMESPACE (optional, default: default)
    /// - RECONCILE_INTERVAL (optional, seconds, default: 10)
    /// - MAX_PARALLEL_RECONCILES (optional, default: 4)
    /// - GIT_CONTAINER_IMAGE (optional)
    /// - HTTP_CONTAINER_IMAGE (optional)
    /// - REMOTE_REPOSITORY_TIMEOUT (optional, seconds, default: 5)
    /// - DEFAULT_BUILD_TIMEOUT (optional, seconds)
    pub fn from_env() -> anyhow::Result<Self> {
        let control_plane_url = std::env::var("CONTROL_PLANE_URL")
            .map_err(|_| anyhow::anyhow!("CONTROL_PLANE_URL environment variable not set"))?;

        let namespace =
            std::env::var("WATCH_NAMESPACE").unwrap_or_else(|_| "default".to_string());

        let mut config = Self::new(control_plane_url, namespace);

        config.control_plane_token = std::env::var("CONTROL_PLANE_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        if let Some(interval) = env_secs("RECONCILE_INTERVAL") {
            config.reconcile_interval = interval;
        }

        if let Some(max) = std::env::var("MAX_PARALLEL_RECONCILES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            config.max_parallel_reconciles = max;
        }

        if let Ok(image) = std::env::var("GIT_CONTAINER_IMAGE") {
            config.git_container_image = image;
        }

        if let Ok(image) = std::env::var("HTTP_CONTAINER_IMAGE") {
            config.http_container_image = image;
        }

        if let Some(timeout) = env_secs("REMOTE_REPOSITORY_TIMEOUT") {
            config.remote_repository_timeout = timeout;
        }

        config.default_build_timeout = env_secs("DEFAULT_BUILD_TIMEOUT");

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.control_plane_url.is_empty() {
            anyhow::bail!("control_plane_url cannot be empty");
        }

        if !self.control_plane_url.starts_with("http://")
            && !self.control_plane_url.starts_with("https://")
        {
            anyhow::bail!("control_plane_url must start with http:// or https://");
        }

        if self.namespace.is_empty() {
            anyhow::bail!("namespace cannot be empty");
        }

        if self.reconcile_interval.as_secs() == 0 {
            anyhow::bail!("reconcile_interval must be greater than 0");
        }

        if self.max_parallel_reconciles == 0 {
            anyhow::bail!("max_parallel_reconciles must be greater than 0");
        }

        if self.git_container_image.is_empty() || self.http_container_image.is_empty() {
            anyhow::bail!("source step container images cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:8001".to_string(), "default".to_string())
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
