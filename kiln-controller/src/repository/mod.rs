//! Repository layer
//!
//! Repositories are narrow capabilities over the control plane. Each
//! validator and reconciler receives only the ones it needs, which keeps
//! them testable against in-memory fakes.
//!
//! Lookups return `Ok(None)` for missing objects; an `Err` is always a
//! technical failure.

mod builds;
mod remote;
mod secrets;
mod strategies;
mod task_runs;

use std::sync::Arc;
use std::time::Duration;

use kiln_client::ControlPlaneClient;

// Re-export traits
pub use builds::{BuildRepository, BuildRunRepository};
pub use remote::RepositoryProbe;
pub use secrets::SecretRepository;
pub use strategies::StrategyRepository;
pub use task_runs::TaskRunRepository;

// Re-export implementations
pub use builds::{HttpBuildRepository, HttpBuildRunRepository};
pub use remote::HttpRepositoryProbe;
pub use secrets::HttpSecretRepository;
pub use strategies::HttpStrategyRepository;
pub use task_runs::HttpTaskRunRepository;

/// Every collaborator a reconciliation pass may need
#[derive(Clone)]
pub struct Repositories {
    pub builds: Arc<dyn BuildRepository>,
    pub build_runs: Arc<dyn BuildRunRepository>,
    pub strategies: Arc<dyn StrategyRepository>,
    pub secrets: Arc<dyn SecretRepository>,
    pub task_runs: Arc<dyn TaskRunRepository>,
    pub probe: Arc<dyn RepositoryProbe>,
}

impl Repositories {
    /// Wires every repository to the given control plane client
    pub fn http(client: Arc<ControlPlaneClient>, probe_timeout: Duration) -> Self {
        Self {
            builds: Arc::new(HttpBuildRepository::new(Arc::clone(&client))),
            build_runs: Arc::new(HttpBuildRunRepository::new(Arc::clone(&client))),
            strategies: Arc::new(HttpStrategyRepository::new(Arc::clone(&client))),
            secrets: Arc::new(HttpSecretRepository::new(Arc::clone(&client))),
            task_runs: Arc::new(HttpTaskRunRepository::new(client)),
            probe: Arc::new(HttpRepositoryProbe::new(probe_timeout)),
        }
    }
}
