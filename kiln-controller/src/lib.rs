//! Kiln Controller
//!
//! Turns Build and BuildRun resources into executable TaskRuns.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Repositories: Narrow capabilities over the control plane (builds, runs,
//!   strategies, secrets, task runs, remote repositories)
//! - Validation: Pluggable validators run as a first-failure-wins chain
//! - Resources: Pure builders and decoders for the execution resource
//! - Reconcilers: One pass per resource, writing status exactly once
//! - Scheduler: Periodic resync with bounded parallelism

pub mod config;
pub mod error;
pub mod reconciler;
pub mod repository;
pub mod resources;
pub mod scheduler;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{ReconcileError, Result};
