//! Control loop
//!
//! Resyncs all Builds and BuildRuns of the watched namespace on every tick.
//! Builds go first so that BuildRuns see fresh registration results. Each
//! resource gets its own task, bounded by a semaphore, and a tick finishes
//! only when all of its passes did, so a resource never has two passes in
//! flight.

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::ReconcileError;
use crate::reconciler::{BuildReconciler, BuildRunReconciler};
use crate::repository::Repositories;

/// Periodic resync of the watched namespace
pub struct ControlLoop {
    config: Arc<Config>,
    repos: Repositories,
    builds: Arc<BuildReconciler>,
    build_runs: Arc<BuildRunReconciler>,
    semaphore: Arc<Semaphore>,
}

impl ControlLoop {
    /// Creates a new control loop
    pub fn new(config: Arc<Config>, repos: Repositories) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_parallel_reconciles));
        Self {
            builds: Arc::new(BuildReconciler::new(repos.clone())),
            build_runs: Arc::new(BuildRunReconciler::new(Arc::clone(&config), repos.clone())),
            config,
            repos,
            semaphore,
        }
    }

    /// Runs until the token is cancelled
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        info!(
            namespace = %self.config.namespace,
            "Starting control loop (interval: {:?})",
            self.config.reconcile_interval
        );

        let mut interval = time::interval(self.config.reconcile_interval);

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    info!("Shutdown requested, stopping control loop");
                    break;
                }

                _ = interval.tick() => {}
            }

            debug!("Resyncing resources");

            match self.resync_once(&cancel).await {
                Ok(count) => debug!("Reconciled {} resource(s) this cycle", count),
                Err(e) => error!("Error during resync cycle: {:#}", e),
            }
        }

        Ok(())
    }

    /// Performs a single resync of Builds, then BuildRuns
    pub async fn resync_once(&self, cancel: &CancellationToken) -> Result<usize> {
        let namespace = self.config.namespace.clone();

        let builds = self
            .repos
            .builds
            .list(&namespace)
            .await
            .context("Failed to fetch builds")?;

        let mut handles = Vec::with_capacity(builds.len());
        for build in builds {
            let reconciler = Arc::clone(&self.builds);
            let cancel = cancel.clone();
            let namespace = namespace.clone();
            let name = build.metadata.name;
            handles.push(
                self.spawn_pass("Build", name.clone(), async move {
                    reconciler.reconcile(&cancel, &namespace, &name).await
                })
                .await?,
            );
        }
        let mut count = Self::join_all(handles).await;

        let build_runs = self
            .repos
            .build_runs
            .list(&namespace)
            .await
            .context("Failed to fetch build runs")?;

        let mut handles = Vec::with_capacity(build_runs.len());
        for build_run in build_runs {
            if build_run.status.is_done() {
                continue;
            }
            let reconciler = Arc::clone(&self.build_runs);
            let cancel = cancel.clone();
            let namespace = namespace.clone();
            let name = build_run.metadata.name;
            handles.push(
                self.spawn_pass("BuildRun", name.clone(), async move {
                    reconciler.reconcile(&cancel, &namespace, &name).await
                })
                .await?,
            );
        }
        count += Self::join_all(handles).await;

        Ok(count)
    }

    /// Spawns a pass once a permit is available
    async fn spawn_pass<F>(&self, kind: &'static str, name: String, pass: F) -> Result<JoinHandle<()>>
    where
        F: Future<Output = crate::error::Result<()>> + Send + 'static,
    {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .context("Reconcile semaphore closed")?;

        Ok(tokio::spawn(async move {
            match pass.await {
                Ok(()) => {}
                Err(ReconcileError::Cancelled) => debug!(kind, name = %name, "Pass cancelled"),
                Err(e @ ReconcileError::BuildNotRegistered(_)) => {
                    info!(kind, name = %name, "Retrying later: {}", e)
                }
                Err(e) => error!(kind, name = %name, "Failed to reconcile: {}", e),
            }
            drop(permit);
        }))
    }

    async fn join_all(handles: Vec<JoinHandle<()>>) -> usize {
        let count = handles.len();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Reconcile task panicked: {}", e);
            }
        }
        count
    }
}
