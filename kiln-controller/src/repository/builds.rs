//! Build and BuildRun repositories

use async_trait::async_trait;
use kiln_client::{ControlPlaneClient, Result};
use kiln_core::domain::build::Build;
use kiln_core::domain::build_run::{BuildRun, LABEL_BUILD};
use std::sync::Arc;

/// Repository trait for Build objects
#[async_trait]
pub trait BuildRepository: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Build>>;

    async fn list(&self, namespace: &str) -> Result<Vec<Build>>;

    /// Persists the status of the Build
    async fn update_status(&self, build: &Build) -> Result<()>;
}

/// Repository trait for BuildRun objects
#[async_trait]
pub trait BuildRunRepository: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<BuildRun>>;

    async fn list(&self, namespace: &str) -> Result<Vec<BuildRun>>;

    /// Lists the BuildRuns labelled as runs of the given Build
    async fn list_for_build(&self, namespace: &str, build_name: &str) -> Result<Vec<BuildRun>>;

    /// Persists metadata and spec of the BuildRun
    async fn update(&self, build_run: &BuildRun) -> Result<()>;

    /// Persists the status of the BuildRun
    async fn update_status(&self, build_run: &BuildRun) -> Result<()>;
}

/// HTTP implementation of BuildRepository
pub struct HttpBuildRepository {
    client: Arc<ControlPlaneClient>,
}

impl HttpBuildRepository {
    pub fn new(client: Arc<ControlPlaneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BuildRepository for HttpBuildRepository {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Build>> {
        self.client.get_build(namespace, name).await
    }

    async fn list(&self, namespace: &str) -> Result<Vec<Build>> {
        self.client.list_builds(namespace).await
    }

    async fn update_status(&self, build: &Build) -> Result<()> {
        self.client.update_build_status(build).await.map(|_| ())
    }
}

/// HTTP implementation of BuildRunRepository
pub struct HttpBuildRunRepository {
    client: Arc<ControlPlaneClient>,
}

impl HttpBuildRunRepository {
    pub fn new(client: Arc<ControlPlaneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BuildRunRepository for HttpBuildRunRepository {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<BuildRun>> {
        self.client.get_build_run(namespace, name).await
    }

    async fn list(&self, namespace: &str) -> Result<Vec<BuildRun>> {
        self.client.list_build_runs(namespace, None).await
    }

    async fn list_for_build(&self, namespace: &str, build_name: &str) -> Result<Vec<BuildRun>> {
        let selector = format!("{}={}", LABEL_BUILD, build_name);
        self.client
            .list_build_runs(namespace, Some(selector.as_str()))
            .await
    }

    async fn update(&self, build_run: &BuildRun) -> Result<()> {
        self.client.update_build_run(build_run).await.map(|_| ())
    }

    async fn update_status(&self, build_run: &BuildRun) -> Result<()> {
        self.client
            .update_build_run_status(build_run)
            .await
            .map(|_| ())
    }
}
