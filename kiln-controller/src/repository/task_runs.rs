//! TaskRun repository

use async_trait::async_trait;
use kiln_client::{ControlPlaneClient, Result};
use kiln_core::domain::task_run::TaskRun;
use std::sync::Arc;

/// Repository trait for execution resources
#[async_trait]
pub trait TaskRunRepository: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<TaskRun>>;

    /// Creates the TaskRun and returns the stored object
    async fn create(&self, task_run: &TaskRun) -> Result<TaskRun>;
}

/// HTTP implementation of TaskRunRepository
pub struct HttpTaskRunRepository {
    client: Arc<ControlPlaneClient>,
}

impl HttpTaskRunRepository {
    pub fn new(client: Arc<ControlPlaneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskRunRepository for HttpTaskRunRepository {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<TaskRun>> {
        self.client.get_task_run(namespace, name).await
    }

    async fn create(&self, task_run: &TaskRun) -> Result<TaskRun> {
        self.client.create_task_run(task_run).await
    }
}
