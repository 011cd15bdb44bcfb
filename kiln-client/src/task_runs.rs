//! TaskRun endpoints

use crate::error::Result;
use crate::{ControlPlaneClient, PIPELINE_API, optional};
use kiln_core::domain::task_run::TaskRun;
use reqwest::Method;

impl ControlPlaneClient {
    /// Get a TaskRun, `None` if it does not exist
    pub async fn get_task_run(&self, namespace: &str, name: &str) -> Result<Option<TaskRun>> {
        let url = self.namespaced_url(PIPELINE_API, namespace, &format!("taskruns/{}", name));
        let response = self.request(Method::GET, &url).send().await?;

        optional(self.handle_response(response).await)
    }

    /// Create a TaskRun
    pub async fn create_task_run(&self, task_run: &TaskRun) -> Result<TaskRun> {
        let url = self.namespaced_url(PIPELINE_API, task_run.metadata.namespace(), "taskruns");
        let response = self.request(Method::POST, &url).json(task_run).send().await?;

        self.handle_response(response).await
    }
}
