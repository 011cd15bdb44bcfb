//! Build and BuildRun endpoints

use crate::error::Result;
use crate::{BUILD_API, ControlPlaneClient, optional};
use kiln_core::domain::build::Build;
use kiln_core::domain::build_run::BuildRun;
use kiln_core::dto::list::ObjectList;
use reqwest::Method;

impl ControlPlaneClient {
    // =============================================================================
    // Builds
    // =============================================================================

    /// Get a Build, `None` if it does not exist
    pub async fn get_build(&self, namespace: &str, name: &str) -> Result<Option<Build>> {
        let url = self.namespaced_url(BUILD_API, namespace, &format!("builds/{}", name));
        let response = self.request(Method::GET, &url).send().await?;

        optional(self.handle_response(response).await)
    }

    /// List all Builds of a namespace
    pub async fn list_builds(&self, namespace: &str) -> Result<Vec<Build>> {
        let url = self.namespaced_url(BUILD_API, namespace, "builds");
        let response = self.request(Method::GET, &url).send().await?;

        let list: ObjectList<Build> = self.handle_response(response).await?;
        Ok(list.items)
    }

    /// Replace the status of a Build
    ///
    /// Fails with [`crate::ClientError::Conflict`] when the Build changed
    /// since it was read.
    pub async fn update_build_status(&self, build: &Build) -> Result<Build> {
        let url = self.namespaced_url(
            BUILD_API,
            build.metadata.namespace(),
            &format!("builds/{}/status", build.metadata.name),
        );
        let response = self.request(Method::PUT, &url).json(build).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // BuildRuns
    // =============================================================================

    /// Get a BuildRun, `None` if it does not exist
    pub async fn get_build_run(&self, namespace: &str, name: &str) -> Result<Option<BuildRun>> {
        let url = self.namespaced_url(BUILD_API, namespace, &format!("buildruns/{}", name));
        let response = self.request(Method::GET, &url).send().await?;

        optional(self.handle_response(response).await)
    }

    /// List BuildRuns of a namespace, optionally filtered by label selector
    pub async fn list_build_runs(
        &self,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<Vec<BuildRun>> {
        let url = self.namespaced_url(BUILD_API, namespace, "buildruns");
        let mut request = self.request(Method::GET, &url);
        if let Some(selector) = label_selector {
            request = request.query(&[("labelSelector", selector)]);
        }
        let response = request.send().await?;

        let list: ObjectList<BuildRun> = self.handle_response(response).await?;
        Ok(list.items)
    }

    /// Replace a BuildRun's metadata and spec
    pub async fn update_build_run(&self, build_run: &BuildRun) -> Result<BuildRun> {
        let url = self.namespaced_url(
            BUILD_API,
            build_run.metadata.namespace(),
            &format!("buildruns/{}", build_run.metadata.name),
        );
        let response = self.request(Method::PUT, &url).json(build_run).send().await?;

        self.handle_response(response).await
    }

    /// Replace the status of a BuildRun
    pub async fn update_build_run_status(&self, build_run: &BuildRun) -> Result<BuildRun> {
        let url = self.namespaced_url(
            BUILD_API,
            build_run.metadata.namespace(),
            &format!("buildruns/{}/status", build_run.metadata.name),
        );
        let response = self.request(Method::PUT, &url).json(build_run).send().await?;

        self.handle_response(response).await
    }
}
