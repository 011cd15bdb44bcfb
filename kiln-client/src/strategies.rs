//! Build strategy endpoints

use crate::error::Result;
use crate::{BUILD_API, ControlPlaneClient, optional};
use kiln_core::domain::strategy::BuildStrategy;
use reqwest::Method;

impl ControlPlaneClient {
    /// Get a namespaced BuildStrategy, `None` if it does not exist
    pub async fn get_build_strategy(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BuildStrategy>> {
        let url = self.namespaced_url(BUILD_API, namespace, &format!("buildstrategies/{}", name));
        let response = self.request(Method::GET, &url).send().await?;

        optional(self.handle_response(response).await)
    }

    /// Get a ClusterBuildStrategy, `None` if it does not exist
    pub async fn get_cluster_build_strategy(&self, name: &str) -> Result<Option<BuildStrategy>> {
        let url = format!(
            "{}/{}/clusterbuildstrategies/{}",
            self.base_url, BUILD_API, name
        );
        let response = self.request(Method::GET, &url).send().await?;

        optional(self.handle_response(response).await)
    }
}
