//! Build strategy repository

use async_trait::async_trait;
use kiln_client::{ControlPlaneClient, Result};
use kiln_core::domain::strategy::BuildStrategy;
use std::sync::Arc;

/// Repository trait for namespaced and cluster-scoped strategies
#[async_trait]
pub trait StrategyRepository: Send + Sync {
    async fn get_build_strategy(&self, namespace: &str, name: &str)
    -> Result<Option<BuildStrategy>>;

    async fn get_cluster_build_strategy(&self, name: &str) -> Result<Option<BuildStrategy>>;
}

/// HTTP implementation of StrategyRepository
pub struct HttpStrategyRepository {
    client: Arc<ControlPlaneClient>,
}

impl HttpStrategyRepository {
    pub fn new(client: Arc<ControlPlaneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StrategyRepository for HttpStrategyRepository {
    async fn get_build_strategy(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BuildStrategy>> {
        self.client.get_build_strategy(namespace, name).await
    }

    async fn get_cluster_build_strategy(&self, name: &str) -> Result<Option<BuildStrategy>> {
        self.client.get_cluster_build_strategy(name).await
    }
}
