//! Secret repository

use async_trait::async_trait;
use kiln_client::{ControlPlaneClient, Result};
use std::sync::Arc;

/// Repository trait answering whether a secret exists
#[async_trait]
pub trait SecretRepository: Send + Sync {
    async fn exists(&self, namespace: &str, name: &str) -> Result<bool>;
}

/// HTTP implementation of SecretRepository
pub struct HttpSecretRepository {
    client: Arc<ControlPlaneClient>,
}

impl HttpSecretRepository {
    pub fn new(client: Arc<ControlPlaneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretRepository for HttpSecretRepository {
    async fn exists(&self, namespace: &str, name: &str) -> Result<bool> {
        self.client.secret_exists(namespace, name).await
    }
}
