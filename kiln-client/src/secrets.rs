//! Secret endpoints
//!
//! Only the existence of secrets matters to the controller, so their data is
//! never deserialized.

use crate::error::Result;
use crate::{CORE_API, ControlPlaneClient, optional};
use kiln_core::domain::meta::ObjectMeta;
use reqwest::Method;
use serde::Deserialize;

#[derive(Deserialize)]
struct SecretHeader {
    #[allow(dead_code)]
    metadata: ObjectMeta,
}

impl ControlPlaneClient {
    /// Check whether a secret exists
    pub async fn secret_exists(&self, namespace: &str, name: &str) -> Result<bool> {
        let url = self.namespaced_url(CORE_API, namespace, &format!("secrets/{}", name));
        let response = self.request(Method::GET, &url).send().await?;

        let secret: Option<SecretHeader> = optional(self.handle_response(response).await)?;
        tracing::trace!(namespace, name, found = secret.is_some(), "Looked up secret");
        Ok(secret.is_some())
    }
}
