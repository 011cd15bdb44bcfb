//! Secret reference validation

use async_trait::async_trait;
use kiln_core::domain::build::Build;
use kiln_core::domain::reason::BuildReason;
use std::sync::Arc;

use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;
use crate::repository::SecretRepository;

/// Checks that every secret referenced by the Build exists
pub struct Credentials {
    secrets: Arc<dyn SecretRepository>,
}

impl Credentials {
    pub fn new(secrets: Arc<dyn SecretRepository>) -> Self {
        Self { secrets }
    }
}

#[async_trait]
impl BuildValidator for Credentials {
    fn kind(&self) -> ValidationKind {
        ValidationKind::Secrets
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        let namespace = build.metadata.namespace();

        let mut refs: Vec<(&str, BuildReason)> = Vec::new();
        if let Some(secret) = build.spec.source.as_ref().and_then(|s| s.clone_secret.as_deref()) {
            refs.push((secret, BuildReason::SpecSourceSecretRefNotFound));
        }
        if let Some(secret) = build.spec.output.push_secret.as_deref() {
            refs.push((secret, BuildReason::SpecOutputSecretRefNotFound));
        }

        let mut missing = Vec::new();
        for (name, reason) in refs {
            if !self.secrets.exists(namespace, name).await? {
                missing.push((name, reason));
            }
        }

        Ok(match missing.as_slice() {
            [] => None,
            [(name, reason)] => Some(ValidationFailure::new(
                *reason,
                format!("referenced secret {} not found", name),
            )),
            _ => {
                let mut names: Vec<&str> = missing.iter().map(|(name, _)| *name).collect();
                names.sort_unstable();
                Some(ValidationFailure::new(
                    BuildReason::MultipleSecretRefNotFound,
                    format!("missing secrets are {}", names.join(",")),
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCluster, sample};

    fn build_with_secrets(clone: Option<&str>, push: Option<&str>) -> Build {
        let mut build = sample::build("buildah-golang-build");
        if let Some(source) = build.spec.source.as_mut() {
            source.clone_secret = clone.map(str::to_string);
        }
        build.spec.output.push_secret = push.map(str::to_string);
        build
    }

    #[tokio::test]
    async fn test_all_secrets_present() {
        let cluster = FakeCluster::new();
        cluster.add_secret(sample::NAMESPACE, "source-secret");
        cluster.add_secret(sample::NAMESPACE, "registry-secret");
        let validator = Credentials::new(cluster.secrets());

        let build = build_with_secrets(Some("source-secret"), Some("registry-secret"));
        assert_eq!(validator.validate(&build).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_clone_secret() {
        let cluster = FakeCluster::new();
        let validator = Credentials::new(cluster.secrets());

        let build = build_with_secrets(Some("non-existing"), None);
        let failure = validator.validate(&build).await.unwrap().unwrap();
        assert_eq!(failure.reason, BuildReason::SpecSourceSecretRefNotFound);
        assert_eq!(failure.message, "referenced secret non-existing not found");
    }

    #[tokio::test]
    async fn test_missing_push_secret() {
        let cluster = FakeCluster::new();
        let validator = Credentials::new(cluster.secrets());

        let build = build_with_secrets(None, Some("non-existing"));
        let failure = validator.validate(&build).await.unwrap().unwrap();
        assert_eq!(failure.reason, BuildReason::SpecOutputSecretRefNotFound);
    }

    #[tokio::test]
    async fn test_multiple_missing_secrets_are_sorted() {
        let cluster = FakeCluster::new();
        let validator = Credentials::new(cluster.secrets());

        let build = build_with_secrets(Some("source-secret"), Some("output-secret"));
        let failure = validator.validate(&build).await.unwrap().unwrap();
        assert_eq!(failure.reason, BuildReason::MultipleSecretRefNotFound);
        assert_eq!(failure.message, "missing secrets are output-secret,source-secret");
    }

    #[tokio::test]
    async fn test_client_failure_is_technical() {
        let cluster = FakeCluster::new();
        cluster.set_unavailable(true);
        let validator = Credentials::new(cluster.secrets());

        let build = build_with_secrets(Some("source-secret"), None);
        assert!(validator.validate(&build).await.is_err());
    }
}
