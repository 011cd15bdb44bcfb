//! Retention of BuildRuns through owner references

use async_trait::async_trait;
use kiln_core::domain::build::{API_VERSION, BUILD_KIND, Build};
use kiln_core::domain::meta::OwnerReference;
use kiln_core::domain::reason::BuildReason;
use std::sync::Arc;
use tracing::info;

use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;
use crate::repository::BuildRunRepository;

/// Adds or removes the Build as owner of its BuildRuns
///
/// With `retention.atBuildDeletion` enabled, every BuildRun of the Build is
/// owned by it and deleted together with it.
pub struct OwnerReferences {
    build_runs: Arc<dyn BuildRunRepository>,
}

impl OwnerReferences {
    pub fn new(build_runs: Arc<dyn BuildRunRepository>) -> Self {
        Self { build_runs }
    }
}

fn owner_reference(build: &Build) -> OwnerReference {
    OwnerReference {
        api_version: API_VERSION.to_string(),
        kind: BUILD_KIND.to_string(),
        name: build.metadata.name.clone(),
        uid: build.metadata.uid.clone(),
        controller: Some(true),
    }
}

fn is_owned_by(reference: &OwnerReference, build: &Build) -> bool {
    reference.kind == BUILD_KIND && reference.name == build.metadata.name
}

#[async_trait]
impl BuildValidator for OwnerReferences {
    fn kind(&self) -> ValidationKind {
        ValidationKind::OwnerReferences
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        let Some(at_build_deletion) = build
            .spec
            .retention
            .as_ref()
            .and_then(|r| r.at_build_deletion)
        else {
            return Ok(None);
        };

        let namespace = build.metadata.namespace();
        let runs = self
            .build_runs
            .list_for_build(namespace, &build.metadata.name)
            .await?;

        for mut run in runs {
            let refs = &mut run.metadata.owner_references;
            let owned = refs.iter().any(|r| is_owned_by(r, build));

            if at_build_deletion && !owned {
                if let Some(other) = refs.iter().find(|r| r.controller == Some(true)) {
                    return Ok(Some(ValidationFailure::new(
                        BuildReason::SetOwnerReferenceFailed,
                        format!(
                            "unexpected error when trying to set the ownerreference: BuildRun {} is already controlled by {} {}",
                            run.metadata.name, other.kind, other.name
                        ),
                    )));
                }
                refs.push(owner_reference(build));
            } else if !at_build_deletion && owned {
                refs.retain(|r| !is_owned_by(r, build));
            } else {
                continue;
            }

            info!(
                namespace = %namespace,
                build = %build.metadata.name,
                build_run = %run.metadata.name,
                retained = at_build_deletion,
                "Updating BuildRun owner references"
            );
            self.build_runs.update(&run).await?;
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCluster, sample};
    use kiln_core::domain::build::BuildRetention;

    fn retained(retain: bool) -> Build {
        let mut build = sample::build("buildah-golang-build");
        build.spec.retention = Some(BuildRetention {
            at_build_deletion: Some(retain),
        });
        build
    }

    #[tokio::test]
    async fn test_adds_owner_reference() {
        let cluster = FakeCluster::new();
        cluster.add_build_run(sample::build_run("run-1", "buildah-golang-build"));
        let validator = OwnerReferences::new(cluster.build_runs());

        assert_eq!(validator.validate(&retained(true)).await.unwrap(), None);

        let run = cluster.build_run(sample::NAMESPACE, "run-1").unwrap();
        assert_eq!(run.metadata.owner_references.len(), 1);
        assert_eq!(run.metadata.owner_references[0].name, "buildah-golang-build");
        assert_eq!(run.metadata.owner_references[0].uid, "buildah-golang-build-uid");
        assert_eq!(cluster.build_run_updates(), 1);
    }

    #[tokio::test]
    async fn test_removes_owner_reference() {
        let cluster = FakeCluster::new();
        let build = retained(false);
        let mut run = sample::build_run("run-1", "buildah-golang-build");
        run.metadata.owner_references.push(owner_reference(&build));
        cluster.add_build_run(run);
        let validator = OwnerReferences::new(cluster.build_runs());

        assert_eq!(validator.validate(&build).await.unwrap(), None);

        let run = cluster.build_run(sample::NAMESPACE, "run-1").unwrap();
        assert!(run.metadata.owner_references.is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_runs_are_not_written() {
        let cluster = FakeCluster::new();
        cluster.add_build_run(sample::build_run("run-1", "buildah-golang-build"));
        let validator = OwnerReferences::new(cluster.build_runs());

        assert_eq!(validator.validate(&retained(false)).await.unwrap(), None);
        assert_eq!(cluster.build_run_updates(), 0);
    }

    #[tokio::test]
    async fn test_foreign_controller() {
        let cluster = FakeCluster::new();
        let mut run = sample::build_run("run-1", "buildah-golang-build");
        run.metadata.owner_references.push(OwnerReference {
            api_version: "v1".to_string(),
            kind: "ConfigMap".to_string(),
            name: "other".to_string(),
            uid: "1".to_string(),
            controller: Some(true),
        });
        cluster.add_build_run(run);
        let validator = OwnerReferences::new(cluster.build_runs());

        let failure = validator.validate(&retained(true)).await.unwrap().unwrap();
        assert_eq!(failure.reason, BuildReason::SetOwnerReferenceFailed);
    }
}
