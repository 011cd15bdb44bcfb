//! Build reconciler

use kiln_core::domain::build::BuildStatus;
use kiln_core::domain::condition::ConditionStatus;
use kiln_core::domain::reason::{ALL_VALIDATIONS_SUCCEEDED, BuildReason};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::Result;
use crate::repository::Repositories;
use crate::validate::{self, BUILD_VALIDATIONS};

/// Validates Builds and records whether they are registered
pub struct BuildReconciler {
    repos: Repositories,
}

impl BuildReconciler {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Runs one reconciliation pass for the named Build
    pub async fn reconcile(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<()> {
        let Some(mut build) = self.repos.builds.get(namespace, name).await? else {
            debug!(namespace, name, "Build no longer exists");
            return Ok(());
        };

        let validators = validate::validations(BUILD_VALIDATIONS, &self.repos);
        let outcome = validate::all(cancel, &build, &validators).await?;

        build.status = match outcome {
            Some(failure) => {
                info!(
                    namespace,
                    name,
                    reason = %failure.reason,
                    "Build failed validation: {}",
                    failure.message
                );
                BuildStatus {
                    registered: Some(ConditionStatus::False),
                    reason: Some(failure.reason),
                    message: Some(failure.message),
                }
            }
            None => BuildStatus {
                registered: Some(ConditionStatus::True),
                reason: Some(BuildReason::Succeeded),
                message: Some(ALL_VALIDATIONS_SUCCEEDED.to_string()),
            },
        };

        self.repos.builds.update_status(&build).await?;
        debug!(namespace, name, registered = ?build.status.registered, "Build status updated");

        Ok(())
    }
}
