//! Scheduler name validation

use async_trait::async_trait;
use kiln_core::domain::build::Build;
use kiln_core::domain::reason::BuildReason;

use super::labels::is_qualified_name;
use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;

/// Checks that the scheduler name is a qualified name
pub struct SchedulerName;

#[async_trait]
impl BuildValidator for SchedulerName {
    fn kind(&self) -> ValidationKind {
        ValidationKind::SchedulerName
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        let Some(name) = build.spec.scheduler_name.as_deref().filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        let errs = is_qualified_name(name);
        if errs.is_empty() {
            return Ok(None);
        }

        Ok(Some(ValidationFailure::new(
            BuildReason::SchedulerNameNotValid,
            errs.join(", "),
        )))
    }
}
