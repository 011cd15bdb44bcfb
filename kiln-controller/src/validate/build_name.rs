//! Build name validation

use async_trait::async_trait;
use kiln_core::domain::build::Build;
use kiln_core::domain::reason::BuildReason;

use super::labels::is_valid_label_value;
use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;

/// Checks that the Build name can be used as a label value
///
/// The name ends up in the labels of every BuildRun and TaskRun.
pub struct BuildName;

#[async_trait]
impl BuildValidator for BuildName {
    fn kind(&self) -> ValidationKind {
        ValidationKind::BuildName
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        let name = &build.metadata.name;

        let errs = if name.is_empty() {
            vec!["must not be empty".to_string()]
        } else {
            is_valid_label_value(name)
        };

        if errs.is_empty() {
            return Ok(None);
        }

        Ok(Some(ValidationFailure::new(
            BuildReason::BuildNameInvalid,
            errs.join(", "),
        )))
    }
}
