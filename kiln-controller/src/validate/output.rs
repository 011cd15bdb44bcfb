//! Output image validation

use async_trait::async_trait;
use kiln_core::domain::build::{
    Build, OUTPUT_IMAGE_BUILD_TIMESTAMP, OUTPUT_IMAGE_SOURCE_TIMESTAMP,
    OUTPUT_IMAGE_ZERO_TIMESTAMP,
};
use kiln_core::domain::reason::BuildReason;

use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;

/// Checks the timestamp policy of the output image
pub struct Output;

#[async_trait]
impl BuildValidator for Output {
    fn kind(&self) -> ValidationKind {
        ValidationKind::Output
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        let Some(timestamp) = build.spec.output.timestamp.as_deref() else {
            return Ok(None);
        };

        match timestamp {
            "" | OUTPUT_IMAGE_ZERO_TIMESTAMP | OUTPUT_IMAGE_BUILD_TIMESTAMP => Ok(None),
            OUTPUT_IMAGE_SOURCE_TIMESTAMP if !build.spec.has_git_source() => {
                Ok(Some(ValidationFailure::new(
                    BuildReason::OutputTimestampNotSupported,
                    "cannot use SourceTimestamp output image setting with an empty build source",
                )))
            }
            OUTPUT_IMAGE_SOURCE_TIMESTAMP => Ok(None),
            other if other.parse::<i64>().is_ok() => Ok(None),
            _ => Ok(Some(ValidationFailure::new(
                BuildReason::OutputTimestampNotValid,
                "output timestamp value is invalid, must be Zero, SourceTimestamp, BuildTimestamp, or number",
            ))),
        }
    }
}
