//! Node selector validation

use async_trait::async_trait;
use kiln_core::domain::build::Build;
use kiln_core::domain::reason::BuildReason;

use super::labels::{is_qualified_name, is_valid_label_value};
use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;

/// Checks that every node selector entry is a valid label
pub struct NodeSelector;

#[async_trait]
impl BuildValidator for NodeSelector {
    fn kind(&self) -> ValidationKind {
        ValidationKind::NodeSelector
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        for (key, value) in &build.spec.node_selector {
            let errs = is_qualified_name(key);
            if !errs.is_empty() {
                return Ok(Some(ValidationFailure::new(
                    BuildReason::NodeSelectorNotValid,
                    format!("Node selector key not valid: {}", errs.join(", ")),
                )));
            }

            let errs = is_valid_label_value(value);
            if !errs.is_empty() {
                return Ok(Some(ValidationFailure::new(
                    BuildReason::NodeSelectorNotValid,
                    format!("Node selector value not valid: {}", errs.join(", ")),
                )));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_with(key: &str, value: &str) -> Build {
        let mut build = Build::default();
        build
            .spec
            .node_selector
            .insert(key.to_string(), value.to_string());
        build
    }

    #[tokio::test]
    async fn test_valid_selector() {
        let build = build_with("kubernetes.io/arch", "amd64");
        assert_eq!(NodeSelector.validate(&build).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_key() {
        let build = build_with(&"k".repeat(64), "amd64");
        let failure = NodeSelector.validate(&build).await.unwrap().unwrap();
        assert_eq!(failure.reason, BuildReason::NodeSelectorNotValid);
        assert!(failure.message.starts_with("Node selector key not valid"));
        assert!(failure.message.contains("name part must be no more than 63 characters"));
    }

    #[tokio::test]
    async fn test_invalid_value() {
        let build = build_with("kubernetes.io/arch", "-amd64");
        let failure = NodeSelector.validate(&build).await.unwrap().unwrap();
        assert_eq!(failure.reason, BuildReason::NodeSelectorNotValid);
        assert!(failure.message.starts_with("Node selector value not valid"));
    }
}
