//! Auxiliary source validation

use async_trait::async_trait;
use kiln_core::domain::build::Build;
use kiln_core::domain::reason::BuildReason;
use std::collections::BTreeSet;
use url::Url;

use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;
use crate::resources::sources::DEFAULT_SOURCE_NAME;

/// Checks names and URLs of the auxiliary HTTP sources
pub struct Source;

#[async_trait]
impl BuildValidator for Source {
    fn kind(&self) -> ValidationKind {
        ValidationKind::Source
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        let mut seen = BTreeSet::new();

        for source in &build.spec.sources {
            let problem = if source.name.is_empty() {
                Some("source name must not be empty".to_string())
            } else if source.name == DEFAULT_SOURCE_NAME {
                Some(format!(
                    "source name {} is reserved for the git source",
                    DEFAULT_SOURCE_NAME
                ))
            } else if !seen.insert(source.name.as_str()) {
                Some(format!("source name {} is used more than once", source.name))
            } else if source.url.is_empty() {
                Some(format!("source {} must specify an url", source.name))
            } else if !Url::parse(&source.url)
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
            {
                Some(format!("source {} has an invalid url {}", source.name, source.url))
            } else {
                None
            };

            if let Some(message) = problem {
                return Ok(Some(ValidationFailure::new(
                    BuildReason::SpecSourceNotValid,
                    message,
                )));
            }
        }

        Ok(None)
    }
}
