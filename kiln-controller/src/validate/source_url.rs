//! Remote repository reachability

use async_trait::async_trait;
use kiln_core::domain::build::{ANNOTATION_VERIFY_REPOSITORY, Build};
use kiln_core::domain::reason::BuildReason;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;
use crate::repository::RepositoryProbe;

/// Checks that a public git repository can be reached
///
/// Runs only when the Build opts in through the verify annotation and does
/// not use clone credentials.
pub struct SourceUrl {
    probe: Arc<dyn RepositoryProbe>,
}

impl SourceUrl {
    pub fn new(probe: Arc<dyn RepositoryProbe>) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl BuildValidator for SourceUrl {
    fn kind(&self) -> ValidationKind {
        ValidationKind::SourceUrl
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        if !build
            .metadata
            .annotation_enabled(ANNOTATION_VERIFY_REPOSITORY)
        {
            return Ok(None);
        }

        let Some(source) = build.spec.source.as_ref() else {
            return Ok(None);
        };
        if source.url.is_empty() || source.clone_secret.is_some() {
            return Ok(None);
        }

        let url = match Url::parse(&source.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                return Ok(Some(ValidationFailure::new(
                    BuildReason::RemoteRepositoryUnreachable,
                    "invalid source url",
                )));
            }
        };

        if self.probe.is_reachable(&url).await {
            return Ok(None);
        }

        debug!(name = %build.metadata.name, url = %url, "Remote repository is unreachable");
        Ok(Some(ValidationFailure::new(
            BuildReason::RemoteRepositoryUnreachable,
            "remote repository unreachable",
        )))
    }
}
