//! Build results

use kiln_core::domain::build_run::{BuildRun, OutputResult, SourceResult};
use kiln_core::domain::task_run::TaskRun;
use tracing::debug;

use super::sources::{DEFAULT_SOURCE_NAME, commit_sha_result};

/// Result carrying the digest of the pushed image
pub const IMAGE_DIGEST_RESULT: &str = "kiln-image-digest";

/// Result carrying the size of the pushed image in bytes
pub const IMAGE_SIZE_RESULT: &str = "kiln-image-size";

/// Copies image and source results of a TaskRun into the BuildRun status
pub fn update_build_run_using_results(build_run: &mut BuildRun, task_run: &TaskRun) {
    let result = |name: &str| {
        task_run
            .status
            .results
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.value.trim().to_string())
    };

    if let Some(digest) = result(IMAGE_DIGEST_RESULT) {
        let size = result(IMAGE_SIZE_RESULT).and_then(|s| match s.parse::<i64>() {
            Ok(size) => Some(size),
            Err(e) => {
                debug!(value = %s, error = %e, "Ignoring invalid image size result");
                None
            }
        });
        build_run.status.output = Some(OutputResult { digest, size });
    }

    if let Some(commit_sha) = result(&commit_sha_result(DEFAULT_SOURCE_NAME)) {
        let source = SourceResult {
            name: DEFAULT_SOURCE_NAME.to_string(),
            commit_sha: Some(commit_sha),
        };
        match build_run
            .status
            .sources
            .iter_mut()
            .find(|s| s.name == DEFAULT_SOURCE_NAME)
        {
            Some(existing) => *existing = source,
            None => build_run.status.sources.push(source),
        }
    }
}
