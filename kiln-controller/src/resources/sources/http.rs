//! HTTP source step

use kiln_core::domain::build::HttpSource;
use kiln_core::domain::pipeline::Step;
use url::Url;

use super::{SOURCE_ROOT_PARAM, step_name};
use crate::config::Config;

/// File name the download is stored under
///
/// Uses the last path segment of the URL, or the source name when the URL
/// has none.
fn file_name(source: &HttpSource) -> String {
    Url::parse(&source.url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| source.name.clone())
}

/// Builds the step downloading an HTTP source into the source root
pub fn step(cfg: &Config, source: &HttpSource) -> Step {
    Step {
        name: step_name(&source.name),
        image: cfg.http_container_image.clone(),
        command: vec!["curl".to_string()],
        args: vec![
            "--fail".to_string(),
            "--silent".to_string(),
            "--retry".to_string(),
            "3".to_string(),
            "--location".to_string(),
            "--output".to_string(),
            format!("$(params.{})/{}", SOURCE_ROOT_PARAM, file_name(source)),
            source.url.clone(),
        ],
        ..Default::default()
    }
}
