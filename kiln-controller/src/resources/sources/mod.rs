//! Source steps
//!
//! Prepends the fetch steps of a Build's sources to a template. The git
//! source always comes first under the name `default`, auxiliary sources
//! follow in declaration order.

mod git;
mod http;

use kiln_core::domain::build::BuildSpec;
use kiln_core::domain::pipeline::TaskSpec;

use crate::config::Config;

pub use git::commit_sha_result;

/// Name of the git source
pub const DEFAULT_SOURCE_NAME: &str = "default";

/// Parameter holding the directory all sources are fetched into
pub const SOURCE_ROOT_PARAM: &str = "kiln-source-root";

/// Name of the step fetching the named source
pub fn step_name(source_name: &str) -> String {
    format!("source-{}", source_name)
}

/// Appends one fetch step per source to the template
///
/// Must be called once per template, before the strategy steps are added.
pub fn amend_task_spec_with_sources(cfg: &Config, task_spec: &mut TaskSpec, spec: &BuildSpec) {
    if let Some(source) = spec.source.as_ref().filter(|s| !s.url.is_empty()) {
        git::append_step(cfg, task_spec, source, DEFAULT_SOURCE_NAME);
    }

    for source in &spec.sources {
        task_spec.steps.push(http::step(cfg, source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::domain::build::{GitSource, HttpSource};

    fn spec_with_sources() -> BuildSpec {
        BuildSpec {
            source: Some(GitSource {
                url: "https://github.com/kiln-build/sample-go".to_string(),
                ..Default::default()
            }),
            sources: vec![
                HttpSource {
                    name: "x".to_string(),
                    url: "https://example.com/x.tar.gz".to_string(),
                },
                HttpSource {
                    name: "y".to_string(),
                    url: "https://example.com/y.tar.gz".to_string(),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_steps_follow_declaration_order() {
        let mut task_spec = TaskSpec::default();
        amend_task_spec_with_sources(&Config::default(), &mut task_spec, &spec_with_sources());

        assert_eq!(
            task_spec.step_names(),
            vec!["source-default", "source-x", "source-y"]
        );
    }

    #[test]
    fn test_git_step_uses_configured_image() {
        let cfg = Config {
            git_container_image: "registry.local/git:1".to_string(),
            ..Config::default()
        };
        let mut task_spec = TaskSpec::default();
        amend_task_spec_with_sources(&cfg, &mut task_spec, &spec_with_sources());

        assert_eq!(task_spec.steps[0].image, "registry.local/git:1");
        assert_eq!(task_spec.steps[1].image, cfg.http_container_image);
    }

    #[test]
    fn test_no_git_source() {
        let mut spec = spec_with_sources();
        spec.source = None;
        let mut task_spec = TaskSpec::default();
        amend_task_spec_with_sources(&Config::default(), &mut task_spec, &spec);

        assert_eq!(task_spec.step_names(), vec!["source-x", "source-y"]);
        assert!(task_spec.results.is_empty());
    }
}
