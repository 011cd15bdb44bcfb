//! Git source step

use kiln_core::domain::build::GitSource;
use kiln_core::domain::pipeline::{Step, TaskResult, TaskSpec, Volume, VolumeMount};

use super::{SOURCE_ROOT_PARAM, step_name};
use crate::config::Config;

const SECRET_MOUNT_ROOT: &str = "/workspace/kiln-source-secrets";

/// Name of the result carrying the fetched commit of a git source
pub fn commit_sha_result(source_name: &str) -> String {
    format!("kiln-source-{}-commit-sha", source_name)
}

/// Builds the step cloning a git repository
pub fn step(cfg: &Config, source: &GitSource, name: &str) -> Step {
    let mut args = vec![
        "--url".to_string(),
        source.url.clone(),
        "--target".to_string(),
        format!("$(params.{})", SOURCE_ROOT_PARAM),
        "--result-file-commit-sha".to_string(),
        format!("$(results.{}.path)", commit_sha_result(name)),
    ];

    if let Some(revision) = source.revision.as_deref().filter(|r| !r.is_empty()) {
        args.push("--revision".to_string());
        args.push(revision.to_string());
    }

    let mut volume_mounts = Vec::new();
    if let Some(secret) = source.clone_secret.as_deref() {
        let mount_path = format!("{}/{}", SECRET_MOUNT_ROOT, name);
        args.push("--secret-path".to_string());
        args.push(mount_path.clone());
        volume_mounts.push(VolumeMount {
            name: secret_volume_name(secret),
            mount_path,
            read_only: true,
        });
    }

    Step {
        name: step_name(name),
        image: cfg.git_container_image.clone(),
        command: vec!["/usr/local/bin/kiln-git".to_string()],
        args,
        volume_mounts,
        ..Default::default()
    }
}

fn secret_volume_name(secret: &str) -> String {
    format!("kiln-secret-{}", secret)
}

/// Appends the git step with its result and secret volume
pub(super) fn append_step(cfg: &Config, task_spec: &mut TaskSpec, source: &GitSource, name: &str) {
    task_spec.results.push(TaskResult {
        name: commit_sha_result(name),
        description: format!("The commit SHA of the source {}", name),
    });

    if let Some(secret) = source.clone_secret.as_deref() {
        let volume = secret_volume_name(secret);
        if !task_spec.volumes.iter().any(|v| v.name == volume) {
            task_spec.volumes.push(Volume {
                name: volume,
                secret_name: Some(secret.to_string()),
            });
        }
    }

    task_spec.steps.push(step(cfg, source, name));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_with_revision_and_secret() {
        let source = GitSource {
            url: "https://github.com/kiln-build/private".to_string(),
            revision: Some("main".to_string()),
            clone_secret: Some("git-creds".to_string()),
            ..Default::default()
        };
        let step = step(&Config::default(), &source, "default");

        assert_eq!(step.name, "source-default");
        assert!(step.args.windows(2).any(|w| w == ["--revision", "main"]));
        assert_eq!(step.volume_mounts.len(), 1);
        assert_eq!(step.volume_mounts[0].name, "kiln-secret-git-creds");
        assert!(step.volume_mounts[0].read_only);
    }

    #[test]
    fn test_append_declares_result_and_volume() {
        let source = GitSource {
            url: "https://github.com/kiln-build/private".to_string(),
            clone_secret: Some("git-creds".to_string()),
            ..Default::default()
        };
        let mut task_spec = TaskSpec::default();
        append_step(&Config::default(), &mut task_spec, &source, "default");

        assert_eq!(task_spec.results[0].name, "kiln-source-default-commit-sha");
        assert_eq!(task_spec.volumes[0].secret_name.as_deref(), Some("git-creds"));
    }
}
