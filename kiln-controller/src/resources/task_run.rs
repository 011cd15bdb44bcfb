//! TaskRun generation
//!
//! A TaskRun is generated once per BuildRun: source steps first, then the
//! strategy steps, with the Build's settings merged with the BuildRun's
//! overrides.

use kiln_core::domain::build::{API_VERSION, Build, EnvVar, Image, ParamValue};
use kiln_core::domain::build_run::{BUILD_RUN_KIND, BuildRun, LABEL_BUILD, LABEL_BUILD_RUN};
use kiln_core::domain::meta::{ObjectMeta, OwnerReference};
use kiln_core::domain::pipeline::{ParamSpec, TaskResult, TaskSpec, Volume, VolumeMount};
use kiln_core::domain::strategy::BuildStrategySpec;
use kiln_core::domain::task_run::{Param, TaskRun, TaskRunSpec};
use uuid::Uuid;

use super::failures::RESULT_PREFIX;
use super::results::{IMAGE_DIGEST_RESULT, IMAGE_SIZE_RESULT};
use super::sources::{SOURCE_ROOT_PARAM, amend_task_spec_with_sources};
use crate::config::Config;

/// Parameter holding the output image reference
pub const OUTPUT_IMAGE_PARAM: &str = "kiln-output-image";

/// Parameter holding the directory the build runs in
pub const SOURCE_CONTEXT_PARAM: &str = "kiln-source-context";

/// Parameter holding the timestamp policy of the output image
pub const OUTPUT_TIMESTAMP_PARAM: &str = "kiln-output-timestamp";

/// Directory sources are fetched into
pub const SOURCE_ROOT: &str = "/workspace/source";

const PUSH_SECRET_VOLUME: &str = "kiln-push-secret";
const PUSH_SECRET_MOUNT_PATH: &str = "/workspace/kiln-push-secret";

/// Name of the TaskRun belonging to a BuildRun
///
/// Derived from the BuildRun uid so that a repeated pass finds the TaskRun
/// created by an earlier one.
pub fn task_run_name(build_run: &BuildRun) -> String {
    let suffix: String = build_run
        .metadata
        .uid
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(5)
        .collect();

    let suffix = if suffix.len() == 5 {
        suffix
    } else {
        Uuid::new_v4().simple().to_string()[..5].to_string()
    };

    format!("{}-{}", build_run.metadata.name, suffix)
}

/// Output image of the run, honoring the BuildRun override
fn output_image<'a>(build: &'a Build, build_run: &'a BuildRun) -> &'a Image {
    build_run.spec.output.as_ref().unwrap_or(&build.spec.output)
}

/// Build env followed by BuildRun env, later entries replacing earlier ones
fn merge_env(base: &[EnvVar], overrides: &[EnvVar]) -> Vec<EnvVar> {
    let mut merged: Vec<EnvVar> = base.to_vec();
    for var in overrides {
        match merged.iter_mut().find(|v| v.name == var.name) {
            Some(existing) => *existing = var.clone(),
            None => merged.push(var.clone()),
        }
    }
    merged
}

fn param_value<'a>(values: &'a [ParamValue], name: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.value.as_str())
}

fn param(name: &str, value: impl Into<String>) -> Param {
    Param {
        name: name.to_string(),
        value: value.into(),
    }
}

fn param_spec(name: &str, description: &str) -> ParamSpec {
    ParamSpec {
        name: name.to_string(),
        description: description.to_string(),
        default: None,
    }
}

fn task_result(name: String, description: &str) -> TaskResult {
    TaskResult {
        name,
        description: description.to_string(),
    }
}

/// Builds the template executed for the run
fn generate_task_spec(
    cfg: &Config,
    build: &Build,
    build_run: &BuildRun,
    strategy: &BuildStrategySpec,
) -> TaskSpec {
    let mut task_spec = TaskSpec::default();

    task_spec.params = vec![
        param_spec(OUTPUT_IMAGE_PARAM, "The URL of the image that the build produces"),
        param_spec(SOURCE_ROOT_PARAM, "The root path which contains the source"),
        param_spec(SOURCE_CONTEXT_PARAM, "The context directory inside the source"),
        param_spec(OUTPUT_TIMESTAMP_PARAM, "The timestamp policy of the image"),
    ];
    task_spec.params.extend(strategy.parameters.iter().map(|p| ParamSpec {
        name: p.name.clone(),
        description: p.description.clone(),
        default: p.default.clone(),
    }));

    task_spec.results = vec![
        task_result(IMAGE_DIGEST_RESULT.to_string(), "The digest of the image"),
        task_result(IMAGE_SIZE_RESULT.to_string(), "The compressed size of the image"),
        task_result(
            format!("{}-result-error-reason", RESULT_PREFIX),
            "The error reason of the build",
        ),
        task_result(
            format!("{}-result-error-message", RESULT_PREFIX),
            "The error description of the build",
        ),
    ];

    amend_task_spec_with_sources(cfg, &mut task_spec, &build.spec);

    let push_secret = output_image(build, build_run).push_secret.as_deref();
    if let Some(secret) = push_secret {
        task_spec.volumes.push(Volume {
            name: PUSH_SECRET_VOLUME.to_string(),
            secret_name: Some(secret.to_string()),
        });
    }

    let env = merge_env(&build.spec.env, &build_run.spec.env);
    for step in &strategy.steps {
        let mut step = step.clone();
        step.env = merge_env(&step.env, &env);
        if push_secret.is_some() {
            step.volume_mounts.push(VolumeMount {
                name: PUSH_SECRET_VOLUME.to_string(),
                mount_path: PUSH_SECRET_MOUNT_PATH.to_string(),
                read_only: true,
            });
        }
        task_spec.steps.push(step);
    }

    task_spec
}

/// Builds the parameter values of the run
fn generate_params(build: &Build, build_run: &BuildRun, strategy: &BuildStrategySpec) -> Vec<Param> {
    let output = output_image(build, build_run);

    let context = match build
        .spec
        .source
        .as_ref()
        .and_then(|s| s.context_dir.as_deref())
        .filter(|dir| !dir.is_empty())
    {
        Some(dir) => format!("{}/{}", SOURCE_ROOT, dir.trim_matches('/')),
        None => SOURCE_ROOT.to_string(),
    };

    let mut params = vec![
        param(OUTPUT_IMAGE_PARAM, output.image.clone()),
        param(SOURCE_ROOT_PARAM, SOURCE_ROOT),
        param(SOURCE_CONTEXT_PARAM, context),
        param(
            OUTPUT_TIMESTAMP_PARAM,
            output.timestamp.clone().unwrap_or_default(),
        ),
    ];

    for declared in &strategy.parameters {
        let value = param_value(&build_run.spec.param_values, &declared.name)
            .or_else(|| param_value(&build.spec.param_values, &declared.name));
        if let Some(value) = value {
            params.push(param(&declared.name, value));
        }
    }

    params
}

/// Generates the TaskRun executing a BuildRun
///
/// `build` is either the referenced Build or one synthesized from the
/// BuildRun's inline spec.
pub fn generate_task_run(
    cfg: &Config,
    build: &Build,
    build_run: &BuildRun,
    strategy: &BuildStrategySpec,
) -> TaskRun {
    let mut metadata =
        ObjectMeta::namespaced(build_run.metadata.namespace(), task_run_name(build_run));
    if !build.metadata.name.is_empty() {
        metadata
            .labels
            .insert(LABEL_BUILD.to_string(), build.metadata.name.clone());
    }
    metadata
        .labels
        .insert(LABEL_BUILD_RUN.to_string(), build_run.metadata.name.clone());
    metadata.owner_references.push(OwnerReference {
        api_version: API_VERSION.to_string(),
        kind: BUILD_RUN_KIND.to_string(),
        name: build_run.metadata.name.clone(),
        uid: build_run.metadata.uid.clone(),
        controller: Some(true),
    });

    let timeout = build_run
        .spec
        .timeout
        .or(build.spec.timeout)
        .or(cfg.default_build_timeout.map(|t| t.as_secs()));

    TaskRun {
        metadata,
        spec: TaskRunSpec {
            task_spec: generate_task_spec(cfg, build, build_run, strategy),
            params: generate_params(build, build_run, strategy),
            timeout,
            service_account_name: build_run.spec.service_account.clone(),
            node_selector: build.spec.node_selector.clone(),
            tolerations: build.spec.tolerations.clone(),
            scheduler_name: build.spec.scheduler_name.clone(),
        },
        status: Default::default(),
    }
}
