//! BuildRun reconciler
//!
//! The first pass over a BuildRun resolves its Build, validates the request
//! and creates the TaskRun. Later passes only mirror the TaskRun's progress.

use chrono::Utc;
use kiln_core::domain::build::{Build, ParamValue};
use kiln_core::domain::build_run::BuildRun;
use kiln_core::domain::condition::ConditionStatus;
use kiln_core::domain::meta::ObjectMeta;
use kiln_core::domain::reason::BuildRunReason;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ReconcileError, Result};
use crate::repository::Repositories;
use crate::resources::{
    generate_task_run, task_run_name, update_build_run_conditions,
    update_build_run_using_results, update_build_run_using_task_failures,
};
use crate::validate::{
    self, INLINE_VALIDATIONS, build_run_fields, lookup_strategy, validate_env_vars,
    validate_parameters,
};

/// Terminal problem with a BuildRun, recorded in its `Succeeded` condition
struct RunFailure {
    reason: String,
    message: String,
}

impl RunFailure {
    fn new(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            message: message.into(),
        }
    }
}

/// Drives BuildRuns from request to finished TaskRun
pub struct BuildRunReconciler {
    config: Arc<Config>,
    repos: Repositories,
}

impl BuildRunReconciler {
    pub fn new(config: Arc<Config>, repos: Repositories) -> Self {
        Self { config, repos }
    }

    /// Runs one reconciliation pass for the named BuildRun
    pub async fn reconcile(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<()> {
        let Some(mut build_run) = self.repos.build_runs.get(namespace, name).await? else {
            debug!(namespace, name, "BuildRun no longer exists");
            return Ok(());
        };

        if build_run.status.is_done() {
            debug!(namespace, name, "BuildRun already finished");
            return Ok(());
        }

        match build_run.status.task_run_name.clone() {
            None => {
                if let Err(failure) = self.start(cancel, &mut build_run).await? {
                    info!(
                        namespace,
                        name,
                        reason = %failure.reason,
                        "BuildRun failed: {}",
                        failure.message
                    );
                    build_run.status.set_succeeded(
                        ConditionStatus::False,
                        failure.reason,
                        failure.message,
                    );
                    build_run.status.completion_time = Some(Utc::now());
                }
            }
            Some(task_run_name) => self.observe(&mut build_run, &task_run_name).await?,
        }

        self.repos.build_runs.update_status(&build_run).await?;
        Ok(())
    }

    /// Validates the request and creates its TaskRun
    async fn start(
        &self,
        cancel: &CancellationToken,
        build_run: &mut BuildRun,
    ) -> Result<std::result::Result<(), RunFailure>> {
        if let Some(conflict) = build_run_fields(&build_run.spec) {
            return Ok(Err(RunFailure::new(conflict.reason.as_str(), conflict.message)));
        }

        let build = match self.resolve_build(cancel, build_run).await? {
            Ok(build) => build,
            Err(failure) => return Ok(Err(failure)),
        };

        if let Some(failure) = validate_env_vars(&build_run.spec.env) {
            return Ok(Err(RunFailure::new(failure.reason.as_str(), failure.message)));
        }

        let namespace = build_run.metadata.namespace().to_string();
        let strategy =
            match lookup_strategy(self.repos.strategies.as_ref(), &namespace, &build.spec.strategy)
                .await?
            {
                Ok(strategy) => strategy,
                Err(failure) => {
                    return Ok(Err(RunFailure::new(failure.reason.as_str(), failure.message)));
                }
            };

        let param_values = merge_param_values(&build.spec.param_values, &build_run.spec.param_values);
        if let Some(failure) = validate_parameters(&param_values, &strategy.spec) {
            return Ok(Err(RunFailure::new(failure.reason.as_str(), failure.message)));
        }

        if cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled);
        }

        let name = task_run_name(build_run);
        match self.repos.task_runs.get(&namespace, &name).await? {
            Some(_) => debug!(namespace = %namespace, task_run = %name, "TaskRun already exists"),
            None => {
                let task_run = generate_task_run(&self.config, &build, build_run, &strategy.spec);
                self.repos.task_runs.create(&task_run).await?;
                info!(
                    namespace = %namespace,
                    build_run = %build_run.metadata.name,
                    task_run = %name,
                    "Created TaskRun"
                );
            }
        }

        build_run.status.task_run_name = Some(name);
        build_run.status.start_time.get_or_insert_with(Utc::now);
        build_run.status.set_succeeded(
            ConditionStatus::Unknown,
            BuildRunReason::Pending.as_str(),
            "",
        );

        Ok(Ok(()))
    }

    /// Finds the Build to run, either referenced or inlined
    async fn resolve_build(
        &self,
        cancel: &CancellationToken,
        build_run: &BuildRun,
    ) -> Result<std::result::Result<Build, RunFailure>> {
        let namespace = build_run.metadata.namespace();

        if let Some(spec) = build_run.spec.build.spec.as_deref() {
            let build = Build {
                metadata: ObjectMeta {
                    namespace: Some(namespace.to_string()),
                    ..Default::default()
                },
                spec: spec.clone(),
                status: Default::default(),
            };

            let validators = validate::validations(INLINE_VALIDATIONS, &self.repos);
            if let Some(failure) = validate::all(cancel, &build, &validators).await? {
                return Ok(Err(RunFailure::new(failure.reason.as_str(), failure.message)));
            }
            return Ok(Ok(build));
        }

        let build_name = build_run.build_name().unwrap_or_default();
        let Some(build) = self.repos.builds.get(namespace, build_name).await? else {
            return Ok(Err(RunFailure::new(
                BuildRunReason::BuildNotFound.as_str(),
                format!("build.kiln.dev \"{}\" not found", build_name),
            )));
        };

        match build.status.registered {
            Some(ConditionStatus::True) => Ok(Ok(build)),
            Some(ConditionStatus::False) => Ok(Err(RunFailure::new(
                BuildRunReason::BuildRegistrationFailed.as_str(),
                format!(
                    "the Build is not registered correctly, build: {}, registered status: False, reason: {}",
                    build_name,
                    build
                        .status
                        .reason
                        .map(|r| r.as_str())
                        .unwrap_or_default()
                ),
            ))),
            Some(ConditionStatus::Unknown) | None => {
                Err(ReconcileError::BuildNotRegistered(build_name.to_string()))
            }
        }
    }

    /// Mirrors the TaskRun onto the BuildRun status
    async fn observe(&self, build_run: &mut BuildRun, task_run_name: &str) -> Result<()> {
        let namespace = build_run.metadata.namespace().to_string();

        let Some(task_run) = self.repos.task_runs.get(&namespace, task_run_name).await? else {
            warn!(
                namespace = %namespace,
                build_run = %build_run.metadata.name,
                task_run = %task_run_name,
                "TaskRun is missing"
            );
            build_run.status.set_succeeded(
                ConditionStatus::False,
                BuildRunReason::TaskRunIsMissing.as_str(),
                format!("taskRun {} is missing", task_run_name),
            );
            build_run.status.completion_time = Some(Utc::now());
            return Ok(());
        };

        update_build_run_conditions(build_run, &task_run);
        update_build_run_using_task_failures(build_run, &task_run);

        let succeeded = task_run
            .status
            .succeeded_condition()
            .is_some_and(|c| c.status == ConditionStatus::True);
        if succeeded {
            update_build_run_using_results(build_run, &task_run);
        }

        Ok(())
    }
}

/// Build parameter values followed by BuildRun values, by name
fn merge_param_values(base: &[ParamValue], overrides: &[ParamValue]) -> Vec<ParamValue> {
    let mut merged = base.to_vec();
    for value in overrides {
        match merged.iter_mut().find(|p| p.name == value.name) {
            Some(existing) => *existing = value.clone(),
            None => merged.push(value.clone()),
        }
    }
    merged
}
