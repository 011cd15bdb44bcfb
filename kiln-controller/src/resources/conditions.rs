//! BuildRun conditions derived from the TaskRun

use chrono::Utc;
use kiln_core::domain::build_run::BuildRun;
use kiln_core::domain::condition::ConditionStatus;
use kiln_core::domain::reason::BuildRunReason;
use kiln_core::domain::task_run::{
    TASK_RUN_REASON_CANCELLED, TASK_RUN_REASON_PENDING, TASK_RUN_REASON_TIMEOUT, TaskRun,
};

/// Mirrors the TaskRun's `Succeeded` condition onto the BuildRun
///
/// Also carries over start and completion times. A finished BuildRun always
/// ends up with a completion time, falling back to now when the engine did
/// not report one.
pub fn update_build_run_conditions(build_run: &mut BuildRun, task_run: &TaskRun) {
    let (status, reason, message) = match task_run.status.succeeded_condition() {
        None => (
            ConditionStatus::Unknown,
            BuildRunReason::Pending,
            String::new(),
        ),
        Some(c) => match c.status {
            ConditionStatus::Unknown if c.reason == TASK_RUN_REASON_PENDING => {
                (c.status, BuildRunReason::Pending, c.message.clone())
            }
            ConditionStatus::Unknown => (c.status, BuildRunReason::Running, c.message.clone()),
            ConditionStatus::True => (c.status, BuildRunReason::Succeeded, c.message.clone()),
            ConditionStatus::False => match c.reason.as_str() {
                TASK_RUN_REASON_TIMEOUT => (
                    c.status,
                    BuildRunReason::BuildRunTimeout,
                    format!(
                        "BuildRun {} failed to finish within {}",
                        build_run.metadata.name,
                        task_run
                            .spec
                            .timeout
                            .map(|secs| format!("{}s", secs))
                            .unwrap_or_else(|| "its timeout".to_string())
                    ),
                ),
                TASK_RUN_REASON_CANCELLED => (
                    c.status,
                    BuildRunReason::BuildRunCanceled,
                    "The BuildRun and underlying TaskRun were canceled successfully.".to_string(),
                ),
                _ => (c.status, BuildRunReason::Failed, c.message.clone()),
            },
        },
    };

    build_run
        .status
        .set_succeeded(status, reason.as_str(), message);

    if build_run.status.start_time.is_none() {
        build_run.status.start_time = task_run.status.start_time;
    }
    if status != ConditionStatus::Unknown {
        build_run.status.completion_time = task_run
            .status
            .completion_time
            .or(build_run.status.completion_time)
            .or_else(|| Some(Utc::now()));
    }
}
