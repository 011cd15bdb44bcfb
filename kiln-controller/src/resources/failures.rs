//! Failure details recovered from step termination messages
//!
//! A failing step may report why it failed by writing two well-known
//! results into its termination message. The message is produced by the
//! execution engine, so its format is taken as is: a JSON array of
//! `{"key", "value"}` objects.

use kiln_core::domain::build_run::{BuildRun, FailureDetails};
use kiln_core::domain::condition::{CONDITION_SUCCEEDED, ConditionStatus};
use kiln_core::domain::task_run::{StepState, TASK_RUN_REASON_FAILED, TaskRun};
use kiln_core::dto::result::parse_termination_message;
use tracing::debug;

/// Prefix of parameters, results and volumes owned by the controller
pub const RESULT_PREFIX: &str = "kiln";

const RESULT_ERROR_REASON: &str = "result-error-reason";
const RESULT_ERROR_MESSAGE: &str = "result-error-message";

fn error_reason_key() -> String {
    format!("{}-{}", RESULT_PREFIX, RESULT_ERROR_REASON)
}

fn error_message_key() -> String {
    format!("{}-{}", RESULT_PREFIX, RESULT_ERROR_MESSAGE)
}

/// Copies failure details of a failed TaskRun into the BuildRun status
///
/// Does nothing unless the TaskRun's `Succeeded` condition is `False` with
/// reason `Failed`. The first step reporting both error results wins;
/// unparsable messages are skipped.
pub fn update_build_run_using_task_failures(build_run: &mut BuildRun, task_run: &TaskRun) {
    let failed = task_run.status.succeeded_condition().is_some_and(|c| {
        c.matches(
            CONDITION_SUCCEEDED,
            ConditionStatus::False,
            TASK_RUN_REASON_FAILED,
        )
    });
    if !failed {
        return;
    }

    if let Some(details) = task_run.status.steps.iter().find_map(extract_failure) {
        build_run.status.failure_details = Some(details);
    }
}

fn extract_failure(step: &StepState) -> Option<FailureDetails> {
    let message = step
        .terminated
        .as_ref()
        .map(|t| t.message.as_str())
        .filter(|m| !m.is_empty())?;

    let entries = match parse_termination_message(message) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(step = %step.name, error = %e, "Ignoring unparsable termination message");
            return None;
        }
    };

    let reason_key = error_reason_key();
    let message_key = error_message_key();

    let reason = entries.iter().find(|e| e.key == reason_key)?;
    let message = entries.iter().find(|e| e.key == message_key)?;

    Some(FailureDetails {
        reason: reason.value.clone(),
        message: message.value.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::domain::condition::Condition;
    use kiln_core::domain::task_run::StepTerminated;
    use kiln_core::dto::result::ResultEntry;

    fn step_with_message(message: &str) -> StepState {
        StepState {
            name: "step-build".to_string(),
            terminated: Some(StepTerminated {
                exit_code: 1,
                reason: "Error".to_string(),
                message: message.to_string(),
            }),
        }
    }

    fn entries_message(entries: &[ResultEntry]) -> String {
        serde_json::to_string(entries).unwrap()
    }

    fn task_run(condition: Condition, steps: Vec<StepState>) -> TaskRun {
        let mut task_run = TaskRun::default();
        task_run.status.conditions.push(condition);
        task_run.status.steps = steps;
        task_run
    }

    fn failed_task_run(steps: Vec<StepState>) -> TaskRun {
        task_run(
            Condition::succeeded(ConditionStatus::False, TASK_RUN_REASON_FAILED, ""),
            steps,
        )
    }

    fn error_entries() -> Vec<ResultEntry> {
        vec![
            ResultEntry::new("kiln-result-error-reason", "val1"),
            ResultEntry::new("kiln-result-error-message", "val2"),
            ResultEntry::new("unrelated", "unrelated"),
        ]
    }

    #[test]
    fn test_surfaces_errors_of_failed_task_run() {
        let task_run = failed_task_run(vec![step_with_message(&entries_message(&error_entries()))]);
        let mut build_run = BuildRun::default();

        update_build_run_using_task_failures(&mut build_run, &task_run);

        assert_eq!(
            build_run.status.failure_details,
            Some(FailureDetails {
                reason: "val1".to_string(),
                message: "val2".to_string(),
            })
        );
    }

    #[test]
    fn test_is_idempotent() {
        let task_run = failed_task_run(vec![step_with_message(&entries_message(&error_entries()))]);
        let mut build_run = BuildRun::default();

        update_build_run_using_task_failures(&mut build_run, &task_run);
        let first = build_run.status.failure_details.clone();
        update_build_run_using_task_failures(&mut build_run, &task_run);

        assert!(first.is_some());
        assert_eq!(build_run.status.failure_details, first);
    }

    #[test]
    fn test_failed_task_run_without_error_results() {
        let unrelated = entries_message(&[ResultEntry::new("unrelated", "unrelated")]);
        let task_run = failed_task_run(vec![step_with_message(&unrelated)]);
        let mut build_run = BuildRun::default();

        update_build_run_using_task_failures(&mut build_run, &task_run);

        assert_eq!(build_run.status.failure_details, None);
    }

    #[test]
    fn test_only_one_error_result() {
        let partial = entries_message(&[ResultEntry::new("kiln-result-error-reason", "val1")]);
        let task_run = failed_task_run(vec![step_with_message(&partial)]);
        let mut build_run = BuildRun::default();

        update_build_run_using_task_failures(&mut build_run, &task_run);

        assert_eq!(build_run.status.failure_details, None);
    }

    #[test]
    fn test_unparsable_message_is_skipped() {
        let task_run = failed_task_run(vec![
            step_with_message("Error: exit status 1"),
            step_with_message(&entries_message(&error_entries())),
        ]);
        let mut build_run = BuildRun::default();

        update_build_run_using_task_failures(&mut build_run, &task_run);

        assert_eq!(
            build_run.status.failure_details.map(|d| d.reason),
            Some("val1".to_string())
        );
    }

    #[test]
    fn test_successful_task_run_is_ignored() {
        let task_run = task_run(
            Condition::succeeded(ConditionStatus::True, "Succeeded", ""),
            vec![step_with_message(&entries_message(&error_entries()))],
        );
        let mut build_run = BuildRun::default();

        update_build_run_using_task_failures(&mut build_run, &task_run);

        assert_eq!(build_run.status.failure_details, None);
    }

    #[test]
    fn test_unknown_reason_is_ignored() {
        let task_run = task_run(
            Condition::succeeded(ConditionStatus::False, "random", ""),
            vec![step_with_message(&entries_message(&error_entries()))],
        );
        let mut build_run = BuildRun::default();

        update_build_run_using_task_failures(&mut build_run, &task_run);

        assert_eq!(build_run.status.failure_details, None);
    }

    #[test]
    fn test_task_run_without_succeeded_condition() {
        let mut ready = Condition::succeeded(ConditionStatus::False, TASK_RUN_REASON_FAILED, "");
        ready.kind = "Ready".to_string();
        let task_run = task_run(ready, vec![step_with_message(&entries_message(&error_entries()))]);
        let mut build_run = BuildRun::default();

        update_build_run_using_task_failures(&mut build_run, &task_run);

        assert_eq!(build_run.status.failure_details, None);
    }
}
