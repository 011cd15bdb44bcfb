//! Execution resource types
//!
//! A TaskRun is the running or terminated pipeline instance created from a
//! compiled template. The controller creates it and only reads its status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::build::Toleration;
use crate::domain::condition::{self, CONDITION_SUCCEEDED, Condition};
use crate::domain::meta::ObjectMeta;
use crate::domain::pipeline::TaskSpec;

/// TaskRun reason reported when a step failed
pub const TASK_RUN_REASON_FAILED: &str = "Failed";

/// TaskRun reason reported when the run exceeded its timeout
pub const TASK_RUN_REASON_TIMEOUT: &str = "TaskRunTimeout";

/// TaskRun reason reported when the run was cancelled
pub const TASK_RUN_REASON_CANCELLED: &str = "TaskRunCancelled";

/// TaskRun reason reported before the first step started
pub const TASK_RUN_REASON_PENDING: &str = "Pending";

/// Execution resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRun {
    pub metadata: ObjectMeta,
    pub spec: TaskRunSpec,
    #[serde(default)]
    pub status: TaskRunStatus,
}

/// Desired state of a TaskRun
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunSpec {
    pub task_spec: TaskSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    /// Timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler_name: Option<String>,
}

/// Parameter value passed to the template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub name: String,
    pub value: String,
}

/// Observed state of a TaskRun, written by the execution engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub steps: Vec<StepState>,
    #[serde(default)]
    pub results: Vec<TaskRunResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

impl TaskRunStatus {
    /// The `Succeeded` condition, if the engine reported one
    pub fn succeeded_condition(&self) -> Option<&Condition> {
        condition::find(&self.conditions, CONDITION_SUCCEEDED)
    }
}

/// State of a single step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated: Option<StepTerminated>,
}

/// Terminal state of a step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTerminated {
    #[serde(default)]
    pub exit_code: i32,
    #[serde(default)]
    pub reason: String,
    /// Free-text termination message, a JSON array of result entries by convention
    #[serde(default)]
    pub message: String,
}

/// Named result emitted by the run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunResult {
    pub name: String,
    pub value: String,
}
