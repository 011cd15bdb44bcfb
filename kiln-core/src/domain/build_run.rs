//! BuildRun domain types
//!
//! A BuildRun is a single request to execute a Build, either referencing a
//! Build by name or inlining a complete BuildSpec.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::build::{BuildSpec, EnvVar, Image, ParamValue};
use crate::domain::condition::{self, CONDITION_SUCCEEDED, Condition, ConditionStatus};
use crate::domain::meta::ObjectMeta;

/// Kind of BuildRun objects
pub const BUILD_RUN_KIND: &str = "BuildRun";

/// Label carrying the name of the Build a BuildRun or TaskRun belongs to
pub const LABEL_BUILD: &str = "build.kiln.dev/name";

/// Label carrying the name of the BuildRun a TaskRun belongs to
pub const LABEL_BUILD_RUN: &str = "buildrun.kiln.dev/name";

/// BuildRun resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRun {
    pub metadata: ObjectMeta,
    pub spec: BuildRunSpec,
    #[serde(default)]
    pub status: BuildRunStatus,
}

impl BuildRun {
    /// Name of the referenced Build, if any
    pub fn build_name(&self) -> Option<&str> {
        self.spec.build.name.as_deref()
    }
}

/// Desired state of a BuildRun
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRunSpec {
    pub build: ReferencedBuild,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Image>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub param_values: Vec<ParamValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    /// Timeout override in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

/// Either a reference to a Build by name or an inlined BuildSpec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencedBuild {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Box<BuildSpec>>,
}

/// Observed state of a BuildRun
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRunStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Name of the TaskRun created for this BuildRun
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_run_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,

    /// Failure recovered from the execution output, published as `status.failure`
    #[serde(rename = "failure", default, skip_serializing_if = "Option::is_none")]
    pub failure_details: Option<FailureDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputResult>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceResult>,
}

impl BuildRunStatus {
    /// The `Succeeded` condition, if set
    pub fn succeeded_condition(&self) -> Option<&Condition> {
        condition::find(&self.conditions, CONDITION_SUCCEEDED)
    }

    /// Sets the `Succeeded` condition
    pub fn set_succeeded(
        &mut self,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) {
        condition::set(
            &mut self.conditions,
            Condition::succeeded(status, reason, message),
        );
    }

    /// Returns true once the run reached a terminal state
    pub fn is_done(&self) -> bool {
        self.succeeded_condition()
            .is_some_and(|c| c.status != ConditionStatus::Unknown)
    }
}

/// Structured failure recovered from a failed step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetails {
    pub reason: String,
    pub message: String,
}

/// Result describing the pushed image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputResult {
    #[serde(default)]
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

/// Result describing a fetched source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
}
