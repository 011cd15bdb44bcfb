//! Closed enumerations of status reason codes

use serde::{Deserialize, Serialize};

/// Message recorded on a Build that passed every validation
pub const ALL_VALIDATIONS_SUCCEEDED: &str = "all validations succeeded";

/// Reason recorded in a Build's status after validation
///
/// The wire representation is the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildReason {
    Succeeded,
    SpecSourceSecretRefNotFound,
    SpecOutputSecretRefNotFound,
    MultipleSecretRefNotFound,
    BuildStrategyNotFound,
    ClusterBuildStrategyNotFound,
    UnknownBuildStrategyKind,
    SetOwnerReferenceFailed,
    RemoteRepositoryUnreachable,
    SpecSourceNotValid,
    BuildNameInvalid,
    SpecEnvNameCanNotBeBlank,
    SpecEnvOnlyOneOfValueOrValueFromMustBeSpecified,
    RestrictedParametersInUse,
    UndefinedParameter,
    MissingParameterValues,
    TriggerNotValid,
    OutputTimestampNotSupported,
    OutputTimestampNotValid,
    NodeSelectorNotValid,
    TolerationNotValid,
    SchedulerNameNotValid,
}

impl BuildReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildReason::Succeeded => "Succeeded",
            BuildReason::SpecSourceSecretRefNotFound => "SpecSourceSecretRefNotFound",
            BuildReason::SpecOutputSecretRefNotFound => "SpecOutputSecretRefNotFound",
            BuildReason::MultipleSecretRefNotFound => "MultipleSecretRefNotFound",
            BuildReason::BuildStrategyNotFound => "BuildStrategyNotFound",
            BuildReason::ClusterBuildStrategyNotFound => "ClusterBuildStrategyNotFound",
            BuildReason::UnknownBuildStrategyKind => "UnknownBuildStrategyKind",
            BuildReason::SetOwnerReferenceFailed => "SetOwnerReferenceFailed",
            BuildReason::RemoteRepositoryUnreachable => "RemoteRepositoryUnreachable",
            BuildReason::SpecSourceNotValid => "SpecSourceNotValid",
            BuildReason::BuildNameInvalid => "BuildNameInvalid",
            BuildReason::SpecEnvNameCanNotBeBlank => "SpecEnvNameCanNotBeBlank",
            BuildReason::SpecEnvOnlyOneOfValueOrValueFromMustBeSpecified => {
                "SpecEnvOnlyOneOfValueOrValueFromMustBeSpecified"
            }
            BuildReason::RestrictedParametersInUse => "RestrictedParametersInUse",
            BuildReason::UndefinedParameter => "UndefinedParameter",
            BuildReason::MissingParameterValues => "MissingParameterValues",
            BuildReason::TriggerNotValid => "TriggerNotValid",
            BuildReason::OutputTimestampNotSupported => "OutputTimestampNotSupported",
            BuildReason::OutputTimestampNotValid => "OutputTimestampNotValid",
            BuildReason::NodeSelectorNotValid => "NodeSelectorNotValid",
            BuildReason::TolerationNotValid => "TolerationNotValid",
            BuildReason::SchedulerNameNotValid => "SchedulerNameNotValid",
        }
    }
}

impl std::fmt::Display for BuildReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason recorded in a BuildRun's `Succeeded` condition by the controller
///
/// Build validation failures of an inlined spec reuse [`BuildReason`] codes,
/// so the condition itself stores the reason as a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildRunReason {
    NoRefOrSpec,
    AmbiguousBuild,
    BuildFieldOverrideForbidden,
    BuildNotFound,
    BuildRegistrationFailed,
    Pending,
    Running,
    Succeeded,
    Failed,
    BuildRunTimeout,
    BuildRunCanceled,
    TaskRunIsMissing,
}

impl BuildRunReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildRunReason::NoRefOrSpec => "NoRefOrSpec",
            BuildRunReason::AmbiguousBuild => "AmbiguousBuild",
            BuildRunReason::BuildFieldOverrideForbidden => "BuildFieldOverrideForbidden",
            BuildRunReason::BuildNotFound => "BuildNotFound",
            BuildRunReason::BuildRegistrationFailed => "BuildRegistrationFailed",
            BuildRunReason::Pending => "Pending",
            BuildRunReason::Running => "Running",
            BuildRunReason::Succeeded => "Succeeded",
            BuildRunReason::Failed => "Failed",
            BuildRunReason::BuildRunTimeout => "BuildRunTimeout",
            BuildRunReason::BuildRunCanceled => "BuildRunCanceled",
            BuildRunReason::TaskRunIsMissing => "TaskRunIsMissing",
        }
    }
}

impl std::fmt::Display for BuildRunReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
