//! Build domain types
//!
//! A Build is the immutable template describing how an image is produced:
//! where the source comes from, which strategy builds it and where the
//! result is pushed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::condition::ConditionStatus;
use crate::domain::meta::ObjectMeta;
use crate::domain::reason::BuildReason;

/// API version of Build and BuildRun objects
pub const API_VERSION: &str = "kiln.dev/v1";

/// Kind of Build objects
pub const BUILD_KIND: &str = "Build";

/// Annotation opting a Build into remote repository verification
pub const ANNOTATION_VERIFY_REPOSITORY: &str = "build.kiln.dev/verify.repository";

/// Output timestamp policy: use the Unix epoch
pub const OUTPUT_IMAGE_ZERO_TIMESTAMP: &str = "Zero";

/// Output timestamp policy: use the timestamp of the source commit
pub const OUTPUT_IMAGE_SOURCE_TIMESTAMP: &str = "SourceTimestamp";

/// Output timestamp policy: use the time of the build
pub const OUTPUT_IMAGE_BUILD_TIMESTAMP: &str = "BuildTimestamp";

/// Build resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub metadata: ObjectMeta,
    pub spec: BuildSpec,
    #[serde(default)]
    pub status: BuildStatus,
}

/// Desired state of a Build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    /// Default source, always fetched with git
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<GitSource>,

    /// Auxiliary sources, fetched after the default source in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<HttpSource>,

    pub strategy: StrategyRef,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub param_values: Vec<ParamValue>,

    pub output: Image,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    /// Maximum build duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<BuildRetention>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler_name: Option<String>,
}

impl BuildSpec {
    /// Returns true if a git source with a non-empty URL is configured
    pub fn has_git_source(&self) -> bool {
        self.source.as_ref().is_some_and(|git| !git.url.is_empty())
    }
}

/// Git source descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_dir: Option<String>,
    /// Name of the secret holding clone credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_secret: Option<String>,
}

/// Auxiliary source downloaded over HTTP
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSource {
    pub name: String,
    pub url: String,
}

/// Reference to a BuildStrategy or ClusterBuildStrategy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRef {
    pub name: String,
    /// Kind of the strategy, namespaced `BuildStrategy` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl StrategyRef {
    /// Resolves the strategy kind, returning the raw value when it is unknown
    pub fn resolved_kind(&self) -> Result<StrategyKind, &str> {
        match self.kind.as_deref() {
            None | Some("BuildStrategy") => Ok(StrategyKind::BuildStrategy),
            Some("ClusterBuildStrategy") => Ok(StrategyKind::ClusterBuildStrategy),
            Some(other) => Err(other),
        }
    }
}

/// Scope of a build strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    BuildStrategy,
    ClusterBuildStrategy,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::BuildStrategy => write!(f, "BuildStrategy"),
            StrategyKind::ClusterBuildStrategy => write!(f, "ClusterBuildStrategy"),
        }
    }
}

/// Value for a strategy parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamValue {
    pub name: String,
    pub value: String,
}

/// Output image descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_secret: Option<String>,
    /// One of Zero, SourceTimestamp, BuildTimestamp or a Unix timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Environment variable passed to strategy steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<EnvVarSource>,
}

impl EnvVar {
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            value_from: None,
        }
    }

    /// Returns true if a non-empty literal value is set
    pub fn has_value(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// Source for the value of an environment variable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_ref: Option<FieldSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<KeySelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map_key_ref: Option<KeySelector>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSelector {
    pub field_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySelector {
    pub name: String,
    pub key: String,
}

/// Scheduling toleration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toleration {
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub effect: String,
}

/// Retention settings for BuildRuns of a Build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRetention {
    /// Delete BuildRuns together with their Build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_build_deletion: Option<bool>,
}

/// Trigger configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(default)]
    pub when: Vec<TriggerWhen>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_secret: Option<String>,
}

/// Trigger type: GitHub webhook events
pub const TRIGGER_TYPE_GITHUB: &str = "GitHub";

/// Trigger type: image updates
pub const TRIGGER_TYPE_IMAGE: &str = "Image";

/// Trigger type: pipeline status changes
pub const TRIGGER_TYPE_PIPELINE: &str = "Pipeline";

/// A single trigger condition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerWhen {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<WhenGitHub>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<WhenImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_ref: Option<WhenObjectRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhenGitHub {
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub branches: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhenImage {
    #[serde(default)]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhenObjectRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selector: BTreeMap<String, String>,
}

/// Observed state of a Build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered: Option<ConditionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<BuildReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
