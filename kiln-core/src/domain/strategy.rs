//! Build strategy domain types

use serde::{Deserialize, Serialize};

use crate::domain::meta::ObjectMeta;
use crate::domain::pipeline::Step;

/// Namespaced or cluster-scoped build strategy
///
/// Both scopes share the same shape; the scope is carried by the reference
/// used to look them up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategy {
    pub metadata: ObjectMeta,
    pub spec: BuildStrategySpec,
}

/// Reusable pipeline template instantiated for each BuildRun
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategySpec {
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

/// Parameter declared by a strategy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}
