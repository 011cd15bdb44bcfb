//! Object metadata shared by every resource

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata carried by every declarative resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    /// Creates metadata for a namespaced object
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    /// Namespace of the object, empty for cluster-scoped objects
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }

    /// Returns true when the annotation is present and set to "true"
    pub fn annotation_enabled(&self, key: &str) -> bool {
        self.annotations
            .get(key)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Back-reference from a dependent object to its owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_round_trips_through_json() {
        let meta: ObjectMeta = serde_json::from_str(
            r#"{"name":"run-1","namespace":"builds","uid":"f3c1d2e4-5b6a"}"#,
        )
        .unwrap();
        assert_eq!(meta.uid, "f3c1d2e4-5b6a");
        assert_eq!(meta.namespace(), "builds");

        let meta: ObjectMeta = serde_json::from_str(r#"{"name":"run-1"}"#).unwrap();
        assert!(meta.uid.is_empty());
        assert!(!serde_json::to_string(&meta).unwrap().contains("uid"));
    }
}
