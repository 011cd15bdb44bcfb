//! List envelope returned by the control plane

use serde::{Deserialize, Serialize};

/// Collection of objects of one kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}
