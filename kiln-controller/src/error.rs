//! Technical errors of a reconciliation pass
//!
//! Semantic problems with a resource never travel through these types: they
//! are recorded in the resource's status. An error returned from a pass means
//! nothing was written and the pass must run again later.

use kiln_client::ClientError;
use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Transient failure aborting a reconciliation pass
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The control plane could not serve a request
    #[error("control plane request failed: {0}")]
    Client(#[from] ClientError),

    /// The caller cancelled the pass
    #[error("reconciliation cancelled")]
    Cancelled,

    /// The referenced Build has not been validated yet
    #[error("build {0} has not been registered yet")]
    BuildNotRegistered(String),
}
