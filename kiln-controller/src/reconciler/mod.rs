//! Reconcilers
//!
//! A reconciler runs one pass for one resource: load it, decide, and write
//! its status exactly once. Returning an error means nothing was written
//! and the pass has to be repeated.

mod build;
mod build_run;

pub use build::BuildReconciler;
pub use build_run::BuildRunReconciler;
