//! Data Transfer Objects
//!
//! Wire formats exchanged with the pipeline execution engine and the
//! control plane. Their shape is owned by those systems and kept as is.

pub mod list;
pub mod result;
