//! Core domain types
//!
//! This module contains the declarative resources the controller reads and
//! writes. They mirror the control plane's object layout (metadata, spec,
//! status) and are shared between the client (transport) and the controller
//! (validation, compilation, status derivation).

pub mod build;
pub mod build_run;
pub mod condition;
pub mod meta;
pub mod pipeline;
pub mod reason;
pub mod strategy;
pub mod task_run;
