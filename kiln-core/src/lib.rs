//! Kiln Core
//!
//! Core types and abstractions for the Kiln build controller.
//!
//! This crate contains:
//! - Domain types: declarative resources (Build, BuildRun, strategies, TaskRun)
//! - DTOs: wire formats exchanged with the execution engine and control plane

pub mod domain;
pub mod dto;
