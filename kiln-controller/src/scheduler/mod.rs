//! Scheduler layer for the controller
//!
//! Periodically lists the watched resources and runs reconciliation passes
//! for them. A pass that fails with a technical error is simply repeated on
//! the next tick.

pub mod poller;

pub use poller::ControlLoop;
