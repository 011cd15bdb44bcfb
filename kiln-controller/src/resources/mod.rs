//! Execution resources
//!
//! Pure builders and decoders for the TaskRun that executes a BuildRun.
//! Nothing in here performs I/O.

pub mod conditions;
pub mod failures;
pub mod results;
pub mod sources;
pub mod task_run;

pub use conditions::update_build_run_conditions;
pub use failures::update_build_run_using_task_failures;
pub use results::update_build_run_using_results;
pub use sources::amend_task_spec_with_sources;
pub use task_run::{generate_task_run, task_run_name};
