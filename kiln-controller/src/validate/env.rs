//! Environment variable validation

use async_trait::async_trait;
use kiln_core::domain::build::{Build, EnvVar};
use kiln_core::domain::reason::BuildReason;

use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;

/// Checks the Build's environment variables
pub struct Env;

#[async_trait]
impl BuildValidator for Env {
    fn kind(&self) -> ValidationKind {
        ValidationKind::Env
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        Ok(validate_env_vars(&build.spec.env))
    }
}

/// Checks a list of environment variables
///
/// Shared with the BuildRun reconciler, which applies it to env overrides.
pub fn validate_env_vars(env: &[EnvVar]) -> Option<ValidationFailure> {
    env.iter().find_map(validate_env_var)
}

fn validate_env_var(var: &EnvVar) -> Option<ValidationFailure> {
    if var.name.trim().is_empty() {
        return Some(ValidationFailure::new(
            BuildReason::SpecEnvNameCanNotBeBlank,
            "name for environment variable must not be blank",
        ));
    }

    if var.has_value() && var.value_from.is_some() {
        return Some(ValidationFailure::new(
            BuildReason::SpecEnvOnlyOneOfValueOrValueFromMustBeSpecified,
            "only one of value or valueFrom must be specified",
        ));
    }

    None
}
