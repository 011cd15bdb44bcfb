//! Build validation
//!
//! Every concern a Build must satisfy is checked by its own validator. A
//! validator answers with an optional [`ValidationFailure`]; only technical
//! problems travel as errors. The chain runner [`all`] runs validators in
//! priority order and stops at the first failure, so a lower-priority check
//! can never replace the reason reported by a higher-priority one.

mod build_name;
mod build_run_fields;
mod credentials;
mod env;
pub mod labels;
mod node_selector;
mod output;
mod owner_references;
mod scheduler_name;
mod source;
mod source_url;
mod strategy;
mod tolerations;
mod triggers;

use async_trait::async_trait;
use kiln_core::domain::build::Build;
use kiln_core::domain::reason::BuildReason;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ReconcileError, Result};
use crate::repository::Repositories;

pub use build_name::BuildName;
pub use build_run_fields::{FieldConflict, build_run_fields};
pub use credentials::Credentials;
pub use env::{Env, validate_env_vars};
pub use node_selector::NodeSelector;
pub use output::Output;
pub use owner_references::OwnerReferences;
pub use scheduler_name::SchedulerName;
pub use source::Source;
pub use source_url::SourceUrl;
pub use strategy::{Strategy, lookup_strategy, validate_parameters};
pub use tolerations::Tolerations;
pub use triggers::Triggers;

/// Semantic rule violation, recorded in the Build status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub reason: BuildReason,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(reason: BuildReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.message)
    }
}

/// A single validation concern
#[async_trait]
pub trait BuildValidator: Send + Sync {
    /// Registry tag of this validator
    fn kind(&self) -> ValidationKind;

    /// Checks the Build
    ///
    /// Returns `Ok(Some(_))` on a semantic failure and `Err(_)` when the
    /// check itself could not be completed.
    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>>;
}

/// Registry tags of the known validators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    Secrets,
    Strategy,
    SourceUrl,
    Source,
    Output,
    BuildName,
    Env,
    OwnerReferences,
    Triggers,
    NodeSelector,
    Tolerations,
    SchedulerName,
}

impl ValidationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKind::Secrets => "secrets",
            ValidationKind::Strategy => "strategy",
            ValidationKind::SourceUrl => "sourceurl",
            ValidationKind::Source => "source",
            ValidationKind::Output => "output",
            ValidationKind::BuildName => "buildname",
            ValidationKind::Env => "env",
            ValidationKind::OwnerReferences => "ownerreferences",
            ValidationKind::Triggers => "triggers",
            ValidationKind::NodeSelector => "nodeselector",
            ValidationKind::Tolerations => "tolerations",
            ValidationKind::SchedulerName => "schedulername",
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown validation tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown validation type")]
pub struct UnknownValidation;

impl FromStr for ValidationKind {
    type Err = UnknownValidation;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "secrets" => Ok(ValidationKind::Secrets),
            "strategy" => Ok(ValidationKind::Strategy),
            "sourceurl" => Ok(ValidationKind::SourceUrl),
            "source" => Ok(ValidationKind::Source),
            "output" => Ok(ValidationKind::Output),
            "buildname" => Ok(ValidationKind::BuildName),
            "env" => Ok(ValidationKind::Env),
            "ownerreferences" => Ok(ValidationKind::OwnerReferences),
            "triggers" => Ok(ValidationKind::Triggers),
            "nodeselector" => Ok(ValidationKind::NodeSelector),
            "tolerations" => Ok(ValidationKind::Tolerations),
            "schedulername" => Ok(ValidationKind::SchedulerName),
            _ => Err(UnknownValidation),
        }
    }
}

/// Validators applied to a stored Build, in priority order
pub const BUILD_VALIDATIONS: &[ValidationKind] = &[
    ValidationKind::OwnerReferences,
    ValidationKind::SourceUrl,
    ValidationKind::Secrets,
    ValidationKind::Strategy,
    ValidationKind::Source,
    ValidationKind::BuildName,
    ValidationKind::Env,
    ValidationKind::Output,
    ValidationKind::Triggers,
    ValidationKind::NodeSelector,
    ValidationKind::Tolerations,
    ValidationKind::SchedulerName,
];

/// Validators applied to a Build inlined in a BuildRun
///
/// Inline specs own no BuildRuns and carry no triggers, so those checks
/// are left out.
pub const INLINE_VALIDATIONS: &[ValidationKind] = &[
    ValidationKind::SourceUrl,
    ValidationKind::Secrets,
    ValidationKind::Strategy,
    ValidationKind::Source,
    ValidationKind::Env,
    ValidationKind::Output,
    ValidationKind::NodeSelector,
    ValidationKind::Tolerations,
    ValidationKind::SchedulerName,
];

/// Creates the validator registered under `kind`
///
/// Each validator receives only the capabilities it uses.
pub fn new_validation(kind: ValidationKind, repos: &Repositories) -> Box<dyn BuildValidator> {
    match kind {
        ValidationKind::Secrets => Box::new(Credentials::new(Arc::clone(&repos.secrets))),
        ValidationKind::Strategy => Box::new(Strategy::new(Arc::clone(&repos.strategies))),
        ValidationKind::SourceUrl => Box::new(SourceUrl::new(Arc::clone(&repos.probe))),
        ValidationKind::Source => Box::new(Source),
        ValidationKind::Output => Box::new(Output),
        ValidationKind::BuildName => Box::new(BuildName),
        ValidationKind::Env => Box::new(Env),
        ValidationKind::OwnerReferences => {
            Box::new(OwnerReferences::new(Arc::clone(&repos.build_runs)))
        }
        ValidationKind::Triggers => Box::new(Triggers),
        ValidationKind::NodeSelector => Box::new(NodeSelector),
        ValidationKind::Tolerations => Box::new(Tolerations),
        ValidationKind::SchedulerName => Box::new(SchedulerName),
    }
}

/// Creates the validators for the given tags, keeping their order
pub fn validations(kinds: &[ValidationKind], repos: &Repositories) -> Vec<Box<dyn BuildValidator>> {
    kinds
        .iter()
        .map(|kind| new_validation(*kind, repos))
        .collect()
}

/// Runs validators strictly in order
///
/// Returns the first semantic failure and skips the remaining validators.
/// A technical error or a cancellation aborts the chain.
pub async fn all(
    cancel: &CancellationToken,
    build: &Build,
    validators: &[Box<dyn BuildValidator>],
) -> Result<Option<ValidationFailure>> {
    for validator in validators {
        if cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ReconcileError::Cancelled),
            outcome = validator.validate(build) => outcome?,
        };

        if let Some(failure) = outcome {
            debug!(
                name = %build.metadata.name,
                validation = %validator.kind(),
                reason = %failure.reason,
                "Build validation failed"
            );
            return Ok(Some(failure));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCluster;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        failure: Option<ValidationFailure>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BuildValidator for Fixed {
        fn kind(&self) -> ValidationKind {
            ValidationKind::Env
        }

        async fn validate(&self, _build: &Build) -> Result<Option<ValidationFailure>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.failure.clone())
        }
    }

    fn fixed(failure: Option<ValidationFailure>) -> (Box<dyn BuildValidator>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let validator = Fixed {
            failure,
            calls: Arc::clone(&calls),
        };
        (Box::new(validator), calls)
    }

    #[test]
    fn test_kind_round_trips_through_tag() {
        for kind in BUILD_VALIDATIONS {
            assert_eq!(kind.as_str().parse::<ValidationKind>(), Ok(*kind));
        }
        assert_eq!(
            "schedulername".parse::<ValidationKind>(),
            Ok(ValidationKind::SchedulerName)
        );
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = "nonexistent".parse::<ValidationKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown validation type");
    }

    #[test]
    fn test_factory_builds_requested_validator() {
        let cluster = FakeCluster::new();
        let repos = cluster.repositories();

        for kind in BUILD_VALIDATIONS {
            assert_eq!(new_validation(*kind, &repos).kind(), *kind);
        }
    }

    #[tokio::test]
    async fn test_first_failure_wins() {
        let first = ValidationFailure::new(BuildReason::SpecSourceNotValid, "first");
        let second = ValidationFailure::new(BuildReason::BuildNameInvalid, "second");
        let (a, a_calls) = fixed(Some(first.clone()));
        let (b, b_calls) = fixed(Some(second));

        let outcome = all(&CancellationToken::new(), &Build::default(), &[a, b])
            .await
            .unwrap();

        assert_eq!(outcome, Some(first));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_passing_validators_all_run() {
        let (a, a_calls) = fixed(None);
        let (b, b_calls) = fixed(None);

        let outcome = all(&CancellationToken::new(), &Build::default(), &[a, b])
            .await
            .unwrap();

        assert_eq!(outcome, None);
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_chain() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (a, a_calls) = fixed(None);

        let result = all(&cancel, &Build::default(), &[a]).await;

        assert!(matches!(result, Err(ReconcileError::Cancelled)));
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
    }
}
