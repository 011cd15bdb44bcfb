//! Strategy reference and parameter validation

use async_trait::async_trait;
use kiln_core::domain::build::{Build, ParamValue, StrategyKind, StrategyRef};
use kiln_core::domain::reason::BuildReason;
use kiln_core::domain::strategy::{BuildStrategy, BuildStrategySpec};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;
use crate::repository::StrategyRepository;

/// Prefix of parameters owned by the controller
pub const RESERVED_PARAM_PREFIX: &str = "kiln-";

/// Checks that the referenced strategy exists and receives valid parameters
pub struct Strategy {
    strategies: Arc<dyn StrategyRepository>,
}

impl Strategy {
    pub fn new(strategies: Arc<dyn StrategyRepository>) -> Self {
        Self { strategies }
    }
}

#[async_trait]
impl BuildValidator for Strategy {
    fn kind(&self) -> ValidationKind {
        ValidationKind::Strategy
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        let strategy = match lookup_strategy(
            self.strategies.as_ref(),
            build.metadata.namespace(),
            &build.spec.strategy,
        )
        .await?
        {
            Ok(strategy) => strategy,
            Err(failure) => return Ok(Some(failure)),
        };

        Ok(validate_parameters(&build.spec.param_values, &strategy.spec))
    }
}

/// Resolves a strategy reference
///
/// The outer result carries technical errors, the inner one tells whether
/// the strategy could be found.
pub async fn lookup_strategy(
    strategies: &dyn StrategyRepository,
    namespace: &str,
    strategy_ref: &StrategyRef,
) -> Result<std::result::Result<BuildStrategy, ValidationFailure>> {
    let kind = match strategy_ref.resolved_kind() {
        Ok(kind) => kind,
        Err(unknown) => {
            return Ok(Err(ValidationFailure::new(
                BuildReason::UnknownBuildStrategyKind,
                format!(
                    "unknown strategy kind {} used, must be one of BuildStrategy, ClusterBuildStrategy",
                    unknown
                ),
            )));
        }
    };

    let found = match kind {
        StrategyKind::BuildStrategy => strategies
            .get_build_strategy(namespace, &strategy_ref.name)
            .await?
            .ok_or_else(|| {
                ValidationFailure::new(
                    BuildReason::BuildStrategyNotFound,
                    format!(
                        "buildStrategy {} does not exist in namespace {}",
                        strategy_ref.name, namespace
                    ),
                )
            }),
        StrategyKind::ClusterBuildStrategy => strategies
            .get_cluster_build_strategy(&strategy_ref.name)
            .await?
            .ok_or_else(|| {
                ValidationFailure::new(
                    BuildReason::ClusterBuildStrategyNotFound,
                    format!("clusterBuildStrategy {} does not exist", strategy_ref.name),
                )
            }),
    };

    Ok(found)
}

/// Checks parameter values against the parameters a strategy declares
pub fn validate_parameters(
    values: &[ParamValue],
    strategy: &BuildStrategySpec,
) -> Option<ValidationFailure> {
    let restricted: Vec<&str> = values
        .iter()
        .map(|p| p.name.as_str())
        .filter(|name| name.starts_with(RESERVED_PARAM_PREFIX))
        .collect();
    if !restricted.is_empty() {
        return Some(ValidationFailure::new(
            BuildReason::RestrictedParametersInUse,
            format!(
                "The following parameters are restricted and cannot be set: {}",
                restricted.join(", ")
            ),
        ));
    }

    let declared: BTreeSet<&str> = strategy.parameters.iter().map(|p| p.name.as_str()).collect();
    let undefined: Vec<&str> = values
        .iter()
        .map(|p| p.name.as_str())
        .filter(|name| !declared.contains(name))
        .collect();
    if !undefined.is_empty() {
        return Some(ValidationFailure::new(
            BuildReason::UndefinedParameter,
            format!(
                "The following parameters are not defined in the build strategy: {}",
                undefined.join(", ")
            ),
        ));
    }

    let provided: BTreeSet<&str> = values.iter().map(|p| p.name.as_str()).collect();
    let missing: Vec<&str> = strategy
        .parameters
        .iter()
        .filter(|p| p.default.is_none() && !provided.contains(p.name.as_str()))
        .map(|p| p.name.as_str())
        .collect();
    if !missing.is_empty() {
        return Some(ValidationFailure::new(
            BuildReason::MissingParameterValues,
            format!(
                "The following parameters are required but no value has been provided: {}",
                missing.join(", ")
            ),
        ));
    }

    None
}
