//! Toleration validation

use async_trait::async_trait;
use kiln_core::domain::build::{Build, Toleration};
use kiln_core::domain::reason::BuildReason;

use super::labels::{is_qualified_name, is_valid_label_value};
use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;

const OPERATOR_EXISTS: &str = "Exists";
const OPERATOR_EQUAL: &str = "Equal";
const EFFECT_NO_SCHEDULE: &str = "NoSchedule";

/// Checks key, operator, value and effect of every toleration
pub struct Tolerations;

fn validate_toleration(toleration: &Toleration) -> Option<String> {
    let errs = is_qualified_name(&toleration.key);
    if !errs.is_empty() {
        return Some(format!("Toleration key not valid: {}", errs.join(", ")));
    }

    let operator = toleration.operator.as_deref().unwrap_or_default();
    match operator {
        OPERATOR_EXISTS if !toleration.value.is_empty() => {
            return Some(
                "Toleration value must be empty when the operator is Exists".to_string(),
            );
        }
        OPERATOR_EXISTS | OPERATOR_EQUAL => {}
        "" => {
            return Some(
                "Toleration operator missing. Must be one of: 'Exists', 'Equal'".to_string(),
            );
        }
        other => {
            return Some(format!(
                "Toleration operator not valid. Must be one of: 'Exists', 'Equal', got {:?}",
                other
            ));
        }
    }

    let errs = is_valid_label_value(&toleration.value);
    if !errs.is_empty() {
        return Some(format!("Toleration value not valid: {}", errs.join(", ")));
    }

    if !toleration.effect.is_empty() && toleration.effect != EFFECT_NO_SCHEDULE {
        return Some(format!(
            "Only the 'NoSchedule' toleration effect is supported, got {:?}",
            toleration.effect
        ));
    }

    None
}

#[async_trait]
impl BuildValidator for Tolerations {
    fn kind(&self) -> ValidationKind {
        ValidationKind::Tolerations
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        Ok(build
            .spec
            .tolerations
            .iter()
            .find_map(validate_toleration)
            .map(|message| ValidationFailure::new(BuildReason::TolerationNotValid, message)))
    }
}
