//! BuildRun field conflicts
//!
//! A BuildRun either references a Build or inlines one. Overrides only make
//! sense for referenced Builds, an inline spec must carry them itself.

use kiln_core::domain::build_run::BuildRunSpec;
use kiln_core::domain::reason::BuildRunReason;

/// Disallowed combination of BuildRun fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConflict {
    pub reason: BuildRunReason,
    pub message: String,
}

impl FieldConflict {
    fn new(reason: BuildRunReason, message: &str) -> Self {
        Self {
            reason,
            message: message.to_string(),
        }
    }
}

/// Checks the BuildRun for conflicting fields, first match wins
pub fn build_run_fields(spec: &BuildRunSpec) -> Option<FieldConflict> {
    let Some(inline) = spec.build.spec.as_ref() else {
        if spec.build.name.is_none() {
            return Some(FieldConflict::new(
                BuildRunReason::NoRefOrSpec,
                "no build referenced or specified, either 'build.name' or 'build.spec' has to be set",
            ));
        }
        return None;
    };

    if spec.build.name.is_some() {
        return Some(FieldConflict::new(
            BuildRunReason::AmbiguousBuild,
            "fields 'build.name' and 'build.spec' are mutually exclusive",
        ));
    }

    let forbidden = if spec.output.is_some() {
        "cannot use 'output' override and 'build.spec' simultaneously"
    } else if !spec.param_values.is_empty() {
        "cannot use 'paramValues' override and 'build.spec' simultaneously"
    } else if !spec.env.is_empty() {
        "cannot use 'env' override and 'build.spec' simultaneously"
    } else if spec.timeout.is_some() {
        "cannot use 'timeout' override and 'build.spec' simultaneously"
    } else if inline.trigger.is_some() {
        "cannot use 'triggers' override in the 'BuildRun', only allowed in the 'Build'"
    } else {
        return None;
    };

    Some(FieldConflict::new(
        BuildRunReason::BuildFieldOverrideForbidden,
        forbidden,
    ))
}
