//! Trigger validation

use async_trait::async_trait;
use kiln_core::domain::build::{
    Build, TRIGGER_TYPE_GITHUB, TRIGGER_TYPE_IMAGE, TRIGGER_TYPE_PIPELINE, TriggerWhen,
};
use kiln_core::domain::reason::BuildReason;

use super::{BuildValidator, ValidationFailure, ValidationKind};
use crate::error::Result;

/// Checks the structure of every trigger condition
pub struct Triggers;

fn validate_when(when: &TriggerWhen) -> Option<String> {
    match when.kind.as_str() {
        TRIGGER_TYPE_GITHUB => {
            let has_events = when.github.as_ref().is_some_and(|g| !g.events.is_empty());
            (!has_events).then(|| format!("{}: missing GitHub events", when.name))
        }
        TRIGGER_TYPE_IMAGE => {
            let has_names = when.image.as_ref().is_some_and(|i| !i.names.is_empty());
            (!has_names).then(|| format!("{}: missing image names", when.name))
        }
        TRIGGER_TYPE_PIPELINE => match when.object_ref.as_ref() {
            None => Some(format!("{}: missing object reference", when.name)),
            Some(object_ref) if object_ref.status.is_empty() => {
                Some(format!("{}: missing object reference status", when.name))
            }
            Some(object_ref) if object_ref.name.is_none() && object_ref.selector.is_empty() => {
                Some(format!(
                    "{}: object reference must specify a name or a selector",
                    when.name
                ))
            }
            Some(_) => None,
        },
        other => Some(format!("{}: unknown trigger type {:?}", when.name, other)),
    }
}

#[async_trait]
impl BuildValidator for Triggers {
    fn kind(&self) -> ValidationKind {
        ValidationKind::Triggers
    }

    async fn validate(&self, build: &Build) -> Result<Option<ValidationFailure>> {
        let Some(trigger) = build.spec.trigger.as_ref() else {
            return Ok(None);
        };

        Ok(trigger
            .when
            .iter()
            .find_map(validate_when)
            .map(|message| ValidationFailure::new(BuildReason::TriggerNotValid, message)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::domain::build::{Trigger, WhenGitHub, WhenImage, WhenObjectRef};

    fn build_with(when: TriggerWhen) -> Build {
        let mut build = Build::default();
        build.spec.trigger = Some(Trigger {
            when: vec![when],
            trigger_secret: None,
        });
        build
    }

    fn when(kind: &str) -> TriggerWhen {
        TriggerWhen {
            name: "on-change".to_string(),
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_valid_triggers() {
        let github = TriggerWhen {
            github: Some(WhenGitHub {
                events: vec!["Push".to_string()],
                branches: vec!["main".to_string()],
            }),
            ..when("GitHub")
        };
        let image = TriggerWhen {
            image: Some(WhenImage {
                names: vec!["golang:latest".to_string()],
            }),
            ..when("Image")
        };
        let pipeline = TriggerWhen {
            object_ref: Some(WhenObjectRef {
                name: Some("tests".to_string()),
                status: vec!["Succeeded".to_string()],
                ..Default::default()
            }),
            ..when("Pipeline")
        };

        for entry in [github, image, pipeline] {
            assert_eq!(Triggers.validate(&build_with(entry)).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_invalid_triggers() {
        let pipeline_without_target = TriggerWhen {
            object_ref: Some(WhenObjectRef {
                status: vec!["Succeeded".to_string()],
                ..Default::default()
            }),
            ..when("Pipeline")
        };

        for entry in [
            when("GitHub"),
            when("Image"),
            when("Pipeline"),
            pipeline_without_target,
            when("Cron"),
        ] {
            let failure = Triggers.validate(&build_with(entry)).await.unwrap().unwrap();
            assert_eq!(failure.reason, BuildReason::TriggerNotValid);
        }
    }
}
