//! Reconciliation request and outcome.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ClassMapError;

use super::class_map::ClassMap;
use super::state::State;

/// Everything one run needs: the transition, the desired class-maps and the
/// running configuration text of the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Request {
    #[serde(default)]
    pub state: State,
    #[serde(default)]
    pub config: Vec<ClassMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_config: Option<String>,
}

impl Request {
    pub fn new(state: State) -> Self {
        Request {
            state,
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: Vec<ClassMap>) -> Self {
        self.config = config;
        self
    }

    pub fn with_running_config(mut self, text: impl Into<String>) -> Self {
        self.running_config = Some(text.into());
        self
    }

    /// Read a request from its JSON form, e.g.
    /// `{"state": "replaced", "config": [{"name": "voice"}], "running_config": "..."}`.
    pub fn from_json(json: &str) -> Result<Self, ClassMapError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Commands to apply to the device, in order.
    Commands(Vec<String>),
    /// Commands rendered offline from the desired class-maps.
    Rendered(Vec<String>),
    /// Class-maps parsed from the running configuration.
    Parsed(Vec<ClassMap>),
}

impl Outcome {
    /// The command lines of an apply or render outcome.
    pub fn commands(&self) -> Option<&[String]> {
        match self {
            Outcome::Commands(c) | Outcome::Rendered(c) => Some(c),
            Outcome::Parsed(_) => None,
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Commands(c) if !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_json_defaults() {
        let request = Request::from_json(r#"{"config": [{"name": "a"}]}"#).unwrap();
        assert_eq!(request.state, State::Merged);
        assert_eq!(request.config, vec![ClassMap::new("a")]);
        assert!(request.running_config.is_none());
    }

    #[test]
    fn test_request_from_json_rejects_unknown_state() {
        let result = Request::from_json(r#"{"state": "gathered"}"#);
        assert!(matches!(result, Err(ClassMapError::InvalidFormat(_))));
    }

    #[test]
    fn test_outcome_changed() {
        assert!(!Outcome::Commands(vec![]).changed());
        assert!(Outcome::Commands(vec!["no class-map match-all a".into()]).changed());
        assert!(!Outcome::Rendered(vec!["class-map match-all a".into()]).changed());
        assert!(Outcome::Parsed(vec![]).commands().is_none());
    }
}
