//! The class-map object.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::traits::Normalize;

use super::criterion::Match;
use super::header::{ClassType, MatchType};

/// A named classification object: header keywords, an optional description
/// and an ordered list of match statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassMap {
    pub name: String,
    /// `None` in a declared class-map means "keep whatever the device has";
    /// new class-maps default to `match-all`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_type: Option<ClassType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<Match>,
}

impl ClassMap {
    pub fn new(name: impl Into<String>) -> Self {
        ClassMap {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    pub fn with_class_type(mut self, class_type: ClassType) -> Self {
        self.class_type = Some(class_type);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a match statement, returning the updated value.
    pub fn with_match(mut self, m: impl Into<Match>) -> Self {
        self.matches.push(m.into());
        self
    }

    pub fn effective_match_type(&self) -> MatchType {
        self.match_type.unwrap_or_default()
    }

    pub fn effective_class_type(&self) -> ClassType {
        self.class_type.unwrap_or_default()
    }

    /// Whether `self`, as a desired class-map, asks for a different header
    /// type than `have` carries. IOS cannot change either in place.
    pub(crate) fn retypes(&self, have: &ClassMap) -> bool {
        let match_type = self
            .match_type
            .is_some_and(|t| t != have.effective_match_type());
        let class_type = self
            .class_type
            .is_some_and(|t| t != have.effective_class_type());
        match_type || class_type
    }

    /// Overlay the desired `want` onto `self`: declared scalar fields win,
    /// match statements are the union with the current ones first.
    pub(crate) fn overlay(&self, want: &ClassMap) -> ClassMap {
        let mut matches = self.matches.clone();
        for m in &want.matches {
            if !matches.contains(m) {
                matches.push(m.clone());
            }
        }

        ClassMap {
            name: want.name.clone(),
            match_type: want.match_type.or(self.match_type),
            class_type: want.class_type.or(self.class_type),
            description: want
                .description
                .clone()
                .or_else(|| self.description.clone()),
            matches,
        }
    }
}

impl Normalize for ClassMap {
    fn normalize(&mut self) {
        self.description.normalize();
        for m in &mut self.matches {
            m.normalize();
        }
    }
}
