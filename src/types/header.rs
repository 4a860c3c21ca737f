//! Header keywords of a class-map block.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// How multiple match statements combine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum MatchType {
    /// A packet must match every statement.
    #[default]
    #[serde(rename = "match-all")]
    #[strum(serialize = "match-all")]
    All,
    /// A packet must match at least one statement.
    #[serde(rename = "match-any")]
    #[strum(serialize = "match-any")]
    Any,
}

/// The `type` keyword of a class-map header. `standard` is implied when the
/// header carries no `type` token.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ClassType {
    AccessControl,
    Appnav,
    Control,
    Inspect,
    MulticastFlows,
    SiteManager,
    Stack,
    #[default]
    Standard,
    Traffic,
}

impl ClassType {
    /// The `type <name>` header token, empty for `standard`.
    pub(crate) fn header_token(&self) -> Option<&str> {
        match self {
            ClassType::Standard => None,
            other => Some(other.as_ref()),
        }
    }
}
