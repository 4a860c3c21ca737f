//! The transition a reconciliation run performs.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum State {
    /// Overlay the desired class-maps onto the running ones.
    #[default]
    Merged,
    /// Make each desired class-map exactly as declared, leave others alone.
    Replaced,
    /// Make the device hold exactly the desired class-maps.
    Overridden,
    /// Remove the named class-maps, or all of them when none are named.
    Deleted,
    /// Render the desired class-maps to commands without a device.
    Rendered,
    /// Parse running configuration text into structured class-maps.
    Parsed,
}

impl State {
    /// States that compare against a running configuration and produce
    /// commands to apply.
    pub fn is_apply(&self) -> bool {
        matches!(
            self,
            State::Merged | State::Replaced | State::Overridden | State::Deleted
        )
    }

    /// Whether class-maps absent from the desired set are destroyed.
    pub(crate) fn removes_unlisted(&self) -> bool {
        matches!(self, State::Overridden | State::Deleted)
    }

    /// The request field this state cannot run without.
    pub(crate) fn required_input(&self) -> Option<&'static str> {
        match self {
            State::Merged | State::Replaced | State::Overridden | State::Rendered => Some("config"),
            State::Parsed => Some("running_config"),
            State::Deleted => None,
        }
    }
}
