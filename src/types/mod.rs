//! Data model for class-maps and reconciliation runs.
//!
//! Structured form (JSON), shared by declared input and parsed output:
//! - ClassMap: `{"name": "voice", "match_type": "match-any", "description": "...", "matches": [...]}`
//! - Match: `{"<kind>": <payload>, "negate": true}`, e.g. `{"cos": [1, 4, 6]}`
//!
//! Values are compared in their normalized form (sorted sets, numeric DSCP,
//! uppercase dotted MAC addresses), see [`crate::Normalize`].

mod class_map;
mod criterion;
mod header;
mod request;
mod state;
mod values;

pub use class_map::ClassMap;
pub use criterion::{
    AccessGroup, Application, ApplicationAttribute, ApplicationGroup, ApplicationSource,
    CacStatus, Criterion, CriterionKind, Dscp, Endpoint, InputInterface, IpRtp, IpVersions, Layer,
    Match, Metadata, ObjectGroupSecurity, PacketLength, Protocol, ProtocolAttribute,
    SecurityGroup, Start, StartRange, StartValue, SubprotocolParameter, TrafficCategory,
};
pub use header::{ClassType, MatchType};
pub use request::{Outcome, Request};
pub use state::State;
pub use values::{CodePoint, DSCP_MAX, THREE_BIT_MAX, canonical_mac};
pub(crate) use values::{canonical_code_points, canonical_set};
