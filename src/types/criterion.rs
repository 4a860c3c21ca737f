//! Match criteria: one variant per `match` statement kind.

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumDiscriminants, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::traits::Normalize;

use super::values::{
    CodePoint, THREE_BIT_MAX, canonical_code_points, canonical_mac, canonical_set,
};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Interface numbers are declared as either `3` or `"0/1"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

/// A numbered or named access list. Exactly one of the two is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct AccessGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationSource {
    Cli,
    Cube,
    Msp,
    Nbar,
    Rfmd,
    Rsvp,
    Cac,
}

/// Application name with its optional metadata qualifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Application {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ApplicationSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One application metadata attribute; exactly one field is set per statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ApplicationAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcl: Option<String>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ApplicationGroup {
    TelepresenceGroup,
    VmwareGroup,
    WebexGroup,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CacStatus {
    Admitted,
    UnAdmitted,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Endpoint {
    Destination,
    Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ObjectGroupSecurity {
    pub endpoint: Endpoint,
    pub name: String,
}

/// Interface type (lowercased) and number, e.g. `gigabitethernet` / `0/1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct InputInterface {
    pub interface_type: String,
    #[serde(deserialize_with = "string_or_number")]
    pub interface_number: String,
}

/// `match dscp` applies to IPv4 and IPv6, `match ip dscp` to IPv4 only.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum IpVersions {
    #[serde(rename = "ipv4", alias = "IPv4")]
    Ipv4,
    #[default]
    #[serde(rename = "ipv4-and-ipv6")]
    Ipv4AndIpv6,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Dscp {
    pub dscp_values: Vec<CodePoint>,
    #[serde(default)]
    pub ip_versions: IpVersions,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct IpRtp {
    pub starting_port_number: u32,
    pub port_range: u32,
}

/// Call metadata; exactly one field is set per statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cac_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub called_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_party_session_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct PacketLength {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ProtocolAttribute {
    pub attribute_name: String,
    pub attribute_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct SubprotocolParameter {
    pub subprotocol_parameter_name: String,
    pub subprotocol_parameter_value: String,
}

/// An NBAR protocol, optionally narrowed by one sub-protocol parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Protocol {
    pub protocol_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subprotocol_parameter: Option<SubprotocolParameter>,
}

/// Security group tag; exactly one of the two is set per statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct SecurityGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_tag: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_tag: Option<u16>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Layer {
    L2,
    L3,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct StartValue {
    pub value: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct StartRange {
    pub lower_boundary: u32,
    pub upper_boundary: u32,
}

/// Arbitrary header offset match. Exactly one comparison operator is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Start {
    pub layer: Layer,
    pub offset: u8,
    pub size: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<StartValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neq: Option<StartValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<StartRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrafficCategory {
    Allow,
    Optimize,
}

/// The predicate of one `match` statement, keyed in the structured tree by
/// its snake_case kind, e.g. `{"cos": [1, 4, 6]}`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, EnumDiscriminants,
)]
#[serde(rename_all = "snake_case")]
#[strum_discriminants(name(CriterionKind))]
#[strum_discriminants(derive(Hash, Display, EnumString, AsRefStr, EnumIter))]
#[strum_discriminants(strum(serialize_all = "snake_case"))]
pub enum Criterion {
    AccessGroup(AccessGroup),
    Any(bool),
    Application(Application),
    ApplicationAttribute(ApplicationAttribute),
    ApplicationGroup(ApplicationGroup),
    ClassMap(String),
    CacStatus(CacStatus),
    Cos(Vec<u8>),
    CosInner(Vec<u8>),
    DestinationMacAddress(String),
    DiscardClass(u8),
    ObjectGroupSecurity(ObjectGroupSecurity),
    InputInterface(InputInterface),
    Dscp(Dscp),
    IpPrecedence(Vec<CodePoint>),
    IpRtp(IpRtp),
    Metadata(Metadata),
    MplsExperimentalTopmost(Vec<u8>),
    PacketLength(PacketLength),
    ProtocolAttribute(ProtocolAttribute),
    Protocol(Protocol),
    QosGroup(u8),
    SecurityGroup(SecurityGroup),
    SourceMacAddress(String),
    Start(Start),
    TrafficCategory(TrafficCategory),
    Vlan(u16),
    VlanInner(u16),
}

impl Criterion {
    pub fn kind(&self) -> CriterionKind {
        CriterionKind::from(self)
    }
}

impl Normalize for Criterion {
    fn normalize(&mut self) {
        match self {
            Criterion::Cos(values)
            | Criterion::CosInner(values)
            | Criterion::MplsExperimentalTopmost(values) => {
                *values = canonical_set(values, THREE_BIT_MAX)
            }
            Criterion::Dscp(dscp) => {
                dscp.dscp_values = canonical_code_points(&dscp.dscp_values, CodePoint::dscp)
            }
            Criterion::IpPrecedence(values) => {
                *values = canonical_code_points(values, CodePoint::precedence)
            }
            Criterion::DestinationMacAddress(mac) | Criterion::SourceMacAddress(mac) => {
                *mac = canonical_mac(mac)
            }
            Criterion::InputInterface(interface) => {
                interface.interface_type = interface.interface_type.trim().to_ascii_lowercase();
                interface.interface_number.normalize();
            }
            Criterion::AccessGroup(group) => group.name.normalize(),
            Criterion::Application(app) => {
                app.name.normalize();
                app.vendor.normalize();
                app.version.normalize();
            }
            Criterion::ApplicationAttribute(attr) => {
                for value in [
                    &mut attr.category,
                    &mut attr.device_class,
                    &mut attr.media_type,
                    &mut attr.sub_category,
                    &mut attr.tcl,
                ] {
                    value.normalize();
                }
            }
            Criterion::ClassMap(name) => name.normalize(),
            Criterion::Metadata(metadata) => {
                for value in [
                    &mut metadata.cac_status,
                    &mut metadata.called_uri,
                    &mut metadata.calling_uri,
                    &mut metadata.device_model,
                    &mut metadata.global_session_id,
                    &mut metadata.multi_party_session_id,
                ] {
                    value.normalize();
                }
            }
            Criterion::ObjectGroupSecurity(group) => group.name.normalize(),
            Criterion::ProtocolAttribute(attr) => {
                attr.attribute_name.normalize();
                attr.attribute_value.normalize();
            }
            // The quoted parameter value is kept as written.
            Criterion::Protocol(protocol) => {
                protocol.protocol_name.normalize();
                if let Some(parameter) = &mut protocol.subprotocol_parameter {
                    parameter.subprotocol_parameter_name.normalize();
                }
            }
            _ => {}
        }
    }
}

/// One `match [not] ...` statement of a class-map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Match {
    #[serde(flatten)]
    pub criterion: Criterion,
    #[serde(default, skip_serializing_if = "is_false")]
    pub negate: bool,
}

impl Match {
    pub fn new(criterion: Criterion) -> Self {
        Match {
            criterion,
            negate: false,
        }
    }

    /// The same criterion with the `not` modifier.
    pub fn negated(criterion: Criterion) -> Self {
        Match {
            criterion,
            negate: true,
        }
    }

    pub fn kind(&self) -> CriterionKind {
        self.criterion.kind()
    }
}

impl From<Criterion> for Match {
    fn from(criterion: Criterion) -> Self {
        Match::new(criterion)
    }
}

impl Normalize for Match {
    fn normalize(&mut self) {
        self.criterion.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_match_deserializes_flat_tagged_form() {
        let m: Match = serde_json::from_value(json!({"cos": [4, 1, 6], "negate": true})).unwrap();
        assert_eq!(m, Match::negated(Criterion::Cos(vec![4, 1, 6])));
    }

    #[test]
    fn test_match_negate_defaults_to_false() {
        let m: Match = serde_json::from_value(json!({"cac_status": "admitted"})).unwrap();
        assert_eq!(m, Match::new(Criterion::CacStatus(CacStatus::Admitted)));
    }

    #[test]
    fn test_match_serializes_without_false_negate() {
        let m = Match::new(Criterion::Vlan(100));
        assert_eq!(serde_json::to_value(&m).unwrap(), json!({"vlan": 100}));

        let m = Match::negated(Criterion::Any(true));
        assert_eq!(
            serde_json::to_value(&m).unwrap(),
            json!({"any": true, "negate": true})
        );
    }

    #[test]
    fn test_dscp_accepts_mixed_values() {
        let m: Match = serde_json::from_value(json!({
            "dscp": {"dscp_values": [21, "af32", "43"]},
            "negate": true
        }))
        .unwrap();
        let Criterion::Dscp(dscp) = &m.criterion else {
            panic!("expected dscp, got {:?}", m.criterion);
        };
        assert_eq!(dscp.ip_versions, IpVersions::Ipv4AndIpv6);
        assert_eq!(
            dscp.dscp_values,
            vec![CodePoint::Numeric(21), "af32".into(), "43".into()]
        );
    }

    #[test]
    fn test_ip_versions_accepts_legacy_spelling() {
        let dscp: Dscp =
            serde_json::from_value(json!({"dscp_values": [1], "ip_versions": "IPv4"})).unwrap();
        assert_eq!(dscp.ip_versions, IpVersions::Ipv4);
    }

    #[test]
    fn test_input_interface_number_from_int() {
        let m: Match = serde_json::from_value(json!({
            "input_interface": {"interface_type": "GigabitEthernet", "interface_number": 3}
        }))
        .unwrap();
        let m = m.normalized();
        assert_eq!(
            m.criterion,
            Criterion::InputInterface(InputInterface {
                interface_type: "gigabitethernet".to_string(),
                interface_number: "3".to_string(),
            })
        );
    }

    #[test]
    fn test_normalize_sorts_sets_and_canonicalizes_mac() {
        let cos = Criterion::Cos(vec![6, 4, 1, 4]).normalized();
        assert_eq!(cos, Criterion::Cos(vec![1, 4, 6]));

        let mac = Criterion::DestinationMacAddress("1234:5678:9aBc".into()).normalized();
        assert_eq!(mac, Criterion::DestinationMacAddress("1234.5678.9ABC".into()));

        let precedence =
            Criterion::IpPrecedence(vec!["critical".into(), CodePoint::Numeric(1)]).normalized();
        assert_eq!(
            precedence,
            Criterion::IpPrecedence(vec![CodePoint::Numeric(1), CodePoint::Numeric(5)])
        );
    }

    #[test]
    fn test_normalize_trims_free_form_values() {
        let attr = Criterion::ApplicationAttribute(ApplicationAttribute {
            media_type: Some(" audio".into()),
            ..Default::default()
        })
        .normalized();
        assert_eq!(
            attr,
            Criterion::ApplicationAttribute(ApplicationAttribute {
                media_type: Some("audio".into()),
                ..Default::default()
            })
        );

        let metadata = Criterion::Metadata(Metadata {
            device_model: Some("model-x  ".into()),
            ..Default::default()
        })
        .normalized();
        let Criterion::Metadata(metadata) = metadata else {
            panic!("expected metadata");
        };
        assert_eq!(metadata.device_model.as_deref(), Some("model-x"));

        let protocol = Criterion::Protocol(Protocol {
            protocol_name: " dns ".into(),
            subprotocol_parameter: None,
        })
        .normalized();
        assert_eq!(
            protocol,
            Criterion::Protocol(Protocol {
                protocol_name: "dns".into(),
                subprotocol_parameter: None,
            })
        );
    }

    #[test]
    fn test_negation_is_part_of_identity() {
        let plain = Match::new(Criterion::Cos(vec![1]));
        let negated = Match::negated(Criterion::Cos(vec![1]));
        assert_ne!(plain, negated);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Criterion::CosInner(vec![1]).kind().as_ref(), "cos_inner");
        assert_eq!(
            CriterionKind::from_str("mpls_experimental_topmost").unwrap(),
            CriterionKind::MplsExperimentalTopmost
        );
    }
}
