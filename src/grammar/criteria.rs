//! `match` rules, one per criterion kind.
//!
//! More specific bodies come before the generic ones that share a keyword
//! (`application attribute` before `application`, `cos inner` before `cos`).

use std::str::FromStr;

use itertools::Itertools;
use regex::Captures;

use super::Rule;
use crate::types::{
    AccessGroup, Application, ApplicationAttribute, ApplicationGroup, ApplicationSource,
    CacStatus, CodePoint, Criterion, CriterionKind, Dscp, Endpoint, InputInterface, IpRtp,
    IpVersions, Layer, Metadata, ObjectGroupSecurity, PacketLength, Protocol, ProtocolAttribute,
    SecurityGroup, Start, StartRange, StartValue, SubprotocolParameter, THREE_BIT_MAX,
    TrafficCategory, canonical_code_points, canonical_set,
};

/// Positional values a set-valued statement carries at most.
pub const MAX_SET_VALUES: usize = 8;

const QOS_GROUP_MAX: u8 = 99;
const VLAN_RANGE: std::ops::RangeInclusive<u16> = 1..=4094;

pub(super) fn rules() -> Vec<Rule> {
    use CriterionKind as K;

    vec![
        Rule::criterion(
            "match access group",
            K::AccessGroup,
            r"access-group\s+(?:name\s+(?P<name>\S+)|(?P<number>\d+))",
            build_access_group,
            render_access_group,
        ),
        Rule::criterion("match any", K::Any, r"any", |_| Some(Criterion::Any(true)), render_any),
        Rule::criterion(
            "match application attribute",
            K::ApplicationAttribute,
            r"application\s+attribute\s+(?P<attribute>category|device-class|media-type|sub-category|tcl)\s+(?P<value>\S.*?)",
            build_application_attribute,
            render_application_attribute,
        ),
        Rule::criterion(
            "match application group",
            K::ApplicationGroup,
            r"application\s+application-group\s+(?P<group>\S+)",
            |caps| {
                ApplicationGroup::from_str(&caps["group"])
                    .ok()
                    .map(Criterion::ApplicationGroup)
            },
            render_application_group,
        ),
        Rule::criterion(
            "match application",
            K::Application,
            r"application\s+(?P<name>\S+)(?:\s+source\s+(?P<source>\S+))?(?:\s+vendor\s+(?P<vendor>\S+))?(?:\s+version\s+(?P<version>\S+))?",
            build_application,
            render_application,
        ),
        Rule::criterion(
            "match class-map",
            K::ClassMap,
            r"class-map\s+(?P<name>\S+)",
            |caps| Some(Criterion::ClassMap(caps["name"].to_string())),
            render_class_map,
        ),
        Rule::criterion(
            "match cac status",
            K::CacStatus,
            r"cac\s+status\s+(?P<status>\S+)",
            |caps| CacStatus::from_str(&caps["status"]).ok().map(Criterion::CacStatus),
            render_cac_status,
        ),
        Rule::criterion(
            "match cos inner",
            K::CosInner,
            &format!(r"cos\s+inner\s+{}", set_pattern(r"\d+")),
            |caps| three_bit_set(caps).map(Criterion::CosInner),
            render_three_bit_set,
        ),
        Rule::criterion(
            "match cos",
            K::Cos,
            &format!(r"cos\s+{}", set_pattern(r"\d+")),
            |caps| three_bit_set(caps).map(Criterion::Cos),
            render_three_bit_set,
        ),
        Rule::criterion(
            "match destination mac",
            K::DestinationMacAddress,
            r"destination-address\s+mac\s+(?P<mac>\S+)",
            |caps| Some(Criterion::DestinationMacAddress(caps["mac"].to_string())),
            render_mac,
        ),
        Rule::criterion(
            "match discard class",
            K::DiscardClass,
            r"discard-class\s+(?P<value>\d+)",
            |caps| {
                bounded(&caps["value"], THREE_BIT_MAX).map(Criterion::DiscardClass)
            },
            render_scalar,
        ),
        Rule::criterion(
            "match object-group security",
            K::ObjectGroupSecurity,
            r"group-object\s+security\s+(?P<endpoint>\S+)\s+(?P<name>\S+)",
            |caps| {
                Some(Criterion::ObjectGroupSecurity(ObjectGroupSecurity {
                    endpoint: Endpoint::from_str(&caps["endpoint"]).ok()?,
                    name: caps["name"].to_string(),
                }))
            },
            render_object_group_security,
        ),
        Rule::criterion(
            "match input-interface",
            K::InputInterface,
            r"input-interface\s+(?P<type>[A-Za-z][A-Za-z-]*?)\s*(?P<number>\d\S*)",
            |caps| {
                Some(Criterion::InputInterface(InputInterface {
                    interface_type: caps["type"].to_ascii_lowercase(),
                    interface_number: caps["number"].to_string(),
                }))
            },
            render_input_interface,
        ),
        Rule::criterion(
            "match dscp",
            K::Dscp,
            &format!(r"(?P<ip>ip\s+)?dscp\s+{}", set_pattern(r"\S+")),
            build_dscp,
            render_dscp,
        ),
        Rule::criterion(
            "match ip precedence",
            K::IpPrecedence,
            &format!(r"ip\s+precedence\s+{}", set_pattern(r"\S+")),
            |caps| {
                let values = canonical_code_points(&code_points(caps), CodePoint::precedence);
                non_empty(values).map(Criterion::IpPrecedence)
            },
            render_ip_precedence,
        ),
        Rule::criterion(
            "match ip rtp",
            K::IpRtp,
            r"ip\s+rtp\s+(?P<start>\d+)\s+(?P<range>\d+)",
            |caps| {
                Some(Criterion::IpRtp(IpRtp {
                    starting_port_number: caps["start"].parse().ok()?,
                    port_range: caps["range"].parse().ok()?,
                }))
            },
            render_ip_rtp,
        ),
        Rule::criterion(
            "match metadata",
            K::Metadata,
            r"metadata\s+(?P<key>cac\s+status|called-uri|calling-uri|device-model|global-session-id|multi-party-session-id)\s+(?P<value>\S+)",
            build_metadata,
            render_metadata,
        ),
        Rule::criterion(
            "match mpls experimental",
            K::MplsExperimentalTopmost,
            &format!(r"mpls\s+experimental\s+topmost\s+{}", set_pattern(r"\d+")),
            |caps| three_bit_set(caps).map(Criterion::MplsExperimentalTopmost),
            render_three_bit_set,
        ),
        Rule::criterion(
            "match packet length",
            K::PacketLength,
            r"packet\s+length(?:\s+min\s+(?P<min>\d+))?(?:\s+max\s+(?P<max>\d+))?",
            build_packet_length,
            render_packet_length,
        ),
        Rule::criterion(
            "match protocol attribute",
            K::ProtocolAttribute,
            r"protocol\s+attribute\s+(?P<name>\S+)\s+(?P<value>\S+)",
            |caps| {
                Some(Criterion::ProtocolAttribute(ProtocolAttribute {
                    attribute_name: caps["name"].to_string(),
                    attribute_value: caps["value"].to_string(),
                }))
            },
            render_protocol_attribute,
        ),
        Rule::criterion(
            "match protocol",
            K::Protocol,
            r#"protocol\s+(?P<name>\S+)(?:\s+(?P<parameter>\S+)\s+(?:"(?P<quoted>[^"]*)"|(?P<bare>\S+)))?"#,
            build_protocol,
            render_protocol,
        ),
        Rule::criterion(
            "match qos group",
            K::QosGroup,
            r"qos-group\s+(?P<value>\d+)",
            |caps| bounded(&caps["value"], QOS_GROUP_MAX).map(Criterion::QosGroup),
            render_scalar,
        ),
        Rule::criterion(
            "match security group",
            K::SecurityGroup,
            r"security-group\s+(?P<endpoint>source|destination)\s+tag\s+(?P<tag>\d+)",
            |caps| {
                let tag = caps["tag"].parse().ok()?;
                let mut group = SecurityGroup::default();
                match &caps["endpoint"] {
                    "source" => group.source_tag = Some(tag),
                    _ => group.destination_tag = Some(tag),
                }
                Some(Criterion::SecurityGroup(group))
            },
            render_security_group,
        ),
        Rule::criterion(
            "match source mac",
            K::SourceMacAddress,
            r"source-address\s+mac\s+(?P<mac>\S+)",
            |caps| Some(Criterion::SourceMacAddress(caps["mac"].to_string())),
            render_mac,
        ),
        Rule::criterion(
            "match start",
            K::Start,
            r#"start\s+(?P<layer>l2|l3)-start\s+offset\s+(?P<offset>\d+)\s+size\s+(?P<size>\d+)\s+(?:(?P<cmp>eq|neq)\s+(?P<value>\S+)(?:\s+mask\s+(?P<mask>\S+))?|gt\s+(?P<gt>\S+)|lt\s+(?P<lt>\S+)|range\s+(?P<lower>\S+)\s+(?P<upper>\S+)|regex\s+"?(?P<regex>[^"]*?)"?)"#,
            build_start,
            render_start,
        ),
        Rule::criterion(
            "match traffic category",
            K::TrafficCategory,
            r"traffic-category\s+(?P<category>\S+)",
            |caps| {
                TrafficCategory::from_str(&caps["category"])
                    .ok()
                    .map(Criterion::TrafficCategory)
            },
            render_traffic_category,
        ),
        Rule::criterion(
            "match vlan inner",
            K::VlanInner,
            r"vlan\s+inner\s+(?P<id>\d+)",
            |caps| vlan_id(caps).map(Criterion::VlanInner),
            render_vlan,
        ),
        Rule::criterion(
            "match vlan",
            K::Vlan,
            r"vlan\s+(?P<id>\d+)",
            |caps| vlan_id(caps).map(Criterion::Vlan),
            render_vlan,
        ),
    ]
}

/// `v0` required, `v1`..`v7` optional, each separated by whitespace.
fn set_pattern(value: &str) -> String {
    let mut pattern = format!(r"(?P<v0>{value})");
    for i in 1..MAX_SET_VALUES {
        pattern.push_str(&format!(r"(?:\s+(?P<v{i}>{value}))?"));
    }
    pattern
}

fn set_values<'h>(caps: &Captures<'h>) -> Vec<&'h str> {
    (0..MAX_SET_VALUES)
        .filter_map(|i| caps.name(&format!("v{i}")))
        .map(|m| m.as_str())
        .collect()
}

fn code_points(caps: &Captures) -> Vec<CodePoint> {
    set_values(caps).into_iter().map(CodePoint::from).collect()
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    (!values.is_empty()).then_some(values)
}

fn three_bit_set(caps: &Captures) -> Option<Vec<u8>> {
    let values: Vec<u8> = set_values(caps)
        .into_iter()
        .filter_map(|v| v.parse().ok())
        .collect();
    non_empty(canonical_set(&values, THREE_BIT_MAX))
}

fn bounded(text: &str, max: u8) -> Option<u8> {
    text.parse().ok().filter(|v| *v <= max)
}

fn vlan_id(caps: &Captures) -> Option<u16> {
    caps["id"].parse().ok().filter(|v| VLAN_RANGE.contains(v))
}

/// Decimal or `0x` prefixed hexadecimal.
fn number(text: &str) -> Option<u32> {
    match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn opt(caps: &Captures, name: &str) -> Option<String> {
    caps.name(name).map(|m| m.as_str().to_string())
}

fn build_access_group(caps: &Captures) -> Option<Criterion> {
    let number = match caps.name("number") {
        Some(n) => Some(n.as_str().parse().ok()?),
        None => None,
    };
    Some(Criterion::AccessGroup(AccessGroup {
        number,
        name: opt(caps, "name"),
    }))
}

fn build_application(caps: &Captures) -> Option<Criterion> {
    let source = match caps.name("source") {
        Some(s) => Some(ApplicationSource::from_str(s.as_str()).ok()?),
        None => None,
    };
    Some(Criterion::Application(Application {
        name: caps["name"].to_string(),
        source,
        vendor: opt(caps, "vendor"),
        version: opt(caps, "version"),
    }))
}

fn build_application_attribute(caps: &Captures) -> Option<Criterion> {
    let value = Some(caps["value"].to_string());
    let mut attribute = ApplicationAttribute::default();
    match &caps["attribute"] {
        "category" => attribute.category = value,
        "device-class" => attribute.device_class = value,
        "media-type" => attribute.media_type = value,
        "sub-category" => attribute.sub_category = value,
        _ => attribute.tcl = value,
    }
    Some(Criterion::ApplicationAttribute(attribute))
}

fn build_dscp(caps: &Captures) -> Option<Criterion> {
    let dscp_values = non_empty(canonical_code_points(&code_points(caps), CodePoint::dscp))?;
    let ip_versions = if caps.name("ip").is_some() {
        IpVersions::Ipv4
    } else {
        IpVersions::Ipv4AndIpv6
    };
    Some(Criterion::Dscp(Dscp {
        dscp_values,
        ip_versions,
    }))
}

fn build_metadata(caps: &Captures) -> Option<Criterion> {
    let value = Some(caps["value"].to_string());
    let key = caps["key"].split_whitespace().join("-");
    let mut metadata = Metadata::default();
    match key.as_str() {
        "cac-status" => metadata.cac_status = value,
        "called-uri" => metadata.called_uri = value,
        "calling-uri" => metadata.calling_uri = value,
        "device-model" => metadata.device_model = value,
        "global-session-id" => metadata.global_session_id = value,
        _ => metadata.multi_party_session_id = value,
    }
    Some(Criterion::Metadata(metadata))
}

fn build_packet_length(caps: &Captures) -> Option<Criterion> {
    let parse = |name: &str| -> Option<Option<u16>> {
        match caps.name(name) {
            Some(v) => v.as_str().parse().ok().map(Some),
            None => Some(None),
        }
    };
    let length = PacketLength {
        min: parse("min")?,
        max: parse("max")?,
    };
    if length.min.is_none() && length.max.is_none() {
        return None;
    }
    Some(Criterion::PacketLength(length))
}

fn build_protocol(caps: &Captures) -> Option<Criterion> {
    let subprotocol_parameter = caps.name("parameter").and_then(|name| {
        let value = caps.name("quoted").or_else(|| caps.name("bare"))?;
        Some(SubprotocolParameter {
            subprotocol_parameter_name: name.as_str().to_string(),
            subprotocol_parameter_value: value.as_str().to_string(),
        })
    });
    Some(Criterion::Protocol(Protocol {
        protocol_name: caps["name"].to_string(),
        subprotocol_parameter,
    }))
}

fn build_start(caps: &Captures) -> Option<Criterion> {
    let mut start = Start {
        layer: Layer::from_str(&caps["layer"]).ok()?,
        offset: caps["offset"].parse().ok()?,
        size: caps["size"].parse().ok()?,
        eq: None,
        neq: None,
        gt: None,
        lt: None,
        range: None,
        regex: None,
    };
    if let Some(cmp) = caps.name("cmp") {
        let mask = match caps.name("mask") {
            Some(m) => Some(number(m.as_str())?),
            None => None,
        };
        let value = Some(StartValue {
            value: number(&caps["value"])?,
            mask,
        });
        match cmp.as_str() {
            "eq" => start.eq = value,
            _ => start.neq = value,
        }
    } else if let Some(gt) = caps.name("gt") {
        start.gt = Some(number(gt.as_str())?);
    } else if let Some(lt) = caps.name("lt") {
        start.lt = Some(number(lt.as_str())?);
    } else if let Some(lower) = caps.name("lower") {
        start.range = Some(StartRange {
            lower_boundary: number(lower.as_str())?,
            upper_boundary: number(&caps["upper"])?,
        });
    } else {
        start.regex = Some(opt(caps, "regex").filter(|r| !r.is_empty())?);
    }
    Some(Criterion::Start(start))
}

fn unexpected(criterion: &Criterion) -> String {
    format!("unexpected criterion {}", criterion.kind())
}

/// The single present value of a group whose members exclude each other.
fn exactly_one(
    what: &str,
    candidates: impl IntoIterator<Item = Option<String>>,
) -> Result<String, String> {
    let mut present = candidates.into_iter().flatten();
    match (present.next(), present.next()) {
        (Some(one), None) => Ok(one),
        (None, _) => Err(format!("{what} requires exactly one value, none given")),
        (Some(_), Some(_)) => Err(format!("{what} values are mutually exclusive")),
    }
}

fn required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(())
    }
}

fn labelled(label: &str, value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| format!("{label} {v}"))
}

fn render_access_group(criterion: &Criterion) -> Result<String, String> {
    let Criterion::AccessGroup(group) = criterion else {
        return Err(unexpected(criterion));
    };
    let target = exactly_one(
        "access-group",
        [
            group.number.map(|n| n.to_string()),
            labelled("name", &group.name),
        ],
    )?;
    Ok(format!("access-group {target}"))
}

fn render_any(criterion: &Criterion) -> Result<String, String> {
    match criterion {
        Criterion::Any(true) => Ok("any".to_string()),
        Criterion::Any(false) => Err("any must be true to be rendered".to_string()),
        other => Err(unexpected(other)),
    }
}

fn render_application(criterion: &Criterion) -> Result<String, String> {
    let Criterion::Application(app) = criterion else {
        return Err(unexpected(criterion));
    };
    required("application name", &app.name)?;
    let mut line = format!("application {}", app.name);
    if let Some(source) = app.source {
        line.push_str(&format!(" source {source}"));
    }
    for part in [
        labelled("vendor", &app.vendor),
        labelled("version", &app.version),
    ]
    .into_iter()
    .flatten()
    {
        line.push(' ');
        line.push_str(&part);
    }
    Ok(line)
}

fn render_application_attribute(criterion: &Criterion) -> Result<String, String> {
    let Criterion::ApplicationAttribute(attr) = criterion else {
        return Err(unexpected(criterion));
    };
    let attribute = exactly_one(
        "application attribute",
        [
            labelled("category", &attr.category),
            labelled("device-class", &attr.device_class),
            labelled("media-type", &attr.media_type),
            labelled("sub-category", &attr.sub_category),
            labelled("tcl", &attr.tcl),
        ],
    )?;
    Ok(format!("application attribute {attribute}"))
}

fn render_application_group(criterion: &Criterion) -> Result<String, String> {
    match criterion {
        Criterion::ApplicationGroup(group) => {
            Ok(format!("application application-group {group}"))
        }
        other => Err(unexpected(other)),
    }
}

fn render_class_map(criterion: &Criterion) -> Result<String, String> {
    let Criterion::ClassMap(name) = criterion else {
        return Err(unexpected(criterion));
    };
    required("class-map name", name)?;
    Ok(format!("class-map {name}"))
}

fn render_cac_status(criterion: &Criterion) -> Result<String, String> {
    match criterion {
        Criterion::CacStatus(status) => Ok(format!("cac status {status}")),
        other => Err(unexpected(other)),
    }
}

/// `keyword` followed by the canonical set, within what one line can carry.
fn join_set<T: std::fmt::Display>(keyword: &str, values: &[T]) -> Result<String, String> {
    match values.len() {
        0 => Err(format!("{keyword} requires at least one valid value")),
        n if n > MAX_SET_VALUES => Err(format!(
            "{keyword} takes at most {MAX_SET_VALUES} values, {n} given"
        )),
        _ => Ok(format!("{keyword} {}", values.iter().join(" "))),
    }
}

fn within(keyword: &str, value: u8, max: u8) -> Result<(), String> {
    if value > max {
        Err(format!("{keyword} {value} is out of range 0-{max}"))
    } else {
        Ok(())
    }
}

fn render_three_bit_set(criterion: &Criterion) -> Result<String, String> {
    let (keyword, values) = match criterion {
        Criterion::Cos(v) => ("cos", v),
        Criterion::CosInner(v) => ("cos inner", v),
        Criterion::MplsExperimentalTopmost(v) => ("mpls experimental topmost", v),
        other => return Err(unexpected(other)),
    };
    join_set(keyword, &canonical_set(values, THREE_BIT_MAX))
}

fn render_mac(criterion: &Criterion) -> Result<String, String> {
    let (keyword, mac) = match criterion {
        Criterion::DestinationMacAddress(mac) => ("destination-address mac", mac),
        Criterion::SourceMacAddress(mac) => ("source-address mac", mac),
        other => return Err(unexpected(other)),
    };
    required("mac address", mac)?;
    Ok(format!("{keyword} {mac}"))
}

fn render_scalar(criterion: &Criterion) -> Result<String, String> {
    match criterion {
        Criterion::DiscardClass(v) => {
            within("discard-class", *v, THREE_BIT_MAX)?;
            Ok(format!("discard-class {v}"))
        }
        Criterion::QosGroup(v) => {
            within("qos-group", *v, QOS_GROUP_MAX)?;
            Ok(format!("qos-group {v}"))
        }
        other => Err(unexpected(other)),
    }
}

fn render_object_group_security(criterion: &Criterion) -> Result<String, String> {
    let Criterion::ObjectGroupSecurity(group) = criterion else {
        return Err(unexpected(criterion));
    };
    required("object-group name", &group.name)?;
    Ok(format!(
        "group-object security {} {}",
        group.endpoint, group.name
    ))
}

fn render_input_interface(criterion: &Criterion) -> Result<String, String> {
    let Criterion::InputInterface(interface) = criterion else {
        return Err(unexpected(criterion));
    };
    required("interface type", &interface.interface_type)?;
    required("interface number", &interface.interface_number)?;
    Ok(format!(
        "input-interface {}{}",
        interface.interface_type, interface.interface_number
    ))
}

fn render_dscp(criterion: &Criterion) -> Result<String, String> {
    let Criterion::Dscp(dscp) = criterion else {
        return Err(unexpected(criterion));
    };
    let keyword = match dscp.ip_versions {
        IpVersions::Ipv4 => "ip dscp",
        IpVersions::Ipv4AndIpv6 => "dscp",
    };
    join_set(
        keyword,
        &canonical_code_points(&dscp.dscp_values, CodePoint::dscp),
    )
}

fn render_ip_precedence(criterion: &Criterion) -> Result<String, String> {
    let Criterion::IpPrecedence(values) = criterion else {
        return Err(unexpected(criterion));
    };
    join_set(
        "ip precedence",
        &canonical_code_points(values, CodePoint::precedence),
    )
}

fn render_ip_rtp(criterion: &Criterion) -> Result<String, String> {
    match criterion {
        Criterion::IpRtp(rtp) => Ok(format!(
            "ip rtp {} {}",
            rtp.starting_port_number, rtp.port_range
        )),
        other => Err(unexpected(other)),
    }
}

fn render_metadata(criterion: &Criterion) -> Result<String, String> {
    let Criterion::Metadata(metadata) = criterion else {
        return Err(unexpected(criterion));
    };
    let entry = exactly_one(
        "metadata",
        [
            labelled("cac status", &metadata.cac_status),
            labelled("called-uri", &metadata.called_uri),
            labelled("calling-uri", &metadata.calling_uri),
            labelled("device-model", &metadata.device_model),
            labelled("global-session-id", &metadata.global_session_id),
            labelled("multi-party-session-id", &metadata.multi_party_session_id),
        ],
    )?;
    Ok(format!("metadata {entry}"))
}

fn render_packet_length(criterion: &Criterion) -> Result<String, String> {
    let Criterion::PacketLength(length) = criterion else {
        return Err(unexpected(criterion));
    };
    if length.min.is_none() && length.max.is_none() {
        return Err("packet length requires min or max".to_string());
    }
    let mut line = "packet length".to_string();
    if let Some(min) = length.min {
        line.push_str(&format!(" min {min}"));
    }
    if let Some(max) = length.max {
        line.push_str(&format!(" max {max}"));
    }
    Ok(line)
}

fn render_protocol_attribute(criterion: &Criterion) -> Result<String, String> {
    let Criterion::ProtocolAttribute(attr) = criterion else {
        return Err(unexpected(criterion));
    };
    required("attribute name", &attr.attribute_name)?;
    required("attribute value", &attr.attribute_value)?;
    Ok(format!(
        "protocol attribute {} {}",
        attr.attribute_name, attr.attribute_value
    ))
}

fn render_protocol(criterion: &Criterion) -> Result<String, String> {
    let Criterion::Protocol(protocol) = criterion else {
        return Err(unexpected(criterion));
    };
    required("protocol name", &protocol.protocol_name)?;
    Ok(match &protocol.subprotocol_parameter {
        Some(p) => format!(
            "protocol {} {} \"{}\"",
            protocol.protocol_name, p.subprotocol_parameter_name, p.subprotocol_parameter_value
        ),
        None => format!("protocol {}", protocol.protocol_name),
    })
}

fn render_security_group(criterion: &Criterion) -> Result<String, String> {
    let Criterion::SecurityGroup(group) = criterion else {
        return Err(unexpected(criterion));
    };
    let tag = exactly_one(
        "security-group",
        [
            group.source_tag.map(|t| format!("source tag {t}")),
            group.destination_tag.map(|t| format!("destination tag {t}")),
        ],
    )?;
    Ok(format!("security-group {tag}"))
}

fn render_start(criterion: &Criterion) -> Result<String, String> {
    let Criterion::Start(start) = criterion else {
        return Err(unexpected(criterion));
    };
    let compare = |op: &str, v: &StartValue| match v.mask {
        Some(mask) => format!("{op} {} mask {mask}", v.value),
        None => format!("{op} {}", v.value),
    };
    let operator = exactly_one(
        "start operator",
        [
            start.eq.as_ref().map(|v| compare("eq", v)),
            start.neq.as_ref().map(|v| compare("neq", v)),
            start.gt.map(|v| format!("gt {v}")),
            start.lt.map(|v| format!("lt {v}")),
            start
                .range
                .as_ref()
                .map(|r| format!("range {} {}", r.lower_boundary, r.upper_boundary)),
            start.regex.as_ref().map(|r| format!("regex \"{r}\"")),
        ],
    )?;
    Ok(format!(
        "start {}-start offset {} size {} {operator}",
        start.layer, start.offset, start.size
    ))
}

fn render_traffic_category(criterion: &Criterion) -> Result<String, String> {
    match criterion {
        Criterion::TrafficCategory(category) => Ok(format!("traffic-category {category}")),
        other => Err(unexpected(other)),
    }
}

fn render_vlan(criterion: &Criterion) -> Result<String, String> {
    let (keyword, id) = match criterion {
        Criterion::Vlan(id) => ("vlan", id),
        Criterion::VlanInner(id) => ("vlan inner", id),
        other => return Err(unexpected(other)),
    };
    if !VLAN_RANGE.contains(id) {
        return Err(format!(
            "{keyword} {id} is out of range {}-{}",
            VLAN_RANGE.start(),
            VLAN_RANGE.end()
        ));
    }
    Ok(format!("{keyword} {id}"))
}

#[cfg(test)]
mod tests {
    use super::super::{Fragment, LineMatch, match_line, render_match};
    use super::*;
    use crate::types::Match;
    use yare::parameterized;

    fn parse_match(line: &str) -> Match {
        match match_line(line) {
            LineMatch::Matched {
                fragment: Fragment::Match(m),
                ..
            } => m,
            other => panic!("expected a match criterion for {line:?}, got {other:?}"),
        }
    }

    #[parameterized(
        access_group_number = { " match access-group 1000", "match access-group 1000" },
        access_group_name = { " match access-group name test_acl", "match access-group name test_acl" },
        any = { " match any", "match any" },
        application = { " match application citrix source cli", "match application citrix source cli" },
        application_full = { " match not application webex vendor cisco version 2", "match not application webex vendor cisco version 2" },
        application_attribute = { " match application attribute media-type audio-video", "match application attribute media-type audio-video" },
        application_group = { " match application application-group telepresence-group", "match application application-group telepresence-group" },
        class_map = { " match class-map test-class-map1", "match class-map test-class-map1" },
        cac_status = { " match cac status un-admitted", "match cac status un-admitted" },
        cos = { " match not cos 6 1 4", "match not cos 1 4 6" },
        cos_inner = { " match cos inner 7 6 5 4 3 2 1", "match cos inner 1 2 3 4 5 6 7" },
        destination_mac = { " match not destination-address mac 1234.5678.9abc", "match not destination-address mac 1234.5678.9ABC" },
        discard_class = { " match discard-class 0", "match discard-class 0" },
        object_group = { " match group-object security source grp1", "match group-object security source grp1" },
        input_interface = { " match input-interface GigabitEthernet3", "match input-interface gigabitethernet3" },
        input_interface_spaced = { " match input-interface GigabitEthernet 0/1", "match input-interface gigabitethernet0/1" },
        dscp = { " match dscp default  cs1  af31  cs7  60", "match dscp 0 8 26 56 60" },
        ip_dscp = { " match ip dscp default  7  af11  af23  af41  43  63", "match ip dscp 0 7 10 22 34 43 63" },
        ip_precedence = { " match ip precedence critical 1", "match ip precedence 1 5" },
        ip_rtp = { " match ip rtp 3000 1000", "match ip rtp 3000 1000" },
        metadata_called = { " match not metadata called-uri this_is_a_test_uri.test", "match not metadata called-uri this_is_a_test_uri.test" },
        metadata_cac = { " match metadata cac status admitted", "match metadata cac status admitted" },
        mpls = { " match mpls experimental topmost 0  1  2  3  4", "match mpls experimental topmost 0 1 2 3 4" },
        packet_length = { " match packet length min 100 max 1000", "match packet length min 100 max 1000" },
        packet_length_max = { " match packet length max 1500", "match packet length max 1500" },
        protocol_attribute = { " match protocol attribute category consumer-internet", "match protocol attribute category consumer-internet" },
        protocol = { " match not protocol dns", "match not protocol dns" },
        protocol_parameter = { r#" match protocol http server "example-server.com""#, r#"match protocol http server "example-server.com""# },
        qos_group = { " match qos-group 70", "match qos-group 70" },
        security_group = { " match security-group destination tag 100", "match security-group destination tag 100" },
        source_mac = { " match source-address mac abcd.1243.87bf", "match source-address mac ABCD.1243.87BF" },
        start_eq = { " match start l2-start offset 10 size 2 eq 0x0800 mask 255", "match start l2-start offset 10 size 2 eq 2048 mask 255" },
        start_range = { " match start l3-start offset 0 size 4 range 10 20", "match start l3-start offset 0 size 4 range 10 20" },
        start_regex = { r#" match start l3-start offset 2 size 8 regex "^GET""#, r#"match start l3-start offset 2 size 8 regex "^GET""# },
        traffic_category = { " match traffic-category optimize", "match traffic-category optimize" },
        vlan = { " match vlan  100", "match vlan 100" },
        vlan_inner = { " match vlan inner  20", "match vlan inner 20" },
    )]
    fn test_parse_then_render(line: &str, rendered: &str) {
        let m = parse_match(line);
        assert_eq!(render_match(&m).unwrap(), rendered);
        assert_eq!(parse_match(rendered), m);
    }

    #[parameterized(
        unknown_group = { " match application application-group foo-group" },
        unknown_cac = { " match cac status pending" },
        unknown_endpoint = { " match group-object security both grp" },
        cos_out_of_range = { " match cos 9" },
        discard_out_of_range = { " match discard-class 8" },
        qos_out_of_range = { " match qos-group 100" },
        vlan_zero = { " match vlan 0" },
        vlan_too_big = { " match vlan 4095" },
        precedence_unknown = { " match ip precedence urgent" },
        unknown_source = { " match application citrix source ldap" },
    )]
    fn test_invalid_value_is_rejected(line: &str) {
        assert!(
            matches!(match_line(line), LineMatch::Rejected { shared: false, .. }),
            "{line:?} should be rejected"
        );
    }

    #[parameterized(
        discard_class = { Criterion::DiscardClass(9), "discard-class 9 is out of range 0-7" },
        qos_group = { Criterion::QosGroup(150), "qos-group 150 is out of range 0-99" },
        vlan = { Criterion::Vlan(5000), "vlan 5000 is out of range 1-4094" },
        vlan_zero = { Criterion::Vlan(0), "vlan 0 is out of range 1-4094" },
        vlan_inner = { Criterion::VlanInner(4095), "vlan inner 4095 is out of range 1-4094" },
    )]
    fn test_render_rejects_what_parsing_rejects(criterion: Criterion, reason: &str) {
        let m = Match::new(criterion);
        match render_match(&m) {
            Err(crate::error::ClassMapError::RenderError { reason: got, .. }) => {
                assert_eq!(got, reason)
            }
            other => panic!("expected a render error, got {other:?}"),
        }
    }

    #[test]
    fn test_render_bounds_are_inclusive() {
        assert_eq!(
            render_match(&Match::new(Criterion::DiscardClass(7))).unwrap(),
            "match discard-class 7"
        );
        assert_eq!(
            render_match(&Match::new(Criterion::QosGroup(99))).unwrap(),
            "match qos-group 99"
        );
        assert_eq!(
            render_match(&Match::new(Criterion::VlanInner(4094))).unwrap(),
            "match vlan inner 4094"
        );
    }

    #[test]
    fn test_specific_rules_win_over_generic_ones() {
        let m = parse_match(" match application attribute category voice");
        assert_eq!(m.kind(), CriterionKind::ApplicationAttribute);
        let m = parse_match(" match protocol attribute category voice");
        assert_eq!(m.kind(), CriterionKind::ProtocolAttribute);
        let m = parse_match(" match cos inner 3");
        assert_eq!(m.kind(), CriterionKind::CosInner);
    }

    #[test]
    fn test_set_values_beyond_limit_do_not_match() {
        assert!(matches!(
            match_line(" match dscp 1 2 3 4 5 6 7 8 9"),
            LineMatch::Unmatched
        ));
    }

    #[test]
    fn test_render_refuses_sets_beyond_limit() {
        let dscp = Criterion::Dscp(Dscp {
            dscp_values: (1..=9u8).map(CodePoint::Numeric).collect(),
            ip_versions: IpVersions::Ipv4AndIpv6,
        });
        assert_eq!(
            render_dscp(&dscp).unwrap_err(),
            "dscp takes at most 8 values, 9 given"
        );

        let precedence = Criterion::IpPrecedence((0..=7u8).map(CodePoint::Numeric).collect());
        assert_eq!(
            render_ip_precedence(&precedence).unwrap(),
            "ip precedence 0 1 2 3 4 5 6 7"
        );
        let rendered = format!("match {}", render_ip_precedence(&precedence).unwrap());
        assert_eq!(parse_match(&rendered), Match::new(precedence));
    }

    #[test]
    fn test_render_mutually_exclusive_groups() {
        let both = Criterion::AccessGroup(AccessGroup {
            number: Some(1),
            name: Some("acl".into()),
        });
        assert!(render_access_group(&both).unwrap_err().contains("mutually exclusive"));

        let neither = Criterion::SecurityGroup(SecurityGroup::default());
        assert!(render_security_group(&neither).unwrap_err().contains("none given"));

        let attr = Criterion::ApplicationAttribute(ApplicationAttribute::default());
        assert!(render_application_attribute(&attr).is_err());

        let metadata = Criterion::Metadata(Metadata {
            called_uri: Some("a".into()),
            device_model: Some("b".into()),
            ..Default::default()
        });
        assert!(render_metadata(&metadata).is_err());
    }

    #[test]
    fn test_render_empty_sets_fail() {
        assert!(render_three_bit_set(&Criterion::Cos(vec![])).is_err());
        assert!(render_three_bit_set(&Criterion::Cos(vec![8])).is_err());
        assert!(
            render_dscp(&Criterion::Dscp(Dscp {
                dscp_values: vec!["bogus".into()],
                ip_versions: IpVersions::Ipv4,
            }))
            .is_err()
        );
        assert!(render_any(&Criterion::Any(false)).is_err());
    }

    #[test]
    fn test_render_sorts_unnormalized_sets() {
        assert_eq!(
            render_three_bit_set(&Criterion::Cos(vec![6, 1, 4, 1])).unwrap(),
            "cos 1 4 6"
        );
        assert_eq!(
            render_dscp(&Criterion::Dscp(Dscp {
                dscp_values: vec![21.into(), "af32".into(), "43".into(), "ef".into()],
                ip_versions: IpVersions::Ipv4AndIpv6,
            }))
            .unwrap(),
            "dscp 21 28 43 46"
        );
    }

    #[test]
    fn test_start_requires_one_operator() {
        let start = Start {
            layer: Layer::L2,
            offset: 0,
            size: 2,
            eq: None,
            neq: None,
            gt: Some(5),
            lt: Some(9),
            range: None,
            regex: None,
        };
        assert!(render_start(&Criterion::Start(start)).is_err());
    }

    #[test]
    fn test_number_accepts_hex() {
        assert_eq!(number("0x0800"), Some(2048));
        assert_eq!(number("17"), Some(17));
        assert_eq!(number("zz"), None);
    }
}
