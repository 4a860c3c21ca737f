//! Value canonicalization shared by the grammar and declared input.
//!
//! DSCP and IP precedence accept both numbers and mnemonics on the device.
//! Both sides of a comparison are reduced to numbers through the tables here,
//! so a declared `af31` equals a parsed `26`.

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Highest DSCP code point.
pub const DSCP_MAX: u8 = 63;

/// Highest value of the 3-bit fields (CoS, precedence, EXP, discard-class).
pub const THREE_BIT_MAX: u8 = 7;

static DSCP_VALUES: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    HashMap::from([
        ("default", 0),
        ("cs1", 8),
        ("af11", 10),
        ("af12", 12),
        ("af13", 14),
        ("cs2", 16),
        ("af21", 18),
        ("af22", 20),
        ("af23", 22),
        ("cs3", 24),
        ("af31", 26),
        ("af32", 28),
        ("af33", 30),
        ("cs4", 32),
        ("af41", 34),
        ("af42", 36),
        ("af43", 38),
        ("cs5", 40),
        ("ef", 46),
        ("cs6", 48),
        ("cs7", 56),
    ])
});

static PRECEDENCE_VALUES: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    HashMap::from([
        ("routine", 0),
        ("priority", 1),
        ("immediate", 2),
        ("flash", 3),
        ("flash-override", 4),
        ("critical", 5),
        ("internet", 6),
        ("network", 7),
    ])
});

/// A value that the device accepts either as a number or as a mnemonic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CodePoint {
    Numeric(u8),
    Named(String),
}

impl Display for CodePoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CodePoint::Numeric(n) => write!(f, "{n}"),
            CodePoint::Named(s) => write!(f, "{s}"),
        }
    }
}

impl From<u8> for CodePoint {
    fn from(value: u8) -> Self {
        CodePoint::Numeric(value)
    }
}

impl From<&str> for CodePoint {
    fn from(value: &str) -> Self {
        CodePoint::Named(value.to_string())
    }
}

impl CodePoint {
    fn resolve(&self, table: &HashMap<&'static str, u8>, max: u8) -> Option<u8> {
        let value = match self {
            CodePoint::Numeric(n) => Some(*n),
            CodePoint::Named(s) => {
                let s = s.trim().to_ascii_lowercase();
                table.get(s.as_str()).copied().or_else(|| s.parse().ok())
            }
        };
        value.filter(|v| *v <= max)
    }

    /// The numeric DSCP value, `None` for unknown mnemonics or values above 63.
    pub fn dscp(&self) -> Option<u8> {
        self.resolve(&DSCP_VALUES, DSCP_MAX)
    }

    /// The numeric IP precedence, `None` for unknown mnemonics or values above 7.
    pub fn precedence(&self) -> Option<u8> {
        self.resolve(&PRECEDENCE_VALUES, THREE_BIT_MAX)
    }
}

/// Deduplicate and sort ascending, dropping values above `max`.
pub(crate) fn canonical_set(values: &[u8], max: u8) -> Vec<u8> {
    values
        .iter()
        .copied()
        .filter(|v| *v <= max)
        .sorted()
        .dedup()
        .collect()
}

/// Reduce code points to their sorted numeric set, dropping anything the
/// resolver does not recognise.
pub(crate) fn canonical_code_points(
    values: &[CodePoint],
    resolve: impl Fn(&CodePoint) -> Option<u8>,
) -> Vec<CodePoint> {
    values
        .iter()
        .filter_map(resolve)
        .sorted()
        .dedup()
        .map(CodePoint::Numeric)
        .collect()
}

/// Canonical MAC address form: uppercase, `XXXX.XXXX.XXXX`.
///
/// Input with anything other than twelve hex digits is uppercased and its
/// `:`/`-` separators translated to `.`.
pub fn canonical_mac(mac: &str) -> String {
    let hex: String = mac.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    let separators_only = mac
        .chars()
        .all(|c| c.is_ascii_hexdigit() || matches!(c, ':' | '-' | '.'));

    if hex.len() == 12 && separators_only {
        let hex = hex.to_ascii_uppercase();
        format!("{}.{}.{}", &hex[0..4], &hex[4..8], &hex[8..12])
    } else {
        mac.trim().to_ascii_uppercase().replace([':', '-'], ".")
    }
}
