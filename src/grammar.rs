//! The line grammar for `show running-config partition class-map` output.
//!
//! An ordered table of rules. Each rule owns a line-anchored regex with named
//! groups, a builder that turns captures into a [`Fragment`] and the inverse
//! renderer. The `class-map` header rule is shared: the name it captures is
//! the context for every following line until the next header.
//!
//! The table is built once and only read afterwards.

mod criteria;

use std::collections::HashMap;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ClassMapError;
use crate::traits::Normalize;
use crate::types::{ClassMap, ClassType, Criterion, CriterionKind, Match, MatchType};

/// Name of the shared header rule.
pub const HEADER_RULE: &str = "class-map";

/// Name of the description rule.
pub const DESCRIPTION_RULE: &str = "description";

/// A structured piece of one configuration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Header {
        name: String,
        match_type: MatchType,
        class_type: ClassType,
    },
    Description(String),
    Match(Match),
}

impl Fragment {
    /// The header line of `class_map`, with `match-all`/`standard` filled in
    /// where the class-map leaves them open.
    pub fn header(class_map: &ClassMap) -> Self {
        Fragment::Header {
            name: class_map.name.clone(),
            match_type: class_map.effective_match_type(),
            class_type: class_map.effective_class_type(),
        }
    }
}

/// How a rule turns captures into a fragment and back.
pub(crate) enum Syntax {
    Header,
    Description,
    Criterion {
        kind: CriterionKind,
        build: fn(&Captures) -> Option<Criterion>,
        render: fn(&Criterion) -> Result<String, String>,
    },
}

pub struct Rule {
    pub name: &'static str,
    regex: Regex,
    syntax: Syntax,
}

pub(crate) const MATCH_PREFIX: &str = r"^\s*match(?:\s+(?P<negate>not))?\s+";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid grammar pattern {pattern:?}: {e}"))
}

impl Rule {
    fn header() -> Self {
        Rule {
            name: HEADER_RULE,
            regex: compile(
                r"^\s*class-map(?:\s+type\s+(?P<class_type>\S+))?(?:\s+(?P<match_type>match-all|match-any))?\s+(?P<name>\S+)\s*$",
            ),
            syntax: Syntax::Header,
        }
    }

    fn description() -> Self {
        Rule {
            name: DESCRIPTION_RULE,
            regex: compile(r"^\s*description\s+(?P<description>.*\S)\s*$"),
            syntax: Syntax::Description,
        }
    }

    /// A `match [not] <body>` rule.
    pub(crate) fn criterion(
        name: &'static str,
        kind: CriterionKind,
        body: &str,
        build: fn(&Captures) -> Option<Criterion>,
        render: fn(&Criterion) -> Result<String, String>,
    ) -> Self {
        Rule {
            name,
            regex: compile(&format!(r"{MATCH_PREFIX}{body}\s*$")),
            syntax: Syntax::Criterion {
                kind,
                build,
                render,
            },
        }
    }

    /// Whether a match of this rule opens a new object context.
    pub fn is_shared(&self) -> bool {
        matches!(self.syntax, Syntax::Header)
    }

    pub fn kind(&self) -> Option<CriterionKind> {
        match self.syntax {
            Syntax::Criterion { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Build the fragment for `caps`. `None` means the line had this rule's
    /// shape but carried a value outside its lookup table.
    fn build(&self, caps: &Captures) -> Option<Fragment> {
        match &self.syntax {
            Syntax::Header => {
                let class_type = match caps.name("class_type") {
                    Some(t) => ClassType::from_str(t.as_str()).ok()?,
                    None => ClassType::Standard,
                };
                let match_type = match caps.name("match_type") {
                    Some(t) => MatchType::from_str(t.as_str()).ok()?,
                    None => MatchType::All,
                };
                Some(Fragment::Header {
                    name: caps["name"].to_string(),
                    match_type,
                    class_type,
                })
            }
            Syntax::Description => Some(Fragment::Description(caps["description"].to_string())),
            Syntax::Criterion { build, .. } => {
                let criterion = build(caps)?.normalized();
                Some(Fragment::Match(Match {
                    criterion,
                    negate: caps.name("negate").is_some(),
                }))
            }
        }
    }

    /// Render `fragment` as the exact command line this rule parses.
    pub fn render(&self, fragment: &Fragment) -> Result<String, ClassMapError> {
        match (&self.syntax, fragment) {
            (
                Syntax::Header,
                Fragment::Header {
                    name,
                    match_type,
                    class_type,
                },
            ) => {
                if name.trim().is_empty() {
                    return Err(ClassMapError::render(self.name, "name is required"));
                }
                Ok(match class_type.header_token() {
                    Some(t) => format!("class-map type {t} {match_type} {name}"),
                    None => format!("class-map {match_type} {name}"),
                })
            }
            (Syntax::Description, Fragment::Description(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(ClassMapError::render(self.name, "description is empty"));
                }
                Ok(format!("description {text}"))
            }
            (Syntax::Criterion { kind, render, .. }, Fragment::Match(m)) if m.kind() == *kind => {
                let body = render(&m.criterion).map_err(|r| ClassMapError::render(self.name, r))?;
                Ok(if m.negate {
                    format!("match not {body}")
                } else {
                    format!("match {body}")
                })
            }
            _ => Err(ClassMapError::render(
                self.name,
                format!("fragment {fragment:?} does not belong to this rule"),
            )),
        }
    }
}

/// The outcome of offering one line to the grammar.
#[derive(Debug)]
pub enum LineMatch {
    Matched {
        rule: &'static str,
        shared: bool,
        fragment: Fragment,
    },
    /// A rule consumed the line but a value failed its lookup.
    Rejected { rule: &'static str, shared: bool },
    Unmatched,
}

static GRAMMAR: Lazy<Vec<Rule>> = Lazy::new(|| {
    let mut rules = vec![Rule::header(), Rule::description()];
    rules.extend(criteria::rules());
    rules
});

static RULES_BY_NAME: Lazy<HashMap<&'static str, &'static Rule>> =
    Lazy::new(|| GRAMMAR.iter().map(|r| (r.name, r)).collect());

static RULES_BY_KIND: Lazy<HashMap<CriterionKind, &'static Rule>> = Lazy::new(|| {
    GRAMMAR
        .iter()
        .filter_map(|r| r.kind().map(|k| (k, r)))
        .collect()
});

/// All rules, in the order they are tried.
pub fn rules() -> &'static [Rule] {
    &GRAMMAR
}

pub fn rule(name: &str) -> Option<&'static Rule> {
    RULES_BY_NAME.get(name).copied()
}

/// The rule that parses and renders criteria of `kind`.
pub fn rule_for_kind(kind: CriterionKind) -> Option<&'static Rule> {
    RULES_BY_KIND.get(&kind).copied()
}

/// Try each rule in order; the first whose pattern matches consumes the line.
pub fn match_line(line: &str) -> LineMatch {
    for rule in GRAMMAR.iter() {
        if let Some(caps) = rule.regex.captures(line) {
            return match rule.build(&caps) {
                Some(fragment) => LineMatch::Matched {
                    rule: rule.name,
                    shared: rule.is_shared(),
                    fragment,
                },
                None => LineMatch::Rejected {
                    rule: rule.name,
                    shared: rule.is_shared(),
                },
            };
        }
    }
    LineMatch::Unmatched
}

/// Render `fragment` with the rule called `rule_name`.
pub fn render(rule_name: &str, fragment: &Fragment) -> Result<String, ClassMapError> {
    rule(rule_name)
        .ok_or_else(|| ClassMapError::UnknownParser(rule_name.to_string()))?
        .render(fragment)
}

/// Render `fragment` with the rule matching its kind.
pub fn render_fragment(fragment: &Fragment) -> Result<String, ClassMapError> {
    let rule = match fragment {
        Fragment::Header { .. } => rule(HEADER_RULE),
        Fragment::Description(_) => rule(DESCRIPTION_RULE),
        Fragment::Match(m) => rule_for_kind(m.kind()),
    };
    let kind = match fragment {
        Fragment::Match(m) => m.kind().to_string(),
        _ => "header".to_string(),
    };
    rule.ok_or(ClassMapError::UnknownParser(kind))?
        .render(fragment)
}

pub fn render_header(class_map: &ClassMap) -> Result<String, ClassMapError> {
    render_fragment(&Fragment::header(class_map))
}

pub fn render_match(m: &Match) -> Result<String, ClassMapError> {
    render_fragment(&Fragment::Match(m.clone()))
}

/// Render every line of `class_map`: header, description, then matches.
pub fn render_class_map(class_map: &ClassMap) -> Result<Vec<String>, ClassMapError> {
    let mut lines = vec![render_header(class_map)?];
    if let Some(description) = &class_map.description {
        lines.push(render_fragment(&Fragment::Description(description.clone()))?);
    }
    for m in &class_map.matches {
        lines.push(render_match(m)?);
    }
    Ok(lines)
}
