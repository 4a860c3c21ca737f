//! Per class-map comparison and ordered command emission.
//!
//! Commands for one class-map are contiguous: the header (context entry),
//! then the description, then `no match` removals, then `match` additions.
//! Destroys of class-maps that are absent from the desired set come first.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::differ::{self, HeaderAction};
use crate::error::ClassMapError;
use crate::grammar::{self, DESCRIPTION_RULE, Fragment};
use crate::traits::Normalize;
use crate::types::{ClassMap, Match, State};

/// The commands of one run and how many class-maps they touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub commands: Vec<String>,
    pub changed: usize,
}

impl Reconciliation {
    fn push(&mut self, commands: Vec<String>) {
        if !commands.is_empty() {
            self.changed += 1;
            self.commands.extend(commands);
        }
    }
}

/// Compute the commands that take `have` to `want` under `state`.
///
/// Both sides are compared in normalized form. `State::Parsed` produces no
/// commands.
pub fn reconcile(
    state: State,
    want: &[ClassMap],
    have: &[ClassMap],
) -> Result<Reconciliation, ClassMapError> {
    let want = normalized(want);
    let have = normalized(have);
    let mut result = Reconciliation::default();
    match state {
        State::Parsed => {}
        State::Rendered => {
            for w in &want {
                result.push(compare(w, None)?);
            }
        }
        State::Deleted => {
            let named: HashSet<&str> = want.iter().map(|w| w.name.as_str()).collect();
            for h in have
                .iter()
                .filter(|h| named.is_empty() || named.contains(h.name.as_str()))
            {
                result.push(vec![destroy(h)?]);
            }
        }
        State::Merged | State::Replaced | State::Overridden => {
            let current: HashMap<&str, &ClassMap> =
                have.iter().map(|h| (h.name.as_str(), h)).collect();

            if state.removes_unlisted() {
                let wanted: HashSet<&str> = want.iter().map(|w| w.name.as_str()).collect();
                for h in have.iter().filter(|h| !wanted.contains(h.name.as_str())) {
                    result.push(vec![destroy(h)?]);
                }
            }

            for w in &want {
                let existing = current.get(w.name.as_str()).copied();
                let commands = match (state, existing) {
                    (State::Merged, Some(h)) => compare(&h.overlay(w), Some(h))?,
                    _ => compare(w, existing)?,
                };
                result.push(commands);
            }
        }
    }

    debug!(
        event = "Reconcile",
        phase = "Done",
        state = %state,
        changed = result.changed,
        commands = result.commands.len()
    );
    Ok(result)
}

fn normalized(class_maps: &[ClassMap]) -> Vec<ClassMap> {
    class_maps.iter().cloned().map(Normalize::normalized).collect()
}

/// Commands for one desired class-map against its current counterpart.
fn compare(want: &ClassMap, have: Option<&ClassMap>) -> Result<Vec<String>, ClassMapError> {
    let commands = match have {
        None => create(want),
        Some(h) if want.retypes(h) => recreate(want, h),
        Some(h) => modify(want, h),
    }
    .map_err(|e| e.in_class_map(&want.name))?;

    debug!(
        event = "Reconcile",
        phase = "Compare",
        class_map = %want.name,
        exists = have.is_some(),
        commands = commands.len()
    );
    Ok(commands)
}

fn create(want: &ClassMap) -> Result<Vec<String>, ClassMapError> {
    let mut commands = vec![grammar::render_header(want)?];
    if let Some(description) = &want.description {
        commands.push(render_description(description)?);
    }
    let diff = differ::diff(&want.matches, &[]).for_header(HeaderAction::Create);
    commands.extend(render_matches(&diff.to_add, false)?);
    Ok(commands)
}

/// IOS cannot change the header type of a class-map in place.
fn recreate(want: &ClassMap, have: &ClassMap) -> Result<Vec<String>, ClassMapError> {
    debug!(
        event = "Reconcile",
        phase = "Retype",
        class_map = %want.name,
        match_type = %want.effective_match_type(),
        class_type = %want.effective_class_type()
    );
    let mut commands = vec![destroy_command(have)?];
    commands.extend(create(want)?);
    Ok(commands)
}

fn modify(want: &ClassMap, have: &ClassMap) -> Result<Vec<String>, ClassMapError> {
    let mut body = Vec::new();

    match (&want.description, &have.description) {
        (Some(w), Some(h)) if w.trim() == h.trim() => {}
        (Some(w), _) => body.push(render_description(w)?),
        (None, Some(h)) => body.push(format!("no {}", render_description(h)?)),
        (None, None) => {}
    }

    let diff = differ::diff(&want.matches, &have.matches).for_header(HeaderAction::Unchanged);
    body.extend(render_matches(&diff.to_remove, true)?);
    body.extend(render_matches(&diff.to_add, false)?);

    if body.is_empty() {
        return Ok(body);
    }

    let header = Fragment::Header {
        name: want.name.clone(),
        match_type: want.match_type.or(have.match_type).unwrap_or_default(),
        class_type: want.class_type.or(have.class_type).unwrap_or_default(),
    };
    let mut commands = vec![grammar::render_fragment(&header)?];
    commands.extend(body);
    Ok(commands)
}

fn destroy(have: &ClassMap) -> Result<String, ClassMapError> {
    destroy_command(have).map_err(|e| e.in_class_map(&have.name))
}

fn destroy_command(have: &ClassMap) -> Result<String, ClassMapError> {
    Ok(format!("no {}", grammar::render_header(have)?))
}

fn render_description(text: &str) -> Result<String, ClassMapError> {
    grammar::render(DESCRIPTION_RULE, &Fragment::Description(text.to_string()))
}

fn render_matches(matches: &[Match], remove: bool) -> Result<Vec<String>, ClassMapError> {
    matches
        .iter()
        .map(|m| {
            let line = grammar::render_match(m)?;
            Ok(if remove { format!("no {line}") } else { line })
        })
        .collect()
}
