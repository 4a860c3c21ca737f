//! Set difference between two match lists.
//!
//! Both lists are expected in normalized form. Entries are compared whole:
//! kind, payload and `negate`. A duplicate within one list collapses onto its
//! first occurrence, so it is never emitted twice and never shows up as a
//! removal.

use std::collections::HashSet;

use itertools::Itertools;

use crate::types::Match;

/// What happens to the owning class-map's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    /// The class-map exists on both sides.
    Unchanged,
    /// The class-map is new; nothing on the device can be removed.
    Create,
    /// The class-map goes away; its matches go with it.
    Destroy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchDiff {
    /// Wanted but not present, in `want` order.
    pub to_add: Vec<Match>,
    /// Present but not wanted, in `have` order.
    pub to_remove: Vec<Match>,
}

impl MatchDiff {
    /// Drop the side the header action makes moot.
    pub fn for_header(mut self, action: HeaderAction) -> Self {
        match action {
            HeaderAction::Unchanged => {}
            HeaderAction::Create => self.to_remove.clear(),
            HeaderAction::Destroy => self.to_add.clear(),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

pub fn diff(want: &[Match], have: &[Match]) -> MatchDiff {
    let wanted: HashSet<&Match> = want.iter().collect();
    let present: HashSet<&Match> = have.iter().collect();

    MatchDiff {
        to_add: missing_from(want, &present),
        to_remove: missing_from(have, &wanted),
    }
}

fn missing_from(list: &[Match], other: &HashSet<&Match>) -> Vec<Match> {
    list.iter()
        .unique()
        .filter(|m| !other.contains(*m))
        .cloned()
        .collect()
}
