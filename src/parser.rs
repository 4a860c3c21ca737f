//! One forward pass over running-config text.
//!
//! The header rule opens an object context; every line after it belongs to
//! that class-map until the next header. Lines that match no rule (banners,
//! `!`, `end`, unsupported statements) are skipped.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::grammar::{self, Fragment, LineMatch};
use crate::metrics::ParseStats;
use crate::timers::PhaseTimer;
use crate::types::ClassMap;

/// Class-maps in order of their first header, addressable by name.
#[derive(Debug, Default)]
struct Collected {
    objects: Vec<ClassMap>,
    index: HashMap<String, usize>,
}

impl Collected {
    /// The entry for `name`, created on first sight.
    fn open(&mut self, name: &str) -> &mut ClassMap {
        let next = self.objects.len();
        let at = *self.index.entry(name.to_string()).or_insert(next);
        if at == next {
            self.objects.push(ClassMap::new(name));
        }
        &mut self.objects[at]
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut ClassMap> {
        let at = *self.index.get(name)?;
        self.objects.get_mut(at)
    }
}

/// Turns running-config text into class-maps.
///
/// `current` is the class-map the next body line belongs to. It is set by a
/// header, cleared by a header that fails to build, and reset on every call.
#[derive(Debug, Default)]
pub struct ConfigParser {
    current: Option<String>,
}

impl ConfigParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` into class-maps ordered by first appearance.
    pub fn parse(&mut self, text: &str) -> Vec<ClassMap> {
        self.parse_lines(text.lines()).0
    }

    /// Parse `lines`, returning the class-maps and what the pass saw.
    pub fn parse_lines<I, S>(&mut self, lines: I) -> (Vec<ClassMap>, ParseStats)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.current = None;
        let mut collected = Collected::default();
        let mut stats = ParseStats::default();
        let mut elapsed = Duration::ZERO;

        {
            let _timer = PhaseTimer::new(&mut elapsed);
            for line in lines {
                stats.lines += 1;
                if !self.feed(line.as_ref(), &mut collected) {
                    stats.skipped += 1;
                }
            }
        }

        self.current = None;
        stats.class_maps = collected.objects.len();
        stats.duration = elapsed;
        debug!(
            event = "Parse",
            phase = "Done",
            lines = stats.lines,
            skipped = stats.skipped,
            class_maps = stats.class_maps
        );
        (collected.objects, stats)
    }

    /// Apply one line. Returns false if the line was skipped.
    fn feed(&mut self, line: &str, collected: &mut Collected) -> bool {
        match grammar::match_line(line) {
            LineMatch::Matched { rule, fragment, .. } => self.apply(rule, line, fragment, collected),
            LineMatch::Rejected { rule, shared } => {
                if shared {
                    self.current = None;
                }
                warn!(event = "Parse", phase = "Skip", rule, line, reason = "invalid value");
                false
            }
            LineMatch::Unmatched => {
                debug!(event = "Parse", phase = "Skip", line, reason = "no rule matched");
                false
            }
        }
    }

    fn apply(
        &mut self,
        rule: &str,
        line: &str,
        fragment: Fragment,
        collected: &mut Collected,
    ) -> bool {
        if let Fragment::Header {
            name,
            match_type,
            class_type,
        } = fragment
        {
            let entry = collected.open(&name);
            entry.match_type = Some(match_type);
            entry.class_type = Some(class_type);
            self.current = Some(name);
            return true;
        }

        let Some(entry) = self
            .current
            .as_deref()
            .and_then(|name| collected.get_mut(name))
        else {
            debug!(event = "Parse", phase = "Skip", rule, line, reason = "outside class-map");
            return false;
        };
        match fragment {
            Fragment::Description(text) => entry.description = Some(text),
            Fragment::Match(m) => entry.matches.push(m),
            Fragment::Header { .. } => {}
        }
        true
    }
}
