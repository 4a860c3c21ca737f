use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::ClassMapError;
use crate::loader;
use crate::metrics::{self, ReconcilePhases, ReconcileStats};
use crate::parser::ConfigParser;
use crate::reconciler;
use crate::timers::{PhaseTimer, as_ms};
use crate::types::{ClassMap, Outcome, Request, State};

/// Entry point for one reconciliation run. Holds no state between runs and
/// can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassMapEngine;

impl ClassMapEngine {
    pub fn new() -> Self {
        ClassMapEngine
    }

    /// Run a request given in its JSON form.
    pub fn run_json(&self, json: &str) -> Result<Outcome, ClassMapError> {
        self.run(&Request::from_json(json)?)
    }

    pub fn run(&self, request: &Request) -> Result<Outcome, ClassMapError> {
        let started = Instant::now();
        let state = request.state;

        info!(
            event = "Run",
            phase = "Start",
            state = %state,
            class_maps = request.config.len(),
            running_config = request.running_config.is_some()
        );

        check_input(request)?;

        let mut load = Duration::ZERO;
        let mut parse = Duration::ZERO;
        let mut compare = Duration::ZERO;

        let want = {
            let _timer = PhaseTimer::new(&mut load);
            match state {
                State::Parsed => Vec::new(),
                _ => loader::prepare(request.config.clone())?,
            }
        };

        let have = {
            let _timer = PhaseTimer::new(&mut parse);
            match (state, request.running_config.as_deref()) {
                (State::Rendered, _) | (_, None) => Vec::new(),
                (_, Some(text)) => self.parse(text),
            }
        };

        if state == State::Parsed {
            debug!(event = "Run", phase = "Parsed", class_maps = have.len());
            return Ok(Outcome::Parsed(have));
        }

        let reconciliation = {
            let _timer = PhaseTimer::new(&mut compare);
            reconciler::reconcile(state, &want, &have)?
        };

        let duration = started.elapsed();
        info!(
            event = "Run",
            phase = "Done",
            state = %state,
            changed = reconciliation.changed,
            commands = reconciliation.commands.len(),
            duration_ms = as_ms(duration)
        );
        metrics::record_reconcile(
            ReconcileStats {
                state,
                changed: reconciliation.changed,
                commands: reconciliation.commands.len(),
                duration,
            },
            ReconcilePhases {
                load_ms: as_ms(load),
                parse_ms: as_ms(parse),
                compare_ms: as_ms(compare),
                total_ms: as_ms(duration),
            },
        );

        Ok(match state {
            State::Rendered => Outcome::Rendered(reconciliation.commands),
            _ => Outcome::Commands(reconciliation.commands),
        })
    }

    /// Parse running configuration text, reporting the pass to the metrics
    /// sink.
    pub fn parse(&self, text: &str) -> Vec<ClassMap> {
        let (class_maps, stats) = ConfigParser::new().parse_lines(text.lines());
        metrics::record_parse(&stats);
        class_maps
    }

    /// Render the creation commands for `config`, without a device.
    pub fn render(&self, config: Vec<ClassMap>) -> Result<Vec<String>, ClassMapError> {
        let request = Request::new(State::Rendered).with_config(config);
        match self.run(&request)? {
            Outcome::Rendered(commands) => Ok(commands),
            _ => Ok(Vec::new()),
        }
    }
}

fn check_input(request: &Request) -> Result<(), ClassMapError> {
    let missing = match request.state.required_input() {
        Some(field @ "config") => request.config.is_empty().then_some(field),
        Some(field) => request.running_config.is_none().then_some(field),
        None => None,
    };
    match missing {
        Some(input) => Err(ClassMapError::MissingInput {
            state: request.state.to_string(),
            input: input.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests;
