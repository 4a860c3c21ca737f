// src/lib.rs
//! Parse, render and reconcile Cisco IOS class-map configuration.
//!
//! A run takes the desired class-maps, the device's running configuration
//! text and a [`State`], and returns the ordered commands that bring the
//! device to the desired state. The same grammar parses and renders, so
//! parsing rendered output gives back the declared structure.
//!
//! ```rust
//! use classmap_core::{ClassMapEngine, Outcome, Request, State};
//!
//! let request = Request::from_json(r#"{
//!     "state": "merged",
//!     "config": [{"name": "voice", "match_type": "match-any", "matches": [{"cos": [5]}]}],
//!     "running_config": "class-map match-any voice\n match cos 3\n"
//! }"#).unwrap();
//! let outcome = ClassMapEngine::new().run(&request).unwrap();
//! assert_eq!(
//!     outcome,
//!     Outcome::Commands(vec!["class-map match-any voice".into(), "match cos 5".into()])
//! );
//! ```

pub use differ::{HeaderAction, MatchDiff, diff};
pub use engine::ClassMapEngine;
pub use error::ClassMapError;
pub use loader::load_config;
pub use parser::ConfigParser;
pub use reconciler::{Reconciliation, reconcile};
pub use traits::Normalize;
pub use types::*;

pub mod grammar;
pub mod metrics;

mod differ;
mod engine;
mod error;
mod loader;
mod parser;
mod reconciler;
mod timers;
mod traits;
mod types;
