use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClassMapError {
    #[error("failed to render '{parser}': {reason}")]
    RenderError { parser: String, reason: String },

    #[error("failed to reconcile class-map '{name}': {source}")]
    ReconcileError {
        name: String,
        source: Box<ClassMapError>,
    },

    #[error("unknown parser: {0}")]
    UnknownParser(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("missing input for state '{state}': {input}")]
    MissingInput { state: String, input: String },
}

impl ClassMapError {
    pub(crate) fn render(parser: impl Into<String>, reason: impl Into<String>) -> Self {
        ClassMapError::RenderError {
            parser: parser.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn in_class_map(self, name: &str) -> Self {
        ClassMapError::ReconcileError {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for ClassMapError {
    fn from(err: serde_json::Error) -> Self {
        ClassMapError::InvalidFormat(err.to_string())
    }
}
