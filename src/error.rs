//! Error types.
//!
//! Everything that can go wrong while building or running the engine funnels
//! into [`Error`]. The variants split along the two phases of a router's life:
//!
//! - **Construction** (`Schema`, `Pattern`, `Path`): raised while compiling rule
//!   definitions. An engine is never built from a partially valid rule set.
//! - **Dispatch** (`RouterName`): raised while routing a batch; aborts the rest
//!   of that batch.
//!
//! `Decode`, `Io`, `Yaml` and `Json` belong to the plumbing around the core
//! (configuration loading and record preprocessing).
//!
//! An unregistered router name is not an error and has no variant.

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("variable '{variable}': invalid pattern {pattern:?}: {source}")]
    Pattern {
        variable: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("rule '{rule}': router target #{index} has no name")]
    RouterName { rule: String, index: usize },

    #[error("record {index}: {reason}")]
    Decode { index: usize, reason: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A rule or variable definition does not have the expected structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The definition's key set differs from the accepted one.
    #[error("{subject}: {}", describe_keys(.missing, .extra))]
    Keys { subject: String, missing: Vec<String>, extra: Vec<String> },

    /// A field is present but holds the wrong kind of value.
    #[error("{subject}: field '{field}' must be {expected}")]
    Shape { subject: String, field: &'static str, expected: &'static str },

    #[error("{subject}: definition must be a mapping")]
    NotAMapping { subject: String },

    /// Two variables of one rule share a name.
    #[error("{subject}: variable '{variable}' is declared more than once")]
    DuplicateVariable { subject: String, variable: String },
}

fn describe_keys(missing: &[String], extra: &[String]) -> String {
    format!("missing fields [{}]; extra fields [{}]", missing.join(", "), extra.join(", "))
}

/// A path expression failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    pub path: String,
    /// Byte offset into `path` where parsing stopped.
    pub offset: usize,
    pub reason: String,
}

impl PathError {
    pub(crate) fn new(path: &str, offset: usize, reason: impl Into<String>) -> Self {
        PathError { path: path.to_string(), offset, reason: reason.into() }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path {:?} at offset {}: {}", self.path, self.offset, self.reason)
    }
}

impl std::error::Error for PathError {}
