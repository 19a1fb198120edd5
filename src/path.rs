//! Path queries over JSON values.
//!
//! A path expression selects zero or more values from a record, much like
//! XPath for XML. The dialect is a JSONPath subset that covers the forms rule
//! files use:
//!
//! ```text
//! $.Records[0].Sns.Message     child fields and array index
//! $..Type                      recursive descent (self, then descendants)
//! $.items[*].id                wildcard
//! $.items[-1]                  index from the end
//! $.items[1:3]  $.items[::2]   slices
//! $['odd key', other]          quoted names and unions
//! Sns.Message                  a leading `$` is optional
//! ```
//!
//! Parsing happens once (`PathQuery::parse`, see `parser.rs`); evaluation
//! (`eval.rs`) walks a `serde_json::Value` and never fails: a path that finds
//! nothing returns an empty list.

#[path = "path/eval.rs"]
mod eval;
#[path = "path/parser.rs"]
mod parser;

use crate::error::PathError;
use serde_json::Value;
use std::fmt;

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    /// Apply the selector to the current nodes.
    Child(Selector),
    /// Apply the selector to the current nodes and all of their descendants.
    Descendant(Selector),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Selector {
    Name(String),
    Wildcard,
    Index(i64),
    Slice { start: Option<i64>, end: Option<i64>, step: i64 },
    Union(Vec<Selector>),
}

/// A parsed path expression.
#[derive(Clone, PartialEq)]
pub struct PathQuery {
    source: String,
    segments: Vec<Segment>,
}

impl PathQuery {
    /// Parse `path`. Fails with a [`PathError`] pointing at the offending byte.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let segments = parser::parse(path)?;
        Ok(PathQuery { source: path.to_string(), segments })
    }

    /// The expression this query was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matched values, in document order.
    pub fn select<'v>(&self, value: &'v Value) -> Vec<&'v Value> {
        eval::select(&self.segments, value)
    }

    /// Matched values rendered as strings (see [`render_value`]).
    ///
    /// Empty and null locations yield `""` rather than being skipped, so the
    /// result length always equals the number of matched locations.
    pub fn evaluate(&self, value: &Value) -> Vec<String> {
        self.select(value).into_iter().map(render_value).collect()
    }
}

impl fmt::Debug for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathQuery").field(&self.source).finish()
    }
}

impl fmt::Display for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse `path` and evaluate it against `value` in one go.
pub fn evaluate(path: &str, value: &Value) -> Result<Vec<String>, PathError> {
    Ok(PathQuery::parse(path)?.evaluate(value))
}

/// String form of a matched value.
///
/// ```text
/// "text"        -> text
/// 42 / true     -> 42 / true
/// null, [], {}  -> ""
/// [1,2] {..}    -> compact JSON
/// ```
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) if items.is_empty() => String::new(),
        Value::Object(map) if map.is_empty() => String::new(),
        other => other.to_string(),
    }
}
