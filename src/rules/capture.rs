//! Include/exclude patterns and capture extraction.
//!
//! Patterns always match the *whole* candidate string. Internally each source
//! pattern is wrapped as `^(?:...)$`; the wrapper adds no capture group, so
//! group indices and names are exactly those the rule author wrote.
//!
//! ## Capture merge order
//!
//! When an include pattern matches, [`capture_result`] turns the match into the
//! variable map. The order matters whenever a pattern both relies on the
//! automatic value and defines a group named after the variable:
//!
//! ```text
//! 1. unnamed groups present   -> vars[name] = groups joined by " "
//! 2. whole match non-empty,
//!    vars[name] unset or ""   -> vars[name] = whole match
//! 3. still unset              -> vars[name] = ""
//! 4. named groups             -> merged last, overwriting anything above
//! ```

use crate::VarMap;
use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::fmt;

/// A compiled, full-match regular expression.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` for the variable named `variable` (used in errors).
    pub fn compile(variable: &str, source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|source_err| Error::Pattern {
            variable: variable.to_string(),
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Pattern { source: source.to_string(), regex })
    }

    /// The pattern as written in the rule definition.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_full_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Full-match `candidate` and, on success, build the variable map for
    /// `variable`.
    pub fn captures(&self, variable: &str, candidate: &str) -> Option<VarMap> {
        let caps = self.regex.captures(candidate)?;
        Some(capture_result(variable, &self.regex, &caps))
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// Build the variable map from a successful match (see module docs).
///
/// Groups that did not take part in the match read as `""`.
pub(crate) fn capture_result(name: &str, regex: &Regex, caps: &Captures<'_>) -> VarMap {
    let mut unnamed: Vec<&str> = Vec::new();
    let mut named: Vec<(&str, &str)> = Vec::new();

    for (index, group) in regex.capture_names().enumerate().skip(1) {
        let text = caps.get(index).map_or("", |m| m.as_str());
        match group {
            Some(group) => named.push((group, text)),
            None => unnamed.push(text),
        }
    }

    let mut result = VarMap::new();
    if !unnamed.is_empty() {
        result.insert(name.to_string(), unnamed.join(" "));
    }

    let whole = caps.get(0).map_or("", |m| m.as_str());
    if !whole.is_empty() && result.get(name).is_none_or(|v| v.is_empty()) {
        result.insert(name.to_string(), whole.to_string());
    }

    result.entry(name.to_string()).or_default();

    for (group, text) in named {
        result.insert(group.to_string(), text.to_string());
    }

    result
}
