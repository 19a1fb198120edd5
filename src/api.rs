use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Extracted variables, keyed by variable (or capture group) name.
pub type VarMap = BTreeMap<String, String>;

/// A batch of event records, as delivered by SNS/SQS style sources.
///
/// ```json
/// { "Records": [ { ... }, { ... } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    #[serde(rename = "Records")]
    pub records: Vec<Value>,
}

impl RecordBatch {
    pub fn new(records: Vec<Value>) -> Self {
        RecordBatch { records }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A router target from a rule's `routers` list.
///
/// Only `name` means anything to the engine; every other field (a channel, a
/// URL, ...) is passed through to the router untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouterTarget(Map<String, Value>);

impl RouterTarget {
    pub fn new(fields: Map<String, Value>) -> Self {
        RouterTarget(fields)
    }

    pub fn named(name: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        RouterTarget(fields)
    }

    /// The target's router name; `None` when absent, empty or not a string.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str).filter(|name| !name.is_empty())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// The payload handed to routers: one rule matched against one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRule {
    pub name: String,
    pub routers: Vec<RouterTarget>,
    pub vars: VarMap,
    pub template: String,
}

impl MatchedRule {
    /// Substitute `{var}` placeholders in the template.
    ///
    /// `{{` and `}}` produce literal braces; placeholders naming an unknown
    /// variable are left as written.
    ///
    /// ```
    /// use jsonrouter::{MatchedRule, VarMap};
    ///
    /// let matched = MatchedRule {
    ///     name: "scaling".into(),
    ///     routers: vec![],
    ///     vars: VarMap::from([("type".into(), "scale-up".into())]),
    ///     template: "This {type} just came in".into(),
    /// };
    /// assert_eq!(matched.render(), "This scale-up just came in");
    /// ```
    pub fn render(&self) -> String {
        regex!(r"\{\{|\}\}|\{([^{}\s]+)\}")
            .replace_all(&self.template, |caps: &regex::Captures<'_>| match caps.get(1) {
                Some(var) => self.vars.get(var.as_str()).cloned().unwrap_or_else(|| caps[0].to_string()),
                None => caps[0][..1].to_string(),
            })
            .into_owned()
    }
}
