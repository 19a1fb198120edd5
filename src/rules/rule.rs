use super::validate;
use super::variable::Variable;
use crate::error::{Result, SchemaError};
use crate::{RouterTarget, VarMap};
use serde_json::Value;
use std::collections::HashSet;

/// The exact key set of a rule definition.
pub const RULE_KEYS: &[&str] = &["name", "routers", "vars", "template"];

/// One entry of the `rules` list.
///
/// ```yaml
/// - name: scaling
///   routers:
///   - name: slack
///     channel: sysops-prod
///   vars:
///   - name: type
///     jsonpath: $..Type
///     includes: ['.*']
///     excludes:
///   template: |
///     This {type} just came in
/// ```
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    template: String,
    vars: Vec<Variable>,
    routers: Vec<RouterTarget>,
}

impl Rule {
    /// Build a rule from its definition.
    ///
    /// All four keys must be present even when empty (`template: null` reads
    /// as an empty template) and no other key is accepted.
    pub fn from_value(def: &Value) -> Result<Self> {
        let subject = validate::subject("rule", def);
        let map = validate::as_definition(&subject, def)?;
        validate::check_keys(&subject, map, RULE_KEYS, &[])?;

        let name = validate::string_field(&subject, map, "name")?;
        let template = validate::nullable_string_field(&subject, map, "template")?;
        let vars = validate::sequence_field(&subject, map, "vars")?
            .iter()
            .map(Variable::from_value)
            .collect::<Result<Vec<_>>>()?;
        check_unique_names(&subject, &vars)?;
        let routers = validate::sequence_field(&subject, map, "routers")?
            .iter()
            .map(|target| match target {
                Value::Object(fields) => Ok(RouterTarget::new(fields.clone())),
                _ => Err(SchemaError::Shape { subject: subject.clone(), field: "routers", expected: "a sequence of mappings" }),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Rule { name, template, vars, routers })
    }

    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        vars: Vec<Variable>,
        routers: Vec<RouterTarget>,
    ) -> Self {
        Rule { name: name.into(), template: template.into(), vars, routers }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    pub fn routers(&self) -> &[RouterTarget] {
        &self.routers
    }

    /// Evaluate every variable against `record`.
    ///
    /// All variables must match; the first miss makes the whole rule miss.
    /// Results merge in declaration order, so a later variable overwrites an
    /// earlier one on a key collision. A rule without variables matches any
    /// record with an empty map.
    pub fn evaluate(&self, record: &Value) -> Option<VarMap> {
        let mut merged = VarMap::new();
        for var in &self.vars {
            merged.extend(var.extract(record)?);
        }
        Some(merged)
    }
}

fn check_unique_names(subject: &str, vars: &[Variable]) -> std::result::Result<(), SchemaError> {
    let mut seen = HashSet::new();
    match vars.iter().map(Variable::name).find(|name| !seen.insert(*name)) {
        Some(name) => Err(SchemaError::DuplicateVariable { subject: subject.to_string(), variable: name.to_string() }),
        None => Ok(()),
    }
}
