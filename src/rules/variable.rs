//! Variables: one named value extracted from a record.
//!
//! ```yaml
//! - name: type            # query mode
//!   jsonpath: $..Type
//!   includes: ['.*']      # optional, defaults to ['.*']
//!   excludes:             # optional, defaults to []
//! - name: team            # constant mode
//!   value: sysops
//! ```

use super::capture::Pattern;
use super::validate;
use crate::VarMap;
use crate::error::Result;
use crate::path::PathQuery;
use serde_json::Value;

const CONSTANT_KEYS: &[&str] = &["name", "value"];
const QUERY_KEYS: &[&str] = &["name", "jsonpath"];
const QUERY_OPTIONAL_KEYS: &[&str] = &["includes", "excludes"];

/// Include list used when a definition omits it or leaves it empty.
pub const DEFAULT_INCLUDE: &str = ".*";

#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Constant(String),
    Query(Query),
}

#[derive(Debug, Clone)]
struct Query {
    path: PathQuery,
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl Variable {
    /// Build a variable from its definition.
    ///
    /// A non-null `value` selects constant mode; otherwise the definition must
    /// carry `jsonpath` and may carry `includes`/`excludes`. The path and every
    /// pattern are compiled here, so a bad definition never reaches a record.
    pub fn from_value(def: &Value) -> Result<Self> {
        let subject = validate::subject("variable", def);
        let map = validate::as_definition(&subject, def)?;

        if map.get("value").is_some_and(|v| !v.is_null()) {
            validate::check_keys(&subject, map, CONSTANT_KEYS, &[])?;
            let name = validate::name_field(&subject, map)?;
            let value = validate::scalar_field(&subject, map, "value")?;
            return Ok(Variable::constant(name, value));
        }

        validate::check_keys(&subject, map, QUERY_KEYS, QUERY_OPTIONAL_KEYS)?;
        let name = validate::name_field(&subject, map)?;
        let path = validate::string_field(&subject, map, "jsonpath")?;
        let includes = validate::string_list_field(&subject, map, "includes")?;
        let excludes = validate::string_list_field(&subject, map, "excludes")?;

        Variable::query(name, &path, &includes, &excludes)
    }

    pub fn constant(name: impl Into<String>, value: impl Into<String>) -> Self {
        Variable { name: name.into(), source: Source::Constant(value.into()) }
    }

    /// Build a query-mode variable. An empty `includes` means `[".*"]`.
    pub fn query<S: AsRef<str>>(name: impl Into<String>, path: &str, includes: &[S], excludes: &[S]) -> Result<Self> {
        let name = name.into();
        let path = PathQuery::parse(path)?;

        let mut include_patterns =
            includes.iter().map(|p| Pattern::compile(&name, p.as_ref())).collect::<Result<Vec<_>>>()?;
        if include_patterns.is_empty() {
            include_patterns.push(Pattern::compile(&name, DEFAULT_INCLUDE)?);
        }
        let exclude_patterns = excludes.iter().map(|p| Pattern::compile(&name, p.as_ref())).collect::<Result<Vec<_>>>()?;

        Ok(Variable { name, source: Source::Query(Query { path, includes: include_patterns, excludes: exclude_patterns }) })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.source, Source::Constant(_))
    }

    pub fn path(&self) -> Option<&PathQuery> {
        match &self.source {
            Source::Query(q) => Some(&q.path),
            Source::Constant(_) => None,
        }
    }

    pub fn includes(&self) -> &[Pattern] {
        match &self.source {
            Source::Query(q) => &q.includes,
            Source::Constant(_) => &[],
        }
    }

    pub fn excludes(&self) -> &[Pattern] {
        match &self.source {
            Source::Query(q) => &q.excludes,
            Source::Constant(_) => &[],
        }
    }

    /// Extract this variable from `record`; `None` means not matched.
    ///
    /// ```text
    /// path query ── empty? ──────────────▶ None (field not found)
    ///      │
    ///   concat ── any exclude matches? ──▶ None
    ///      │
    ///   first matching include ──────────▶ capture result
    ///      └── no include matches ───────▶ None
    /// ```
    pub fn extract(&self, record: &Value) -> Option<VarMap> {
        let query = match &self.source {
            Source::Constant(value) => return Some(VarMap::from([(self.name.clone(), value.clone())])),
            Source::Query(query) => query,
        };

        let found = query.path.evaluate(record);
        if found.is_empty() {
            tracing::trace!(variable = %self.name, path = %query.path, "field not found");
            return None;
        }

        let candidate = found.concat();
        if let Some(exclude) = query.excludes.iter().find(|p| p.is_full_match(&candidate)) {
            tracing::trace!(variable = %self.name, pattern = exclude.as_str(), %candidate, "excluded");
            return None;
        }

        let result = query.includes.iter().find_map(|p| p.captures(&self.name, &candidate));
        if result.is_none() {
            tracing::trace!(variable = %self.name, %candidate, "no include matched");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SchemaError};
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> VarMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn constant_always_matches() {
        let var = Variable::from_value(&json!({ "name": "constant", "value": "constant-value" })).unwrap();
        assert!(var.is_constant());
        for record in [json!({}), json!(null), json!({ "constant": "other" }), json!([1, 2])] {
            assert_eq!(var.extract(&record), Some(vars(&[("constant", "constant-value")])));
        }
    }

    #[test]
    fn constant_numbers_become_text() {
        let var = Variable::from_value(&json!({ "name": "limit", "value": 10 })).unwrap();
        assert_eq!(var.extract(&json!({})), Some(vars(&[("limit", "10")])));
    }

    #[test]
    fn minimal_query_defaults_to_match_all() {
        let var = Variable::from_value(&json!({ "name": "type", "jsonpath": "$.Type" })).unwrap();
        assert_eq!(var.includes().iter().map(Pattern::as_str).collect::<Vec<_>>(), vec![".*"]);
        assert!(var.excludes().is_empty());
        assert_eq!(var.extract(&json!({ "Type": "scale-up" })), Some(vars(&[("type", "scale-up")])));
    }

    #[test]
    fn empty_and_null_filters_use_defaults() {
        for def in [
            json!({ "name": "t", "jsonpath": "$.Type", "includes": [], "excludes": [] }),
            json!({ "name": "t", "jsonpath": "$.Type", "includes": null, "excludes": null }),
            json!({ "name": "t", "jsonpath": "$.Type", "includes": [".*"], "excludes": [] }),
        ] {
            let var = Variable::from_value(&def).unwrap();
            assert_eq!(var.includes().len(), 1);
            assert!(var.excludes().is_empty());
        }
    }

    #[test]
    fn missing_field_never_matches() {
        let var = Variable::query("t", "$.Type", &[".*"], &[]).unwrap();
        assert_eq!(var.extract(&json!({ "Other": "x" })), None);
        let var = Variable::query("t", "$.Type", &[""], &["nothing"]).unwrap();
        assert_eq!(var.extract(&json!({})), None);
    }

    #[test]
    fn null_field_is_found_but_empty() {
        let var = Variable::query("t", "$.Type", &[".*"], &[]).unwrap();
        assert_eq!(var.extract(&json!({ "Type": null })), Some(vars(&[("t", "")])));
    }

    #[test]
    fn exclude_wins_over_include() {
        let var = Variable::query("t", "$.Type", &["scale-.*"], &["scale-down"]).unwrap();
        assert_eq!(var.extract(&json!({ "Type": "scale-down" })), None);
        assert_eq!(var.extract(&json!({ "Type": "scale-up" })), Some(vars(&[("t", "scale-up")])));
    }

    #[test]
    fn exclude_is_full_match() {
        let var = Variable::query("t", "$.Type", &[".*"], &["scale"]).unwrap();
        assert_eq!(var.extract(&json!({ "Type": "scale-up" })), Some(vars(&[("t", "scale-up")])));
    }

    #[test]
    fn first_matching_include_wins() {
        let var = Variable::query("t", "$.Type", &[r"(\w+)-(\w+)", r"(?P<kind>\w+)-\w+"], &[]).unwrap();
        assert_eq!(var.extract(&json!({ "Type": "scale-up" })), Some(vars(&[("t", "scale up")])));
    }

    #[test]
    fn later_include_used_when_earlier_fails() {
        let var = Variable::query("t", "$.Type", &[r"\d+", r"(?P<kind>\w+)-\w+"], &[]).unwrap();
        assert_eq!(var.extract(&json!({ "Type": "scale-up" })), Some(vars(&[("t", "scale-up"), ("kind", "scale")])));
    }

    #[test]
    fn no_include_matches() {
        let var = Variable::query("t", "$.Type", &["a", "b"], &[]).unwrap();
        assert_eq!(var.extract(&json!({ "Type": "c" })), None);
    }

    #[test]
    fn multiple_matches_are_concatenated() {
        let var = Variable::query("t", "$..Type", &[".*"], &[]).unwrap();
        let record = json!({ "Type": "a", "Nested": { "Type": "b" } });
        assert_eq!(var.extract(&record), Some(vars(&[("t", "ab")])));
    }

    #[test]
    fn named_group_overrides_own_name() {
        let var = Variable::query("region", "$.Zone", &[r"(\w+)-(?P<region>\w+)-\d"], &[]).unwrap();
        assert_eq!(var.extract(&json!({ "Zone": "us-east-1" })), Some(vars(&[("region", "east")])));
    }

    #[test]
    fn missing_jsonpath_is_schema_error() {
        let err = Variable::from_value(&json!({ "name": "missing-required", "includes": [".*"] })).unwrap_err();
        match err {
            Error::Schema(SchemaError::Keys { missing, extra, .. }) => {
                assert_eq!(missing, vec!["jsonpath"]);
                assert!(extra.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn constant_with_query_keys_is_schema_error() {
        let err = Variable::from_value(&json!({ "name": "c", "value": "v", "jsonpath": "$.a" })).unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::Keys { ref extra, .. }) if extra == &["jsonpath"]));
    }

    #[test]
    fn unknown_key_is_schema_error() {
        let err = Variable::from_value(&json!({ "name": "c", "jsonpath": "$.a", "regex": "x" })).unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::Keys { ref extra, .. }) if extra == &["regex"]));
    }

    #[test]
    fn wrong_shapes_are_schema_errors() {
        for def in [
            json!({ "name": "c", "jsonpath": "$.a", "includes": ".*" }),
            json!({ "name": "c", "jsonpath": 3 }),
            json!({ "name": "", "jsonpath": "$.a" }),
            json!({ "name": "c", "value": ["x"] }),
            json!(["name", "c"]),
        ] {
            assert!(matches!(Variable::from_value(&def), Err(Error::Schema(_))), "{def}");
        }
    }

    #[test]
    fn bad_pattern_and_path_fail_construction() {
        assert!(matches!(
            Variable::from_value(&json!({ "name": "c", "jsonpath": "$.a", "excludes": ["("] })),
            Err(Error::Pattern { .. })
        ));
        assert!(matches!(Variable::from_value(&json!({ "name": "c", "jsonpath": "$.a[" })), Err(Error::Path(_))));
    }
}
