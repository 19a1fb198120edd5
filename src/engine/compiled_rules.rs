//! Rule compilation.
//!
//! This module holds the *static* side of the engine: the rule set compiled
//! from configuration. Compilation is all-or-nothing; the first invalid
//! definition aborts it, so an engine never runs with a partial rule set.
//!
//! ## Invariants
//!
//! - Rules keep their declaration order. Matching is rule-major, so this order
//!   is also the order of `match_rules` output for a batch.
//! - Rules are never mutated after compilation.

use crate::config::RulesConfig;
use crate::error::Result;
use crate::rules::Rule;

/// Compiled, ordered rule set.
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    rules: Vec<Rule>,
}

impl CompiledRules {
    /// Compile every definition in `config`.
    pub fn compile(config: &RulesConfig) -> Result<Self> {
        let rules = config.rules.iter().map(Rule::from_value).collect::<Result<Vec<_>>>()?;
        let compiled = CompiledRules { rules };

        tracing::debug!(
            rules = compiled.len(),
            variables = compiled.iter().map(|r| r.vars().len()).sum::<usize>(),
            "compiled rule set"
        );
        Ok(compiled)
    }

    /// Wrap rules built in code.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        CompiledRules { rules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    /// Distinct router names referenced by any rule, sorted.
    pub fn router_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.iter().flat_map(|r| r.routers()).filter_map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl<'a> IntoIterator for &'a CompiledRules {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
