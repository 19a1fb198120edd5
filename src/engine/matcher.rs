//! Matching and dispatch.
//!
//! This module is the operational core of the engine:
//!
//! - Evaluate every compiled rule against every record of a batch (rule-major
//!   nested loop) and collect one `MatchedRule` per matching pair.
//! - Hand each match to the routers its rule names, in declaration order.
//!
//! ```text
//! for rule in rules:                  match_rules
//!     for record in batch.Records:
//!         rule.evaluate(record) ──▶ MatchedRule
//!
//! for matched in matches:             route_matches
//!     for target in matched.routers:
//!         no name       ──▶ Err(RouterName), stop everything
//!         registered    ──▶ router(&matched)
//!         unregistered  ──▶ skip
//! ```
//!
//! The engine keeps no per-call state, so one instance can serve many batches,
//! from several threads if the routers allow it.

use super::compiled_rules::CompiledRules;
use super::metrics::{DispatchMetrics, DispatchRun};
use super::registry::RouterRegistry;
use crate::config::RulesConfig;
use crate::error::{Error, Result};
use crate::{MatchedRule, RecordBatch};
use std::time::Instant;

#[derive(Debug)]
pub struct MatchEngine {
    rules: CompiledRules,
    routers: RouterRegistry,
}

impl MatchEngine {
    /// Compile `config` and bind it to `routers`.
    pub fn new(config: &RulesConfig, routers: RouterRegistry) -> Result<Self> {
        Ok(Self::from_compiled(CompiledRules::compile(config)?, routers))
    }

    pub fn from_compiled(rules: CompiledRules, routers: RouterRegistry) -> Self {
        MatchEngine { rules, routers }
    }

    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    pub fn routers(&self) -> &RouterRegistry {
        &self.routers
    }

    /// Every (rule, record) pair that matches, rule-major. A rule matching
    /// several records yields several entries.
    pub fn match_rules(&self, batch: &RecordBatch) -> Vec<MatchedRule> {
        let mut matches = Vec::new();

        for rule in &self.rules {
            for (index, record) in batch.records.iter().enumerate() {
                match rule.evaluate(record) {
                    Some(vars) => {
                        tracing::trace!(rule = rule.name(), record = index, "matched");
                        matches.push(MatchedRule {
                            name: rule.name().to_string(),
                            routers: rule.routers().to_vec(),
                            vars,
                            template: rule.template().to_string(),
                        });
                    }
                    None => tracing::trace!(rule = rule.name(), record = index, "not matched"),
                }
            }
        }

        matches
    }

    /// Match `batch` and call the routers of every match.
    ///
    /// Returns the same matches as [`match_rules`](Self::match_rules). A router
    /// target without a name aborts with [`Error::RouterName`] before any later
    /// target is served; a name with no registered router is skipped.
    pub fn route_matches(&self, batch: &RecordBatch) -> Result<Vec<MatchedRule>> {
        Ok(self.route_matches_with_metrics(batch)?.matches)
    }

    /// [`route_matches`](Self::route_matches) plus timing and counters.
    pub fn route_matches_with_metrics(&self, batch: &RecordBatch) -> Result<DispatchRun> {
        let total_start = Instant::now();
        let mut metrics =
            DispatchMetrics { rules: self.rules.len(), records: batch.records.len(), ..DispatchMetrics::default() };

        let matching_start = Instant::now();
        let matches = self.match_rules(batch);
        metrics.matching = matching_start.elapsed();
        metrics.matches = matches.len();

        let dispatch_start = Instant::now();
        self.dispatch(&matches, &mut metrics)?;
        metrics.dispatch = dispatch_start.elapsed();
        metrics.total = total_start.elapsed();

        tracing::debug!(
            records = metrics.records,
            matches = metrics.matches,
            invocations = metrics.invocations,
            skipped = metrics.skipped.len(),
            "batch routed"
        );
        Ok(DispatchRun { matches, metrics })
    }

    fn dispatch(&self, matches: &[MatchedRule], metrics: &mut DispatchMetrics) -> Result<()> {
        for matched in matches {
            for (index, target) in matched.routers.iter().enumerate() {
                let Some(name) = target.name() else {
                    return Err(Error::RouterName { rule: matched.name.clone(), index });
                };

                match self.routers.get(name) {
                    Some(router) => {
                        router(matched);
                        metrics.invocations += 1;
                    }
                    None => {
                        tracing::debug!(rule = %matched.name, router = name, "no router registered; skipping");
                        metrics.skipped.push(name.to_string());
                    }
                }
            }
        }
        Ok(())
    }
}
