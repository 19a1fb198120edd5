//! Matching and routing engine.
//!
//! ## How the parts work together
//!
//! ```text
//! RulesConfig ── CompiledRules::compile ──┐     (compiled_rules.rs)
//!                                         │
//! RouterRegistry ─────────────────────────┼── MatchEngine::new
//!                                         v     (matcher.rs)
//! RecordBatch ──────────────▶ MatchEngine::match_rules
//!                               - rules × records, rule-major
//!                               - Rule::evaluate per pair
//!                                         │
//!                                         v
//!                             MatchEngine::route_matches
//!                               - router targets in order
//!                               - registry lookup (registry.rs)
//!                                         │
//!                                         v
//!                          Vec<MatchedRule> (+ metrics.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `compiled_rules.rs`: builds the immutable, ordered rule set; all-or-nothing.
//! - `registry.rs`: name → router callback map injected into the engine.
//! - `matcher.rs`: the matching loop and router dispatch.
//! - `metrics.rs`: optional timing/counting for a dispatch run.
//!
//! ## Debugging
//!
//! The engine logs through `tracing`. With the CLI, set
//! `RUST_LOG=jsonrouter=trace` to see every (rule, record) outcome and
//! `RUST_LOG=jsonrouter=debug` for compilation and skipped routers.

#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/registry.rs"]
mod registry;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub use compiled_rules::CompiledRules;
pub use matcher::MatchEngine;
pub use metrics::{DispatchMetrics, DispatchRun};
pub use registry::{Router, RouterRegistry};
