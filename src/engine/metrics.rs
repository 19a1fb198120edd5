//! Dispatch metrics.
//!
//! Metrics are *opt-in*: `MatchEngine::route_matches` discards them, and
//! `MatchEngine::route_matches_with_metrics` returns them alongside the
//! matches for profiling and for the CLI report.

use crate::MatchedRule;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct DispatchMetrics {
    /// Total elapsed time for the call.
    pub total: Duration,
    /// Time spent evaluating rules against records.
    pub matching: Duration,
    /// Time spent invoking routers (including the routers themselves).
    pub dispatch: Duration,
    /// Number of rules evaluated.
    pub rules: usize,
    /// Number of records in the batch.
    pub records: usize,
    /// Number of (rule, record) matches.
    pub matches: usize,
    /// Number of router invocations.
    pub invocations: usize,
    /// Router names that were skipped because nothing is registered under
    /// them, once per skipped target.
    pub skipped: Vec<String>,
}

/// Dispatch output bundled with timing information.
#[derive(Debug, Clone)]
pub struct DispatchRun {
    pub matches: Vec<MatchedRule>,
    pub metrics: DispatchMetrics,
}
