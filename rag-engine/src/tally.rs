//! Error-statistics side channel for optional enhancements.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::warn;

/// Counts recovered failures by step name.
///
/// Optional steps (summary refinement, section assessment, similar-case
/// lookup, ...) record here instead of failing the request.
#[derive(Debug, Default)]
pub struct ErrorTally {
    counts: Mutex<BTreeMap<String, u64>>,
}

impl ErrorTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the failure and increments the counter for `step`.
    pub fn record(&self, step: &str, reason: &dyn std::fmt::Display) {
        warn!(target: "rag_engine::tally", step, reason = %reason, "optional step failed; continuing without it");
        match self.counts.lock() {
            Ok(mut counts) => *counts.entry(step.to_string()).or_insert(0) += 1,
            Err(poisoned) => *poisoned.into_inner().entry(step.to_string()).or_insert(0) += 1,
        }
    }

    /// Current counts, ordered by step name.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        match self.counts.lock() {
            Ok(counts) => counts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn total(&self) -> u64 {
        self.snapshot().values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_step() {
        let t = ErrorTally::new();
        t.record("summary_refine", &"timeout");
        t.record("summary_refine", &"http 500");
        t.record("similar_cases", &"bad json");
        let snap = t.snapshot();
        assert_eq!(snap["summary_refine"], 2);
        assert_eq!(snap["similar_cases"], 1);
        assert_eq!(t.total(), 3);
    }
}
