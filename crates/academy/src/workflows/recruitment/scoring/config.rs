use serde::{Deserialize, Serialize};

/// Default overall average a test must reach to count as passed.
pub const DEFAULT_PASS_THRESHOLD: u8 = 60;

/// Rubric configuration shared by the aggregator and the eligibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub pass_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}
