//! Quality check records

use serde::{Deserialize, Serialize};

/// Outcome of a quality check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QcResult {
    Approved,
    Rejected,
    Rework,
}

/// Sensory check of a finished batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheck {
    pub appearance: String,
    pub clarity: String,
    pub odor_match: String,
    pub result: QcResult,
}
