//! Core data types produced by the classification pipeline.

use serde::{Deserialize, Serialize};

/// One taxonomy label with its probability and rank for a given image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLabel {
    /// The label text
    pub label: String,

    /// Position of the label within its taxonomy
    pub index: usize,

    /// Share of the closed-set softmax distribution, 0.0 to 1.0
    pub probability: f32,

    /// 1-based rank, 1 being the most probable
    pub rank: usize,
}

impl ScoredLabel {
    /// Probability as a percentage.
    pub fn confidence(&self) -> f32 {
        self.probability * 100.0
    }
}

/// The top-K labels of one taxonomy for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AspectResult {
    /// Name of the taxonomy that was scored
    pub taxonomy: String,

    /// Ranked labels, most probable first; never empty
    pub labels: Vec<ScoredLabel>,
}

impl AspectResult {
    /// The most probable label.
    pub fn top(&self) -> &ScoredLabel {
        // top_k >= 1 is enforced before an AspectResult is built.
        &self.labels[0]
    }
}
