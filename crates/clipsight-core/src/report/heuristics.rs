//! Nutrition and PCOS heuristics derived from classification indices.
//!
//! These are deliberately coarse lookup rules, not a nutrition model. Every
//! derived food-report field that is not a label or a confidence comes from
//! [`derive`], so a model-backed estimator can replace it in one place.

use serde::Serialize;

use crate::error::ClassifyError;

/// Glycemic index level, in `glycemic_index` taxonomy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GlycemicLevel {
    Low,
    Medium,
    High,
}

/// PCOS diet suitability, in `pcos_compatibility` taxonomy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PcosStatus {
    Safe,
    Caution,
    Avoid,
}

/// Protein content, in `protein_level` taxonomy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProteinLevel {
    High,
    Moderate,
    Low,
}

macro_rules! indexed_level {
    ($ty:ident, $taxonomy:literal, [$($variant:ident),+]) => {
        impl $ty {
            const ORDER: &'static [$ty] = &[$($ty::$variant),+];

            /// Map a taxonomy position to its level.
            pub fn from_index(index: usize) -> Result<Self, ClassifyError> {
                Self::ORDER
                    .get(index)
                    .copied()
                    .ok_or_else(|| ClassifyError::LabelOutOfRange {
                        taxonomy: $taxonomy.to_string(),
                        index,
                    })
            }

            /// Taxonomy position of this level.
            pub fn index(self) -> u32 {
                self as u32
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

indexed_level!(GlycemicLevel, "glycemic_index", [Low, Medium, High]);
indexed_level!(PcosStatus, "pcos_compatibility", [Safe, Caution, Avoid]);
indexed_level!(ProteinLevel, "protein_level", [High, Moderate, Low]);

impl ProteinLevel {
    /// Estimated protein grams per serving.
    pub fn grams(self) -> u32 {
        match self {
            ProteinLevel::High => 30,
            ProteinLevel::Moderate => 15,
            ProteinLevel::Low => 5,
        }
    }
}

/// Minimum protein grams that count as a positive.
const GOOD_PROTEIN_GRAMS: u32 = 20;

const HIGH_GI_ISSUE: &str = "High GI detected";
const GOOD_PROTEIN_POSITIVE: &str = "Good protein content";
const HIGH_GI_TIP: &str = "Add leafy greens for fiber.";
const DEFAULT_TIP: &str = "Good choice!";

/// Every heuristic field of a food report.
#[derive(Debug, Clone, PartialEq)]
pub struct Heuristics {
    pub approx_calories: u32,
    pub total_protein_g: u32,
    pub total_carbs_g: u32,
    pub total_fiber_g: u32,
    pub net_carbs_g: u32,
    /// 100 for Safe, 50 for Caution, 0 for Avoid
    pub pcos_score: u32,
    pub issues: Vec<String>,
    pub positives: Vec<String>,
    pub improvement_tip: String,
}

/// Derive the heuristic fields from the top glycemic, PCOS and protein labels.
pub fn derive(gi: GlycemicLevel, pcos: PcosStatus, protein: ProteinLevel) -> Heuristics {
    let gi_idx = gi.index();
    let pcos_idx = pcos.index();
    let total_protein_g = protein.grams();

    let mut issues = Vec::new();
    if gi == GlycemicLevel::High {
        issues.push(HIGH_GI_ISSUE.to_string());
    }

    let mut positives = Vec::new();
    if total_protein_g >= GOOD_PROTEIN_GRAMS {
        positives.push(GOOD_PROTEIN_POSITIVE.to_string());
    }

    let improvement_tip = if gi == GlycemicLevel::High {
        HIGH_GI_TIP
    } else {
        DEFAULT_TIP
    };

    Heuristics {
        approx_calories: 300 + pcos_idx * 150,
        total_protein_g,
        total_carbs_g: 30 + gi_idx * 20,
        total_fiber_g: 15 - gi_idx * 5,
        net_carbs_g: 25 + gi_idx * 15,
        pcos_score: ((1.0 - pcos_idx as f32 / 2.0) * 100.0) as u32,
        issues,
        positives,
        improvement_tip: improvement_tip.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcos_score_per_status() {
        let score = |pcos| derive(GlycemicLevel::Low, pcos, ProteinLevel::Low).pcos_score;
        assert_eq!(score(PcosStatus::Safe), 100);
        assert_eq!(score(PcosStatus::Caution), 50);
        assert_eq!(score(PcosStatus::Avoid), 0);
    }

    #[test]
    fn test_calories_follow_pcos_index() {
        let calories =
            |pcos| derive(GlycemicLevel::Low, pcos, ProteinLevel::Low).approx_calories;
        assert_eq!(calories(PcosStatus::Safe), 300);
        assert_eq!(calories(PcosStatus::Caution), 450);
        assert_eq!(calories(PcosStatus::Avoid), 600);
    }

    #[test]
    fn test_high_gi_macros_and_issue() {
        let h = derive(GlycemicLevel::High, PcosStatus::Caution, ProteinLevel::Low);
        assert_eq!(h.total_carbs_g, 70);
        assert_eq!(h.total_fiber_g, 5);
        assert_eq!(h.net_carbs_g, 55);
        assert_eq!(h.issues, vec!["High GI detected"]);
        assert_eq!(h.improvement_tip, "Add leafy greens for fiber.");
    }

    #[test]
    fn test_low_gi_macros() {
        let h = derive(GlycemicLevel::Low, PcosStatus::Safe, ProteinLevel::Moderate);
        assert_eq!(h.total_carbs_g, 30);
        assert_eq!(h.total_fiber_g, 15);
        assert_eq!(h.net_carbs_g, 25);
        assert!(h.issues.is_empty());
        assert_eq!(h.improvement_tip, "Good choice!");
    }

    #[test]
    fn test_protein_table_and_positive() {
        let h = derive(GlycemicLevel::Medium, PcosStatus::Safe, ProteinLevel::High);
        assert_eq!(h.total_protein_g, 30);
        assert_eq!(h.positives, vec!["Good protein content"]);

        let h = derive(GlycemicLevel::Medium, PcosStatus::Safe, ProteinLevel::Moderate);
        assert_eq!(h.total_protein_g, 15);
        assert!(h.positives.is_empty());

        assert_eq!(ProteinLevel::Low.grams(), 5);
    }

    #[test]
    fn test_level_from_index() {
        assert_eq!(GlycemicLevel::from_index(2).unwrap(), GlycemicLevel::High);
        assert_eq!(PcosStatus::from_index(1).unwrap(), PcosStatus::Caution);
        assert_eq!(ProteinLevel::from_index(0).unwrap(), ProteinLevel::High);
        assert_eq!(PcosStatus::Avoid.as_str(), "Avoid");

        let err = GlycemicLevel::from_index(3).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::LabelOutOfRange {
                taxonomy: "glycemic_index".into(),
                index: 3
            }
        );
    }
}
