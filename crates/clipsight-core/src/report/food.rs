//! Food analysis report: identification, metabolic estimates, and PCOS fit.
//!
//! Runs five independent classifications against one image vector, then maps
//! the winning labels through [`heuristics::derive`]. Field names follow the
//! camelCase JSON shape consumed by the mobile client.

use serde::Serialize;

use crate::classify::{AspectClassifier, TaxonomyId};
use crate::error::ClipsightError;

use super::heuristics::{self, GlycemicLevel, PcosStatus, ProteinLevel};

const CATEGORY_TOP_K: usize = 3;
const ITEM_TOP_K: usize = 5;
const ITEMS_REPORTED: usize = 3;

/// Serving phrases stripped from category labels before display.
const SERVING_PREFIXES: &[&str] = &["a plate of ", "a bowl of "];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodReport {
    pub identification: Identification,
    pub metabolic_stats: MetabolicStats,
    pub pcos_compatibility: PcosCompatibility,
    pub feedback: Feedback,
    pub confidence: PassConfidence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub main_dish: String,
    pub components: Vec<String>,
    pub detailed_items: Vec<DetailedItem>,
    pub approx_calories: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedItem {
    pub name: String,
    /// Percentage rounded to one decimal
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetabolicStats {
    pub glycemic_index: GlycemicLevel,
    /// Mirrors `glycemic_index`; not modeled separately.
    pub glycemic_load: GlycemicLevel,
    /// Mirrors `glycemic_index`; not modeled separately.
    pub insulin_spike_risk: GlycemicLevel,
    #[serde(rename = "totalProteing")]
    pub total_protein_g: u32,
    #[serde(rename = "totalCarbsg")]
    pub total_carbs_g: u32,
    #[serde(rename = "totalFiberg")]
    pub total_fiber_g: u32,
    #[serde(rename = "netCarbsg")]
    pub net_carbs_g: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PcosCompatibility {
    pub score: u32,
    pub status: PcosStatus,
    pub issues: Vec<String>,
    pub positives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub summary: String,
    pub improvement_tip: String,
}

/// Raw top-label probabilities (0.0 to 1.0) of the deciding passes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassConfidence {
    pub food: f32,
    pub gi: f32,
    pub pcos: f32,
}

/// Build a food report from one image vector.
///
/// Either every pass succeeds and the report is complete, or the first
/// failing pass fails the whole report.
pub fn analyze_food(
    classifier: &AspectClassifier,
    image_vector: &[f32],
) -> Result<FoodReport, ClipsightError> {
    let category = classifier.classify_builtin(image_vector, TaxonomyId::FoodCategory, CATEGORY_TOP_K)?;
    let items = classifier.classify_builtin(image_vector, TaxonomyId::FoodItem, ITEM_TOP_K)?;
    let gi = classifier.classify_builtin(image_vector, TaxonomyId::GlycemicIndex, 1)?;
    let pcos = classifier.classify_builtin(image_vector, TaxonomyId::PcosCompatibility, 1)?;
    let protein = classifier.classify_builtin(image_vector, TaxonomyId::ProteinLevel, 1)?;

    let gi_level = GlycemicLevel::from_index(gi.top().index)?;
    let pcos_status = PcosStatus::from_index(pcos.top().index)?;
    let protein_level = ProteinLevel::from_index(protein.top().index)?;
    let derived = heuristics::derive(gi_level, pcos_status, protein_level);

    let main_food = &category.top().label;
    let detailed_items: Vec<DetailedItem> = items
        .labels
        .iter()
        .take(ITEMS_REPORTED)
        .map(|item| DetailedItem {
            name: title_case(&item.label),
            confidence: round_one_decimal(item.confidence()),
        })
        .collect();

    tracing::debug!(
        "Food analysis: dish={:?} items={:?} gi={} pcos={} protein={}",
        main_food,
        detailed_items.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
        gi_level.as_str(),
        pcos_status.as_str(),
        protein_level.as_str()
    );

    Ok(FoodReport {
        identification: Identification {
            main_dish: display_dish(main_food),
            components: detailed_items.iter().map(|i| i.name.clone()).collect(),
            detailed_items,
            approx_calories: derived.approx_calories,
        },
        metabolic_stats: MetabolicStats {
            glycemic_index: gi_level,
            glycemic_load: gi_level,
            insulin_spike_risk: gi_level,
            total_protein_g: derived.total_protein_g,
            total_carbs_g: derived.total_carbs_g,
            total_fiber_g: derived.total_fiber_g,
            net_carbs_g: derived.net_carbs_g,
        },
        pcos_compatibility: PcosCompatibility {
            score: derived.pcos_score,
            status: pcos_status,
            issues: derived.issues,
            positives: derived.positives,
        },
        feedback: Feedback {
            summary: format!(
                "Detected {}. {} for PCOS diet.",
                main_food,
                pcos_status.as_str()
            ),
            improvement_tip: derived.improvement_tip,
        },
        confidence: PassConfidence {
            food: category.top().probability,
            gi: gi.top().probability,
            pcos: pcos.top().probability,
        },
    })
}

/// Category label without serving phrases, title-cased.
fn display_dish(label: &str) -> String {
    let stripped = SERVING_PREFIXES
        .iter()
        .fold(label.to_string(), |acc, prefix| acc.replace(prefix, ""));
    title_case(&stripped)
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

fn round_one_decimal(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
