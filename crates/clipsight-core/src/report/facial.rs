//! Facial feature report: hirsutism and acne severity.

use serde::{Deserialize, Serialize};

use crate::classify::{AspectClassifier, TaxonomyId};
use crate::error::ClipsightError;
use crate::types::AspectResult;

/// Top match of one severity taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityAssessment {
    /// Winning label text
    pub top_match: String,

    /// Probability of the winning label as a percentage
    pub confidence: f32,

    /// Taxonomy position of the winning label; higher is more severe
    pub severity_score: usize,
}

impl From<&AspectResult> for SeverityAssessment {
    fn from(result: &AspectResult) -> Self {
        let top = result.top();
        Self {
            top_match: top.label.clone(),
            confidence: top.confidence(),
            severity_score: top.index,
        }
    }
}

/// Hirsutism (0-4) and acne (0-3) severity for one face image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacialReport {
    pub hirsutism: SeverityAssessment,
    pub acne: SeverityAssessment,
}

/// Classify hirsutism and acne severity from one image vector.
///
/// The two aspects are scored independently against the same embedding.
pub fn assess_facial_features(
    classifier: &AspectClassifier,
    image_vector: &[f32],
) -> Result<FacialReport, ClipsightError> {
    let hirsutism = classifier.classify_builtin(image_vector, TaxonomyId::Hirsutism, 1)?;
    let acne = classifier.classify_builtin(image_vector, TaxonomyId::Acne, 1)?;

    tracing::debug!(
        "Facial features: hirsutism={} acne={}",
        hirsutism.top().index,
        acne.top().index
    );

    Ok(FacialReport {
        hirsutism: SeverityAssessment::from(&hirsutism),
        acne: SeverityAssessment::from(&acne),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::FixedEmbedder;
    use std::sync::Arc;

    #[test]
    fn test_severity_scores_follow_taxonomy_position() {
        let provider = FixedEmbedder::new(32)
            .matching("moderate facial hair on chin")
            .matching("severe acne with many pimples and inflammation");
        let image = provider.image_vector().to_vec();
        let classifier = AspectClassifier::new(Arc::new(provider), 16);

        let report = assess_facial_features(&classifier, &image).unwrap();
        assert_eq!(report.hirsutism.top_match, "moderate facial hair on chin");
        assert_eq!(report.hirsutism.severity_score, 3);
        assert!(report.hirsutism.confidence > 99.0 && report.hirsutism.confidence <= 100.0);
        assert_eq!(
            report.acne.top_match,
            "severe acne with many pimples and inflammation"
        );
        assert_eq!(report.acne.severity_score, 3);
    }

    #[test]
    fn test_no_signal_defaults_to_lowest_severity() {
        let provider = FixedEmbedder::new(32);
        let image = provider.image_vector().to_vec();
        let classifier = AspectClassifier::new(Arc::new(provider), 16);

        let report = assess_facial_features(&classifier, &image).unwrap();
        assert_eq!(report.hirsutism.severity_score, 0);
        assert_eq!(report.hirsutism.top_match, "no facial hair");
        assert!((report.hirsutism.confidence - 20.0).abs() < 1e-3);
        assert_eq!(report.acne.severity_score, 0);
        assert!((report.acne.confidence - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_report_serializes_snake_case_fields() {
        let provider = FixedEmbedder::new(8);
        let image = provider.image_vector().to_vec();
        let classifier = AspectClassifier::new(Arc::new(provider), 16);

        let report = assess_facial_features(&classifier, &image).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["hirsutism"]["top_match"].is_string());
        assert!(json["acne"]["severity_score"].is_u64());
        assert!(json["acne"]["confidence"].is_f64());
    }
}
