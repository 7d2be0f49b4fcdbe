//! Calibrated similarity scoring of one image vector against a label set.
//!
//! Both sides are L2-normalized so the dot product is cosine similarity,
//! then scaled by CLIP's logit temperature and pushed through a softmax to
//! form a closed-set distribution over the labels.

use crate::error::ClassifyError;
use crate::math;

/// CLIP logit scale. Tied to the embedding model; changing it changes every
/// reported probability.
pub const TEMPERATURE: f32 = 100.0;

/// Score an image vector against a set of text vectors.
///
/// Returns one probability per text vector, in input order, summing to 1.
/// Ranking is left to the caller.
pub fn score<V: AsRef<[f32]>>(
    image_vector: &[f32],
    text_vectors: &[V],
) -> Result<Vec<f32>, ClassifyError> {
    let first = text_vectors.first().ok_or(ClassifyError::EmptyLabelSet)?;

    let dim = image_vector.len();
    if dim == 0 {
        return Err(ClassifyError::DimensionMismatch {
            expected: first.as_ref().len(),
            actual: 0,
        });
    }
    if let Some(bad) = text_vectors.iter().find(|t| t.as_ref().len() != dim) {
        return Err(ClassifyError::DimensionMismatch {
            expected: dim,
            actual: bad.as_ref().len(),
        });
    }

    let image = math::try_l2_normalize(image_vector)
        .ok_or(ClassifyError::DegenerateVector { index: None })?;

    let logits = text_vectors
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let text = math::try_l2_normalize(text.as_ref())
                .ok_or(ClassifyError::DegenerateVector { index: Some(i) })?;
            Ok(TEMPERATURE * math::dot(&image, &text))
        })
        .collect::<Result<Vec<f32>, ClassifyError>>()?;

    Ok(math::softmax(&logits))
}
