//! Ranks the labels of one taxonomy against an image vector.

use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::error::{ClassifyError, ClipsightError};
use crate::types::{AspectResult, ScoredLabel};

use super::label_bank::LabelBankCache;
use super::scorer;
use super::taxonomy::{Taxonomy, TaxonomyId, TaxonomyRegistry};

/// Zero-shot classifier over the built-in taxonomies and ad-hoc label sets.
///
/// Holds the embedding provider, the taxonomy registry, and the shared
/// text-vector cache. Safe to share across request threads.
pub struct AspectClassifier {
    provider: Arc<dyn EmbeddingProvider>,
    registry: TaxonomyRegistry,
    cache: LabelBankCache,
}

impl AspectClassifier {
    /// Create a classifier over the built-in registry.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, text_batch_size: usize) -> Self {
        Self {
            provider,
            registry: TaxonomyRegistry::builtin(),
            cache: LabelBankCache::new(text_batch_size),
        }
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    /// Encode the text vectors of every built-in taxonomy.
    pub fn warm(&self) -> Result<(), ClipsightError> {
        self.cache.warm(&self.registry, self.provider.as_ref())
    }

    /// Classify against a built-in taxonomy.
    pub fn classify_builtin(
        &self,
        image_vector: &[f32],
        id: TaxonomyId,
        top_k: usize,
    ) -> Result<AspectResult, ClipsightError> {
        self.classify(image_vector, self.registry.taxonomy(id), top_k)
    }

    /// Score `image_vector` against `taxonomy` and keep the `top_k` best labels.
    pub fn classify(
        &self,
        image_vector: &[f32],
        taxonomy: &Taxonomy,
        top_k: usize,
    ) -> Result<AspectResult, ClipsightError> {
        if top_k == 0 || top_k > taxonomy.len() {
            return Err(ClassifyError::InvalidTopK {
                top_k,
                len: taxonomy.len(),
            }
            .into());
        }

        let bank = self.cache.get_or_encode(taxonomy, self.provider.as_ref())?;
        let probabilities = scorer::score(image_vector, &bank.rows())?;
        let ranked = rank(&probabilities, top_k);

        let labels = ranked
            .into_iter()
            .enumerate()
            .map(|(position, (index, probability))| ScoredLabel {
                label: taxonomy.labels()[index].text.to_string(),
                index,
                probability,
                rank: position + 1,
            })
            .collect();

        Ok(AspectResult {
            taxonomy: taxonomy.name().to_string(),
            labels,
        })
    }
}

/// Indices of the `top_k` highest probabilities, best first.
///
/// The sort is stable, so equal probabilities keep taxonomy order and the
/// lower index wins.
pub fn rank(probabilities: &[f32], top_k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed.truncate(top_k);
    indexed
}
