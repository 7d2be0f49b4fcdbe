//! Pre-computed label embeddings for fast scoring.
//!
//! A label bank stores a flat N×D matrix of text embeddings (one row per
//! taxonomy label). Built-in taxonomies are encoded once per process and
//! shared by every request through [`LabelBankCache`].

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::embedding::EmbeddingProvider;
use crate::error::{ClassifyError, ClipsightError, PipelineError};

use super::taxonomy::{Taxonomy, TaxonomyId, TaxonomyRegistry};

/// Text embeddings for every label of one taxonomy.
///
/// Stores a single flat matrix (N × D, row-major), rows in taxonomy order.
#[derive(Clone, Debug)]
pub struct LabelBank {
    matrix: Vec<f32>,
    embedding_dim: usize,
    term_count: usize,
}

impl LabelBank {
    /// Build a bank from per-label vectors.
    ///
    /// Every vector must have the same, non-zero dimension.
    pub fn from_vectors(vectors: Vec<Vec<f32>>) -> Result<Self, ClassifyError> {
        let embedding_dim = vectors
            .first()
            .map(|v| v.len())
            .ok_or(ClassifyError::EmptyLabelSet)?;
        let term_count = vectors.len();

        let mut matrix = Vec::with_capacity(term_count * embedding_dim);
        for v in &vectors {
            if v.len() != embedding_dim || v.is_empty() {
                return Err(ClassifyError::DimensionMismatch {
                    expected: embedding_dim,
                    actual: v.len(),
                });
            }
            matrix.extend_from_slice(v);
        }

        Ok(Self {
            matrix,
            embedding_dim,
            term_count,
        })
    }

    /// Encode all labels of a taxonomy in batches of `batch_size`.
    pub fn encode(
        taxonomy: &Taxonomy,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> Result<Self, ClipsightError> {
        let texts = taxonomy.texts();
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(batch_size.max(1)) {
            vectors.extend(provider.embed_texts(chunk)?);
        }

        if vectors.len() != texts.len() {
            return Err(PipelineError::Model {
                message: format!(
                    "Text encoder returned {} vectors for {} labels of taxonomy {}",
                    vectors.len(),
                    texts.len(),
                    taxonomy.name()
                ),
            }
            .into());
        }

        let bank = Self::from_vectors(vectors)?;
        tracing::debug!(
            "Encoded taxonomy {}: {} labels x {} dims",
            taxonomy.name(),
            bank.term_count,
            bank.embedding_dim
        );
        Ok(bank)
    }

    /// Rows of the matrix, one per label.
    pub fn rows(&self) -> Vec<&[f32]> {
        self.matrix.chunks(self.embedding_dim).collect()
    }

    /// Get the flat matrix for batch dot product.
    pub fn matrix(&self) -> &[f32] {
        &self.matrix
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Get the number of labels in the bank.
    pub fn term_count(&self) -> usize {
        self.term_count
    }
}

/// Populate-once, read-many store of label banks for built-in taxonomies.
///
/// Each slot is a `OnceCell`, so concurrent first accesses for the same
/// taxonomy resolve to a single encoded bank.
pub struct LabelBankCache {
    slots: HashMap<TaxonomyId, OnceCell<LabelBank>>,
    batch_size: usize,
}

impl LabelBankCache {
    pub fn new(batch_size: usize) -> Self {
        Self {
            slots: TaxonomyId::ALL
                .into_iter()
                .map(|id| (id, OnceCell::new()))
                .collect(),
            batch_size,
        }
    }

    /// Get the bank for a taxonomy, encoding it on first use.
    ///
    /// Ad-hoc taxonomies are never cached and are encoded on every call.
    pub fn get_or_encode(
        &self,
        taxonomy: &Taxonomy,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Cow<'_, LabelBank>, ClipsightError> {
        let slot = taxonomy.id().and_then(|id| self.slots.get(&id));
        match slot {
            Some(cell) => cell
                .get_or_try_init(|| LabelBank::encode(taxonomy, provider, self.batch_size))
                .map(Cow::Borrowed),
            None => LabelBank::encode(taxonomy, provider, self.batch_size).map(Cow::Owned),
        }
    }

    /// Encode every built-in taxonomy up front.
    pub fn warm(
        &self,
        registry: &TaxonomyRegistry,
        provider: &dyn EmbeddingProvider,
    ) -> Result<(), ClipsightError> {
        for taxonomy in registry.iter() {
            self.get_or_encode(taxonomy, provider)?;
        }
        tracing::info!("Label banks ready for {} taxonomies", self.cached_count());
        Ok(())
    }

    /// Number of taxonomies whose bank has been computed.
    pub fn cached_count(&self) -> usize {
        self.slots.values().filter(|cell| cell.get().is_some()).count()
    }
}
