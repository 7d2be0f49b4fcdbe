//! Deterministic, model-free embedding provider.
//!
//! Every image maps to the same vector and every text maps to a basis vector
//! picked by hashing the text, unless an explicit vector was registered for
//! it. Used by tests and benches to drive the classification pipeline
//! without ONNX model files.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::DynamicImage;

use crate::error::PipelineError;

use super::provider::EmbeddingProvider;

/// Embedding provider with hand-assigned vectors.
pub struct FixedEmbedder {
    dim: usize,
    image: Vec<f32>,
    texts: HashMap<String, Vec<f32>>,
    text_calls: AtomicUsize,
}

impl FixedEmbedder {
    /// Create a provider of the given dimension.
    ///
    /// The image vector defaults to the first basis vector; unregistered
    /// texts never land on it, so they all score zero similarity.
    pub fn new(dim: usize) -> Self {
        let mut image = vec![0.0; dim];
        if let Some(first) = image.first_mut() {
            *first = 1.0;
        }
        Self {
            dim,
            image,
            texts: HashMap::new(),
            text_calls: AtomicUsize::new(0),
        }
    }

    /// Replace the vector returned for every image.
    pub fn with_image(mut self, vector: Vec<f32>) -> Self {
        self.image = vector;
        self
    }

    /// Register the vector returned for one text.
    pub fn with_text(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.texts.insert(text.into(), vector);
        self
    }

    /// Make `text` identical in direction to the image vector.
    pub fn matching(self, text: impl Into<String>) -> Self {
        let image = self.image.clone();
        self.with_text(text, image)
    }

    /// The vector returned for every image.
    pub fn image_vector(&self) -> &[f32] {
        &self.image
    }

    /// Number of `embed_texts` calls served so far.
    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::Relaxed)
    }

    fn text_vector(&self, text: &str) -> Vec<f32> {
        if let Some(v) = self.texts.get(text) {
            return v.clone();
        }
        let mut v = vec![0.0; self.dim];
        if self.dim > 1 {
            let slot = 1 + (fnv1a(text) % (self.dim as u64 - 1)) as usize;
            v[slot] = 1.0;
        }
        v
    }
}

impl EmbeddingProvider for FixedEmbedder {
    fn embed_image(&self, _image: &DynamicImage) -> Result<Vec<f32>, PipelineError> {
        Ok(self.image.clone())
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        self.text_calls.fetch_add(1, Ordering::Relaxed);
        Ok(texts.iter().map(|t| self.text_vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "fixed"
    }

    fn device(&self) -> &str {
        "cpu"
    }
}

fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_texts_are_orthogonal_to_image() {
        let provider = FixedEmbedder::new(16);
        let vectors = provider
            .embed_texts(&["apple".to_string(), "banana".to_string()])
            .unwrap();
        for v in &vectors {
            assert_eq!(v.len(), 16);
            assert_eq!(v[0], 0.0);
            assert_eq!(v.iter().sum::<f32>(), 1.0);
        }
    }

    #[test]
    fn test_matching_text_follows_image() {
        let provider = FixedEmbedder::new(4).matching("apple");
        let vectors = provider.embed_texts(&["apple".to_string()]).unwrap();
        assert_eq!(vectors[0], provider.image_vector());
    }

    #[test]
    fn test_text_vectors_are_deterministic() {
        let a = FixedEmbedder::new(32);
        let b = FixedEmbedder::new(32);
        let texts = vec!["moderate protein food".to_string()];
        assert_eq!(a.embed_texts(&texts).unwrap(), b.embed_texts(&texts).unwrap());
        assert_eq!(a.text_calls(), 1);
    }
}
