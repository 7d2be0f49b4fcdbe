//! The seam between the classification pipeline and the embedding model.

use image::DynamicImage;

use crate::error::PipelineError;

/// Maps images and text into a shared embedding space.
///
/// Implementations are shared across concurrent requests and must not
/// change their outputs after construction. Vectors from one provider are
/// only comparable with vectors from the same provider.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one decoded image.
    fn embed_image(&self, image: &DynamicImage) -> Result<Vec<f32>, PipelineError>;

    /// Embed a batch of texts, one vector per input, in input order.
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError>;

    /// Model identifier reported by the health endpoint.
    fn model_name(&self) -> &str;

    /// Compute device the model runs on.
    fn device(&self) -> &str;
}
