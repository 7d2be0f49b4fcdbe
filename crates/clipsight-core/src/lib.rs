//! Clipsight Core - zero-shot image classification over CLIP embeddings.
//!
//! Clipsight scores an image against fixed text label sets in a shared
//! image/text embedding space and aggregates the winning labels into
//! domain reports: facial feature severity and food analysis.
//!
//! # Architecture
//!
//! ```text
//! Image → Decode → Embed (CLIP) → Score vs. label bank → Rank → Report
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use clipsight_core::{Analyzer, Config, ImageDecoder};
//!
//! let config = Config::load()?;
//! let analyzer = Analyzer::load(&config)?;
//! let image = ImageDecoder::new(config.limits.clone()).decode_from_bytes(bytes).await?;
//!
//! let vector = analyzer.embed_image(&image)?;
//! let report = analyzer.analyze_food(&vector)?;
//! println!("Main dish: {}", report.identification.main_dish);
//! ```

pub mod classify;
pub mod config;
pub mod decode;
pub mod embedding;
pub mod error;
pub mod math;
pub mod report;
pub mod types;

pub use classify::{AspectClassifier, Taxonomy, TaxonomyId, TaxonomyRegistry};
pub use config::Config;
pub use decode::ImageDecoder;
pub use embedding::{ClipEmbedder, EmbeddingProvider, FixedEmbedder};
pub use error::{ClassifyError, ClipsightError, ConfigError, PipelineError, PipelineResult, Result};
pub use report::{FacialReport, FoodReport};
pub use types::{AspectResult, ScoredLabel};

use std::sync::Arc;

use image::DynamicImage;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point bundling the embedding provider and the classifier.
///
/// All methods are synchronous and CPU-bound; async callers should run them
/// on a blocking thread.
pub struct Analyzer {
    classifier: AspectClassifier,
}

impl Analyzer {
    /// Create an analyzer over any embedding provider.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, text_batch_size: usize) -> Self {
        tracing::debug!("Initializing clipsight v{}", VERSION);
        Self {
            classifier: AspectClassifier::new(provider, text_batch_size),
        }
    }

    /// Load the CLIP model named by `config`.
    pub fn load(config: &Config) -> Result<Self> {
        let embedder = ClipEmbedder::load(&config.embedding, &config.model_dir())?;
        Ok(Self::new(
            Arc::new(embedder),
            config.embedding.text_batch_size,
        ))
    }

    /// Encode and cache the label vectors of every built-in taxonomy.
    pub fn warm(&self) -> Result<()> {
        self.classifier.warm()
    }

    pub fn classifier(&self) -> &AspectClassifier {
        &self.classifier
    }

    /// Embed an image and L2-normalize the result.
    pub fn embed_image(&self, image: &DynamicImage) -> Result<Vec<f32>> {
        let raw = self.classifier.provider().embed_image(image)?;
        math::try_l2_normalize(&raw)
            .ok_or_else(|| ClassifyError::DegenerateVector { index: None }.into())
    }

    /// Rank caller-supplied labels, returning all of them best first.
    pub fn classify_labels(&self, image_vector: &[f32], labels: Vec<String>) -> Result<AspectResult> {
        let taxonomy = Taxonomy::adhoc(labels)?;
        self.classifier
            .classify(image_vector, &taxonomy, taxonomy.len())
    }

    /// Hirsutism and acne severity.
    pub fn assess_facial_features(&self, image_vector: &[f32]) -> Result<FacialReport> {
        report::assess_facial_features(&self.classifier, image_vector)
    }

    /// Food identification, metabolic estimates and PCOS compatibility.
    pub fn analyze_food(&self, image_vector: &[f32]) -> Result<FoodReport> {
        report::analyze_food(&self.classifier, image_vector)
    }

    pub fn model_name(&self) -> &str {
        self.classifier.provider().model_name()
    }

    pub fn device(&self) -> &str {
        self.classifier.provider().device()
    }
}
