//! CLIP embedding generation.
//!
//! Maps images and label text into a shared vector space using the CLIP
//! vision and text encoders running locally via ONNX Runtime.
//!
//! # Usage
//!
//! ```rust,ignore
//! use clipsight_core::config::Config;
//! use clipsight_core::embedding::{ClipEmbedder, EmbeddingProvider};
//!
//! let config = Config::default();
//! let embedder = ClipEmbedder::load(&config.embedding, &config.model_dir())?;
//! let vector = embedder.embed_image(&decoded_image)?;
//! // vector is a raw 512-dim Vec<f32>; normalize before scoring
//! ```

pub(crate) mod preprocess;
pub(crate) mod text;
pub(crate) mod vision;

mod fixed;
mod provider;

pub use fixed::FixedEmbedder;
pub use provider::EmbeddingProvider;

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::config::EmbeddingConfig;
use crate::error::PipelineError;

use self::preprocess::preprocess;
use self::text::ClipTextEncoder;
use self::vision::ClipVisionSession;

/// Vision encoder ONNX file, relative to the model directory.
pub const VISION_MODEL_FILE: &str = "onnx/vision_model.onnx";

/// Text encoder ONNX file, relative to the model directory.
pub const TEXT_MODEL_FILE: &str = "onnx/text_model.onnx";

/// Tokenizer file, relative to the model directory.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Files that must be present for [`ClipEmbedder::load`] to succeed.
pub const REQUIRED_FILES: [&str; 3] = [VISION_MODEL_FILE, TEXT_MODEL_FILE, TOKENIZER_FILE];

/// CLIP image and text embedder backed by ONNX Runtime.
pub struct ClipEmbedder {
    vision: ClipVisionSession,
    text: ClipTextEncoder,
    model_name: String,
    image_size: u32,
}

impl ClipEmbedder {
    /// Load both CLIP encoders.
    ///
    /// Expects the model files under `{model_dir}/{model_name}/`.
    pub fn load(config: &EmbeddingConfig, model_dir: &Path) -> Result<Self, PipelineError> {
        let root = Self::model_root(config, model_dir);

        if let Some(missing) = Self::missing_files(config, model_dir).first() {
            return Err(PipelineError::Model {
                message: format!(
                    "Model file not found at {:?}. Run `clipsight models download` first.",
                    missing
                ),
            });
        }

        tracing::info!("Loading CLIP model from {:?}", root);
        let vision = ClipVisionSession::load(&root.join(VISION_MODEL_FILE), &config.image_output)?;
        let text = ClipTextEncoder::load(
            &root.join(TEXT_MODEL_FILE),
            &root.join(TOKENIZER_FILE),
            config.max_text_length,
            &config.text_output,
        )?;
        tracing::info!("CLIP model loaded successfully");

        Ok(Self {
            vision,
            text,
            model_name: config.model.clone(),
            image_size: config.image_size,
        })
    }

    /// Directory holding the files of the configured model.
    pub fn model_root(config: &EmbeddingConfig, model_dir: &Path) -> PathBuf {
        model_dir.join(&config.model)
    }

    /// Required model files that are not on disk.
    pub fn missing_files(config: &EmbeddingConfig, model_dir: &Path) -> Vec<PathBuf> {
        let root = Self::model_root(config, model_dir);
        REQUIRED_FILES
            .iter()
            .map(|file| root.join(file))
            .filter(|path| !path.exists())
            .collect()
    }

    /// Check whether all model files exist on disk.
    pub fn model_exists(config: &EmbeddingConfig, model_dir: &Path) -> bool {
        Self::missing_files(config, model_dir).is_empty()
    }
}

impl EmbeddingProvider for ClipEmbedder {
    fn embed_image(&self, image: &DynamicImage) -> Result<Vec<f32>, PipelineError> {
        let tensor = preprocess(image, self.image_size);
        self.vision.embed(&tensor)
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        self.text.encode_batch(texts)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn device(&self) -> &str {
        "cpu"
    }
}
