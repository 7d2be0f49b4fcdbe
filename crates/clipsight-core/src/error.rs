//! Error types for the clipsight classification pipeline.
//!
//! Errors are split by concern so callers can tell malformed input apart
//! from provider/taxonomy inconsistencies and wiring mistakes.

use thiserror::Error;

/// Top-level error type for clipsight operations.
#[derive(Error, Debug)]
pub enum ClipsightError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image decoding and embedding errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Scoring and classification errors
    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),
}

impl ClipsightError {
    /// Whether the failure was caused by the caller's input rather than
    /// by the service itself.
    pub fn is_client_error(&self) -> bool {
        match self {
            ClipsightError::Pipeline(e) => e.is_client_error(),
            ClipsightError::Classify(ClassifyError::EmptyLabelSet) => true,
            _ => false,
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures of the scoring and classification stages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// Image and text vectors have different (or zero) dimensions
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No candidate labels to score against
    #[error("Label set is empty")]
    EmptyLabelSet,

    /// A vector has zero or non-finite norm and cannot be normalized.
    /// `index` is `None` for the image vector, `Some(i)` for text vector `i`.
    #[error("Degenerate vector (zero or non-finite norm) at {}", describe_vector(.index))]
    DegenerateVector { index: Option<usize> },

    /// Requested more results than labels, or zero results
    #[error("Invalid top_k {top_k} for taxonomy of {len} labels")]
    InvalidTopK { top_k: usize, len: usize },

    /// Taxonomy name not present in the registry
    #[error("Unknown taxonomy: {0}")]
    UnknownTaxonomy(String),

    /// A ranked label position has no domain meaning in its taxonomy
    #[error("Label index {index} out of range for taxonomy {taxonomy}")]
    LabelOutOfRange { taxonomy: String, index: usize },
}

fn describe_vector(index: &Option<usize>) -> String {
    match index {
        None => "image vector".to_string(),
        Some(i) => format!("text vector {i}"),
    }
}

/// Decoding and embedding errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Request carried no usable image or labels
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Image decoding failed
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Embedding generation failed
    #[error("Embedding failed: {message}")]
    Embedding { message: String },

    /// Model loading or text encoder failure
    #[error("Model error: {message}")]
    Model { message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// Image dimensions exceed limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge {
        width: u32,
        height: u32,
        max_dim: u32,
    },
}

impl PipelineError {
    /// Whether this error stems from bad request input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidInput(_)
                | PipelineError::Decode { .. }
                | PipelineError::ImageTooLarge { .. }
        )
    }
}

/// Convenience type alias for clipsight results.
pub type Result<T> = std::result::Result<T, ClipsightError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
