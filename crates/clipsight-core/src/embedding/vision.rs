//! CLIP vision encoder session.
//!
//! Loads the vision tower of a CLIP model exported to ONNX format and runs
//! inference to produce projected image embeddings.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::PipelineError;

/// Wraps an ONNX Runtime session for CLIP image embedding.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct ClipVisionSession {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    /// Name of the projected embedding output.
    output_name: String,
}

impl ClipVisionSession {
    /// Load a CLIP vision encoder from an ONNX file.
    pub fn load(model_path: &Path, output_name: &str) -> Result<Self, PipelineError> {
        let session = Session::builder()
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to load vision model {:?}: {e}", model_path),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "pixel_values".to_string());

        tracing::debug!(
            "Loaded CLIP vision model from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name: output_name.to_string(),
        })
    }

    /// Run inference on a preprocessed image tensor and return the raw embedding.
    ///
    /// Input shape: \[1, 3, image_size, image_size\]. The output is not
    /// normalized; callers normalize before scoring.
    pub fn embed(&self, preprocessed: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        let shape: Vec<i64> = preprocessed.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = preprocessed.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| PipelineError::Embedding {
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self.session.lock().map_err(|e| PipelineError::Model {
            message: format!("Vision session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| PipelineError::Embedding {
            message: format!("ONNX inference failed: {e}"),
        })?;

        // The projected output shares the text tower's space; the hidden
        // states do not.
        let embeds = outputs
            .iter()
            .find(|(name, _)| *name == self.output_name)
            .ok_or_else(|| PipelineError::Embedding {
                message: format!("Vision model did not produce {}", self.output_name),
            })?;

        let (shape, data) =
            embeds
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Embedding {
                    message: format!("Failed to extract {} tensor: {e}", self.output_name),
                })?;

        match shape.len() {
            1 => Ok(data.to_vec()),
            2 => {
                let dim = shape[1] as usize;
                Ok(data[..dim].to_vec())
            }
            _ => Err(PipelineError::Embedding {
                message: format!("Unexpected {} shape: {:?}", self.output_name, shape),
            }),
        }
    }
}
