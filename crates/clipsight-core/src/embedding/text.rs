//! CLIP text encoder for label prompts.
//!
//! Loads the CLIP text ONNX model and tokenizer, encoding label text into
//! vectors in the same space as the vision encoder.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::error::PipelineError;

/// CLIP text encoder wrapper.
///
/// Uses the same `Mutex<Session>` pattern as the vision encoder.
pub struct ClipTextEncoder {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
    max_length: usize,
    output_name: String,
}

impl ClipTextEncoder {
    /// Load the text model and tokenizer.
    pub fn load(
        model_path: &Path,
        tokenizer_path: &Path,
        max_length: usize,
        output_name: &str,
    ) -> Result<Self, PipelineError> {
        let session = Session::builder()
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to load text model {:?}: {e}", model_path),
            })?;

        let tokenizer = tokenizers::Tokenizer::from_file(tokenizer_path).map_err(|e| {
            PipelineError::Model {
                message: format!("Failed to load tokenizer: {e}"),
            }
        })?;

        tracing::debug!(
            "Loaded CLIP text model (inputs: {:?}, outputs: {:?})",
            session
                .inputs()
                .iter()
                .map(|i| i.name())
                .collect::<Vec<_>>(),
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            max_length,
            output_name: output_name.to_string(),
        })
    }

    /// Encode a batch of texts to raw (unnormalized) embeddings.
    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        let batch_size = texts.len();
        if batch_size == 0 {
            return Ok(Vec::new());
        }
        let max_length = self.max_length;

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| PipelineError::Model {
                message: format!("Tokenization failed: {e}"),
            })?;

        // Zero-padded ids with a matching attention mask.
        let mut input_ids = vec![0i64; batch_size * max_length];
        let mut attention_mask = vec![0i64; batch_size * max_length];

        for (i, encoding) in encodings.iter().enumerate() {
            let (ids, mask) =
                fit_sequence(encoding.get_ids(), encoding.get_attention_mask(), max_length);
            let row = i * max_length;
            for (j, (id, m)) in ids.into_iter().zip(mask).enumerate() {
                input_ids[row + j] = id as i64;
                attention_mask[row + j] = m as i64;
            }
        }

        let shape = vec![batch_size as i64, max_length as i64];
        let input_ids_value =
            Value::from_array((shape.clone(), input_ids)).map_err(|e| PipelineError::Model {
                message: format!("Failed to create input_ids tensor: {e}"),
            })?;
        let attention_mask_value =
            Value::from_array((shape, attention_mask)).map_err(|e| PipelineError::Model {
                message: format!("Failed to create attention_mask tensor: {e}"),
            })?;

        let mut session = self.session.lock().map_err(|e| PipelineError::Model {
            message: format!("Text encoder lock poisoned: {e}"),
        })?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_value,
                "attention_mask" => attention_mask_value
            ])
            .map_err(|e| PipelineError::Model {
                message: format!("Text encoder inference failed: {e}"),
            })?;

        let embeds = outputs
            .iter()
            .find(|(name, _)| *name == self.output_name)
            .ok_or_else(|| PipelineError::Model {
                message: format!("Text encoder did not produce {}", self.output_name),
            })?;

        let (shape, data) = embeds
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to extract {}: {e}", self.output_name),
            })?;

        let embedding_dim = match shape.len() {
            2 => shape[1] as usize,
            _ => {
                return Err(PipelineError::Model {
                    message: format!("Unexpected {} shape: {:?}", self.output_name, shape),
                });
            }
        };

        Ok(data
            .chunks(embedding_dim)
            .take(batch_size)
            .map(<[f32]>::to_vec)
            .collect())
    }
}

/// Clip a token sequence to `max_length`, keeping its final (end) token.
fn truncate_ids<T: Copy>(ids: &[T], max_length: usize) -> Vec<T> {
    if ids.len() <= max_length {
        return ids.to_vec();
    }
    let mut kept = ids[..max_length].to_vec();
    if let (Some(last), Some(&end)) = (kept.last_mut(), ids.last()) {
        *last = end;
    }
    kept
}

/// Drop tokenizer-side padding, then truncate ids and mask together to
/// `max_length`, keeping the end token.
fn fit_sequence(ids: &[u32], mask: &[u32], max_length: usize) -> (Vec<u32>, Vec<u32>) {
    let len = mask
        .iter()
        .rposition(|&m| m != 0)
        .map_or(0, |last| last + 1)
        .min(ids.len());
    (
        truncate_ids(&ids[..len], max_length),
        truncate_ids(&mask[..len], max_length),
    )
}
