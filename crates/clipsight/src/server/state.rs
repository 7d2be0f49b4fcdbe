use std::sync::Arc;
use std::time::Duration;

use clipsight_core::config::ServerConfig;
use clipsight_core::{Analyzer, Config, ImageDecoder};
use image::DynamicImage;

use super::error::{ServerError, ServerResult};
use super::extract::ImageSource;

/// Shared application state, read-only after startup.
pub struct AppState {
    /// Embedding model, taxonomies and label-vector cache
    pub analyzer: Arc<Analyzer>,

    /// Upload decoder with size and time limits
    pub decoder: ImageDecoder,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(analyzer: Analyzer, config: &Config) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            decoder: ImageDecoder::new(config.limits.clone()),
            config: config.server.clone(),
        }
    }

    /// Decode an uploaded image into an RGB raster.
    pub async fn decode(&self, source: ImageSource) -> ServerResult<DynamicImage> {
        let image = match source {
            ImageSource::Bytes(bytes) => self.decoder.decode_from_bytes(bytes).await,
            ImageSource::Base64(text) => self.decoder.decode_base64(&text).await,
        };
        image.map_err(|e| clipsight_core::ClipsightError::from(e).into())
    }

    /// Run CPU-bound analysis on the blocking pool, bounded by the
    /// configured request timeout.
    ///
    /// On timeout the worker keeps running to completion; only its result
    /// is discarded.
    pub async fn blocking<T, F>(&self, work: F) -> ServerResult<T>
    where
        F: FnOnce(&Analyzer) -> clipsight_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let analyzer = Arc::clone(&self.analyzer);
        let secs = self.config.request_timeout_secs;
        let task = tokio::task::spawn_blocking(move || work(&analyzer));

        match tokio::time::timeout(Duration::from_secs(secs), task).await {
            Ok(joined) => Ok(joined??),
            Err(_) => Err(ServerError::Timeout { secs }),
        }
    }
}
