//! API route handlers.
//!
//! - `GET /health`: liveness plus model and device
//! - `POST /classify`: rank caller-supplied labels
//! - `POST /embed`: normalized image embedding
//! - `POST /facial-features`: hirsutism and acne severity
//! - `POST /food-analyze`: food identification and PCOS report

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use clipsight_core::{FacialReport, FoodReport, ScoredLabel};
use serde::Serialize;
use serde_json::json;

use super::error::{ServerError, ServerResult};
use super::extract::ImageRequest;
use super::state::AppState;

/// Successful response: `"success": true` next to the payload fields.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Success<T> {
    pub fn new(body: T) -> Json<Self> {
        Json(Self {
            success: true,
            body,
        })
    }
}

/// One ranked label of a `/classify` response.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
    /// Probability as a percentage
    pub confidence: f32,
    pub rank: usize,
}

impl From<&ScoredLabel> for Prediction {
    fn from(scored: &ScoredLabel) -> Self {
        Self {
            label: scored.label.clone(),
            probability: scored.probability,
            confidence: scored.confidence(),
            rank: scored.rank,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub predictions: Vec<Prediction>,
    pub top_prediction: Prediction,
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
    pub dimension: usize,
}

/// Liveness check with model and device.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "device": state.analyzer.device(),
        "model": state.analyzer.model_name(),
    }))
}

/// Rank the comma-separated `labels` against the image.
pub async fn classify(
    State(state): State<Arc<AppState>>,
    request: ImageRequest,
) -> ServerResult<Json<Success<ClassifyResponse>>> {
    let labels = request.label_list();
    if labels.is_empty() {
        return Err(ServerError::BadRequest("No labels provided".to_string()));
    }

    let image = state.decode(request.image).await?;
    let result = state
        .blocking(move |analyzer| {
            let vector = analyzer.embed_image(&image)?;
            analyzer.classify_labels(&vector, labels)
        })
        .await?;

    let predictions: Vec<Prediction> = result.labels.iter().map(Prediction::from).collect();
    let top_prediction = Prediction::from(result.top());
    tracing::info!(
        "Classified against {} labels: top={:?} ({:.1}%)",
        predictions.len(),
        top_prediction.label,
        top_prediction.confidence
    );

    Ok(Success::new(ClassifyResponse {
        predictions,
        top_prediction,
    }))
}

/// Return the normalized image embedding.
pub async fn embed(
    State(state): State<Arc<AppState>>,
    request: ImageRequest,
) -> ServerResult<Json<Success<EmbedResponse>>> {
    let image = state.decode(request.image).await?;
    let embedding = state
        .blocking(move |analyzer| analyzer.embed_image(&image))
        .await?;

    Ok(Success::new(EmbedResponse {
        dimension: embedding.len(),
        embedding,
    }))
}

/// Hirsutism and acne severity for a face image.
pub async fn facial_features(
    State(state): State<Arc<AppState>>,
    request: ImageRequest,
) -> ServerResult<Json<Success<FacialReport>>> {
    let image = state.decode(request.image).await?;
    let report = state
        .blocking(move |analyzer| {
            let vector = analyzer.embed_image(&image)?;
            analyzer.assess_facial_features(&vector)
        })
        .await?;

    tracing::info!(
        "Facial features: hirsutism={} acne={}",
        report.hirsutism.severity_score,
        report.acne.severity_score
    );
    Ok(Success::new(report))
}

/// Food identification, metabolic estimates and PCOS compatibility.
pub async fn food_analyze(
    State(state): State<Arc<AppState>>,
    request: ImageRequest,
) -> ServerResult<Json<Success<FoodReport>>> {
    let image = state.decode(request.image).await?;
    let report = state
        .blocking(move |analyzer| {
            let vector = analyzer.embed_image(&image)?;
            analyzer.analyze_food(&vector)
        })
        .await?;

    tracing::info!(
        "Food analysis: {} ({})",
        report.identification.main_dish,
        report.pcos_compatibility.status.as_str()
    );
    Ok(Success::new(report))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
