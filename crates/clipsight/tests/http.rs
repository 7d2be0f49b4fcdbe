//! End-to-end tests of the HTTP surface over a model-free embedding provider.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clipsight::server::{build_router, AppState};
use clipsight_core::{Analyzer, Config, EmbeddingProvider, FixedEmbedder, PipelineError};
use image::DynamicImage;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const DIM: usize = 16;

fn app(provider: FixedEmbedder) -> Router {
    let analyzer = Analyzer::new(Arc::new(provider), 64);
    build_router(Arc::new(AppState::new(analyzer, &Config::default())))
}

/// Provider whose image embedding takes longer than the request budget.
struct SlowEmbedder {
    inner: FixedEmbedder,
    delay: Duration,
}

impl EmbeddingProvider for SlowEmbedder {
    fn embed_image(&self, image: &DynamicImage) -> Result<Vec<f32>, PipelineError> {
        std::thread::sleep(self.delay);
        self.inner.embed_image(image)
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        self.inner.embed_texts(texts)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn device(&self) -> &str {
        self.inner.device()
    }
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([120, 200, 40]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn data_uri() -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png_bytes()))
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str, image: &[u8], labels: Option<&str>) -> Request<Body> {
    let boundary = "clipsight-test-boundary";
    let mut body = Vec::new();
    if let Some(labels) = labels {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"labels\"\r\n\r\n{labels}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"meal.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_model_and_device() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(FixedEmbedder::new(DIM)), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "device": "cpu", "model": "fixed"})
    );
}

#[tokio::test]
async fn classify_ranks_caller_labels() {
    let app = app(FixedEmbedder::new(DIM).matching("a cat"));
    let request = json_request(
        "/classify",
        json!({"image_base64": data_uri(), "labels": "a dog, a cat ,a car"}),
    );
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["top_prediction"]["label"], "a cat");
    assert_eq!(body["top_prediction"]["rank"], 1);
    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 3);
    assert_eq!(predictions[0], body["top_prediction"]);
    let confidence = predictions[0]["confidence"].as_f64().unwrap();
    assert!(confidence > 99.0 && confidence <= 100.0);
}

#[tokio::test]
async fn classify_accepts_multipart_upload() {
    let app = app(FixedEmbedder::new(DIM).matching("salad"));
    let request = multipart_request("/classify", &png_bytes(), Some("pizza,salad"));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["top_prediction"]["label"], "salad");
}

#[tokio::test]
async fn classify_without_labels_is_bad_request() {
    for labels in [None, Some(" , ,")] {
        let mut payload = json!({"image_base64": data_uri()});
        if let Some(labels) = labels {
            payload["labels"] = json!(labels);
        }
        let (status, body) = send(
            app(FixedEmbedder::new(DIM)),
            json_request("/classify", payload),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No labels provided"}));
    }
}

#[tokio::test]
async fn embed_returns_unit_vector() {
    let provider = FixedEmbedder::new(4).with_image(vec![0.0, 3.0, 0.0, 4.0]);
    let request = json_request("/embed", json!({"image_base64": data_uri()}));
    let (status, body) = send(app(provider), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["dimension"], 4);
    let embedding: Vec<f64> = body["embedding"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    let norm = embedding.iter().map(|x| x * x).sum::<f64>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
    assert!((embedding[1] - 0.6).abs() < 1e-5);
}

#[tokio::test]
async fn facial_features_from_file_upload() {
    let app = app(FixedEmbedder::new(DIM).matching("heavy facial hair on face"));
    let request = multipart_request("/facial-features", &png_bytes(), None);
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["hirsutism"]["top_match"], "heavy facial hair on face");
    assert_eq!(body["hirsutism"]["severity_score"], 4);
    assert_eq!(body["acne"]["severity_score"], 0);
    assert_eq!(body["acne"]["top_match"], "clear skin");
}

#[tokio::test]
async fn food_analyze_from_json_data_uri() {
    let app = app(
        FixedEmbedder::new(128)
            .matching("a bowl of soup or stew")
            .matching("dal lentils")
            .matching("low glycemic index food like vegetables, legumes, nuts")
            .matching("PCOS friendly anti-inflammatory healthy food")
            .matching("moderate protein food"),
    );
    let request = json_request("/food-analyze", json!({"image_base64": data_uri()}));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["identification"]["mainDish"], "Soup Or Stew");
    assert_eq!(body["identification"]["components"][0], "Dal Lentils");
    assert_eq!(body["identification"]["approxCalories"], 300);
    assert_eq!(body["metabolicStats"]["glycemicIndex"], "Low");
    assert_eq!(body["metabolicStats"]["totalProteing"], 15);
    assert_eq!(body["pcosCompatibility"]["score"], 100);
    assert_eq!(body["pcosCompatibility"]["positives"], json!([]));
    assert_eq!(
        body["feedback"]["summary"],
        "Detected a bowl of soup or stew. Safe for PCOS diet."
    );
    assert_eq!(body["feedback"]["improvementTip"], "Good choice!");
}

#[tokio::test]
async fn food_analyze_from_urlencoded_form() {
    let form = format!(
        "image_base64={}",
        BASE64
            .encode(png_bytes())
            .replace('+', "%2B")
            .replace('/', "%2F")
            .replace('=', "%3D")
    );
    let request = Request::builder()
        .method("POST")
        .uri("/food-analyze")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let (status, body) = send(app(FixedEmbedder::new(DIM)), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metabolicStats"]["glycemicIndex"], "Low");
}

#[tokio::test]
async fn missing_image_is_bad_request() {
    for uri in ["/classify", "/embed", "/facial-features", "/food-analyze"] {
        let request = json_request(uri, json!({"labels": "a,b"}));
        let (status, body) = send(app(FixedEmbedder::new(DIM)), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({"error": "No image provided"}));
    }
}

#[tokio::test]
async fn undecodable_image_is_bad_request() {
    let request = json_request(
        "/food-analyze",
        json!({"image_base64": BASE64.encode(b"definitely not an image")}),
    );
    let (status, body) = send(app(FixedEmbedder::new(DIM)), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Decode error"));
}

#[tokio::test]
async fn dimension_mismatch_is_internal_error() {
    let provider = FixedEmbedder::new(DIM).with_text("short", vec![1.0, 0.0]);
    let request = json_request(
        "/classify",
        json!({"image_base64": data_uri(), "labels": "long,short"}),
    );
    let (status, body) = send(app(provider), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Dimension mismatch"));
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let request = Request::builder()
        .uri("/nope")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(FixedEmbedder::new(DIM)), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not found"}));
}

#[tokio::test]
async fn slow_analysis_times_out_with_json_error() {
    let mut config = Config::default();
    config.server.request_timeout_secs = 1;
    let provider = SlowEmbedder {
        inner: FixedEmbedder::new(DIM),
        delay: Duration::from_millis(1500),
    };
    let analyzer = Analyzer::new(Arc::new(provider), 64);
    let app = build_router(Arc::new(AppState::new(analyzer, &config)));

    let request = json_request("/embed", json!({"image_base64": data_uri()}));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body, json!({"error": "Request timed out after 1s"}));
}
