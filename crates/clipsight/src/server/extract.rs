//! Request extractor accepting an image in any of the supported encodings.
//!
//! - multipart form: `image` file part, or `image_base64` text field
//! - urlencoded form: `image_base64` field
//! - JSON body: `{"image_base64": "..."}`
//!
//! An optional `labels` field is read from the same body.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::Deserialize;

use super::error::ServerError;

/// Where the image bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Raw bytes of an uploaded file
    Bytes(Vec<u8>),
    /// Base64 text, possibly with a `data:` URI prefix
    Base64(String),
}

/// An image upload plus the optional comma-separated label string.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub image: ImageSource,
    pub labels: Option<String>,
}

impl ImageRequest {
    /// Parse the `labels` field: split on commas, trim, drop empties.
    pub fn label_list(&self) -> Vec<String> {
        self.labels
            .as_deref()
            .map(parse_labels)
            .unwrap_or_default()
    }
}

/// Split a comma-separated label string into trimmed, non-empty labels.
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct JsonImageBody {
    image_base64: Option<String>,
    labels: Option<String>,
}

/// Fields collected from a form body before an image source is chosen.
#[derive(Debug, Default)]
struct FormFields {
    file: Option<Vec<u8>>,
    image_base64: Option<String>,
    labels: Option<String>,
}

impl FormFields {
    /// An uploaded file wins over base64 text.
    fn into_request(self) -> Result<ImageRequest, ServerError> {
        let image = match (self.file, self.image_base64) {
            (Some(bytes), _) => ImageSource::Bytes(bytes),
            (None, Some(text)) => ImageSource::Base64(text),
            (None, None) => return Err(no_image()),
        };
        Ok(ImageRequest {
            image,
            labels: self.labels,
        })
    }
}

fn no_image() -> ServerError {
    ServerError::BadRequest("No image provided".to_string())
}

impl<S> FromRequest<S> for ImageRequest
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            read_multipart(multipart).await?.into_request()
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(mut fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            FormFields {
                file: None,
                image_base64: fields.remove("image_base64"),
                labels: fields.remove("labels"),
            }
            .into_request()
        } else if content_type.starts_with("application/json") {
            let Json(body) = Json::<JsonImageBody>::from_request(req, state)
                .await
                .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            FormFields {
                file: None,
                image_base64: body.image_base64,
                labels: body.labels,
            }
            .into_request()
        } else {
            Err(no_image())
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormFields, ServerError> {
    let mut fields = FormFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?;
                fields.file = Some(bytes.to_vec());
            }
            "image_base64" | "labels" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?;
                if name == "labels" {
                    fields.labels = Some(text);
                } else {
                    fields.image_base64 = Some(text);
                }
            }
            _ => {}
        }
    }

    Ok(fields)
}
