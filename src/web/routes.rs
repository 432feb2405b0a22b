use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use base64::{Engine, prelude::BASE64_STANDARD};
use image::ImageFormat;
use serde::Serialize;
use serde_json::json;
use std::io::Cursor;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::detection::{self, DetectionReport};
use crate::error::DetectError;
use crate::models::Detection;
use crate::web::{page, state::WebState};

/// A failed request with the message shown to the user
#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<DetectError> for WebError {
    fn from(e: DetectError) -> Self {
        match e {
            DetectError::Image(_) | DetectError::UnsupportedFormat | DetectError::Io(_) => {
                Self::bad_request(e.to_string())
            }
            _ => Self::internal(e.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub summary: String,
    pub detections: Vec<Detection>,
}

struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

pub async fn index() -> Html<String> {
    Html(page::upload_form())
}

pub async fn detect_page(State(st): State<WebState>, multipart: Multipart) -> Response {
    match detect_upload(st, multipart).await {
        Ok((file_name, report)) => match encode_png(&report) {
            Ok(png) => Html(page::result_page(&file_name, &report, &png)).into_response(),
            Err(e) => (e.status, Html(page::error_page(&e.message))).into_response(),
        },
        Err(e) => (e.status, Html(page::error_page(&e.message))).into_response(),
    }
}

pub async fn detect_json(State(st): State<WebState>, multipart: Multipart) -> Response {
    match detect_upload(st, multipart).await {
        Ok((file_name, report)) => Json(DetectResponse {
            file_name,
            width: report.image.width(),
            height: report.image.height(),
            summary: report.summary.headline(),
            detections: report.detections,
        })
        .into_response(),
        Err(e) => (e.status, Json(json!({ "error": e.message }))).into_response(),
    }
}

async fn detect_upload(
    st: WebState,
    multipart: Multipart,
) -> Result<(String, DetectionReport), WebError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("detect", %request_id);

    async move {
        let upload = read_upload(multipart).await?;
        info!("Received {} ({} bytes)", upload.file_name, upload.bytes.len());

        let detector = st.detector.clone();
        let annotator = st.annotator.clone();
        let report = tokio::task::spawn_blocking(move || {
            let image = detection::decode_image(&upload.bytes)?;
            detection::run_detection(detector.as_ref(), &annotator, &image)
        })
        .await
        .map_err(|e| WebError::internal(format!("detection task failed: {}", e)))?
        .map_err(|e| {
            warn!("Detection failed: {}", e);
            WebError::from(e)
        })?;

        Ok((upload.file_name, report))
    }
    .instrument(span)
    .await
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, WebError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::bad_request(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| WebError::bad_request(e.body_text()))?;
        if bytes.is_empty() {
            break;
        }
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(WebError::bad_request("Upload an image to scan"))
}

fn encode_png(report: &DetectionReport) -> Result<String, WebError> {
    let mut buf = Vec::new();
    report
        .image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| WebError::internal(format!("failed to encode result: {}", e)))?;
    Ok(BASE64_STANDARD.encode(buf))
}
