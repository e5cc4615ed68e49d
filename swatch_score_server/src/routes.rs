use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use swatch_score::{ColorMatch, EncodingError, PayloadReport, ScoreError, ScoringPipeline, inspect_payload};
use thiserror::Error;

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub pipeline: ScoringPipeline,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub image_base64: String,
    #[serde(default)]
    pub theme_hex: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoreResponse {
    pub score: f64,
    pub avg_color_hex: String,
    pub method: String,
}

impl From<ColorMatch> for ScoreResponse {
    fn from(result: ColorMatch) -> Self {
        Self {
            score: result.score,
            avg_color_hex: result.avg_color_hex,
            method: result.method.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DebugRequest {
    #[serde(default)]
    pub image_base64: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DebugResponse {
    pub decoded_len: usize,
    pub first8_hex: String,
    pub mime_guess: String,
    pub decode_ok: bool,
    pub decode_err: String,
    pub width: u32,
    pub height: u32,
    pub note: String,
}

impl From<PayloadReport> for DebugResponse {
    fn from(report: PayloadReport) -> Self {
        Self {
            decoded_len: report.decoded_len,
            first8_hex: report.first8_hex,
            mime_guess: report.mime_guess.to_string(),
            decode_ok: report.decode_ok,
            decode_err: report.decode_err,
            width: report.width,
            height: report.height,
            note: report.note.to_string(),
        }
    }
}

/// Every way a request can fail. Client mistakes are 400 with a plain-text reason.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad json: {0}")]
    BadJson(#[from] serde_json::Error),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("bad base64: {0}")]
    BadBase64(EncodingError),
    #[error("worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadJson(_) | ApiError::Score(_) | ApiError::BadBase64(_) => StatusCode::BAD_REQUEST,
            ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn score(State(state): State<AppState>, body: Bytes) -> Result<Json<ScoreResponse>, ApiError> {
    let request: ScoreRequest = serde_json::from_slice(&body)?;
    let pipeline = state.pipeline;
    // Decoding is CPU-bound; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || {
        pipeline.score_payload(&request.image_base64, &request.theme_hex)
    })
    .await??;
    Ok(Json(result.into()))
}

pub async fn debug(State(state): State<AppState>, body: Bytes) -> Result<Json<DebugResponse>, ApiError> {
    let request: DebugRequest = serde_json::from_slice(&body)?;
    let limits = state.pipeline.config().decode_limits;
    let report = tokio::task::spawn_blocking(move || inspect_payload(&request.image_base64, &limits))
        .await?
        .map_err(ApiError::BadBase64)?;
    Ok(Json(report.into()))
}

/// Permissive CORS on every response; preflight requests stop here with 204.
pub async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    response
}
