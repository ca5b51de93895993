use crate::error::{ServerError, ServerResult};
use crate::middleware::RequestId;
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `POST /index` and `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexResponse {
    pub indexed: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeResponse {
    pub original: bool,
}

fn video_url(body: Result<Json<VideoRequest>, JsonRejection>) -> ServerResult<String> {
    let Json(request) = body?;
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ServerError::BadRequest("url must not be empty".into()));
    }
    Ok(url.to_string())
}

/// Download, fingerprint and store a video.
pub async fn index_video(
    State(state): State<Arc<ServerState>>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Json<VideoRequest>, JsonRejection>,
) -> ServerResult<Json<IndexResponse>> {
    let url = video_url(body)?;
    let identity = state.pipeline.index(&url).await?;
    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();
    tracing::debug!(
        id = %identity.id,
        request_id = %request_id,
        "index request done"
    );
    Ok(Json(IndexResponse { indexed: true }))
}

/// Decide whether a video is original against the corpus.
pub async fn analyze_video(
    State(state): State<Arc<ServerState>>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Json<VideoRequest>, JsonRejection>,
) -> ServerResult<Json<AnalyzeResponse>> {
    let url = video_url(body)?;
    let report = state.pipeline.analyze(&url).await?;
    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();
    tracing::debug!(
        id = %report.query.id,
        stage = ?report.stage,
        request_id = %request_id,
        "analyze request done"
    );
    Ok(Json(AnalyzeResponse {
        original: report.original,
    }))
}
