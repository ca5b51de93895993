use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use server::{build_router, ServerConfig, ServerState};
use tower::ServiceExt;
use vofp::{
    AcquiredVideo, AcquisitionError, Acquirer, BackendConfig, DecisionConfig, FingerprintIndex,
    OriginalityPipeline, VideoAnalysis, VideoAnalyzer, VideoError, VideoIdentity,
};

/// Every `https://videos.test/<id>` URL resolves to a video called `<id>`.
struct TestAcquirer;

#[async_trait]
impl Acquirer for TestAcquirer {
    async fn acquire(&self, url: &str) -> Result<AcquiredVideo, AcquisitionError> {
        let id = url
            .strip_prefix("https://videos.test/")
            .ok_or_else(|| AcquisitionError::Failed {
                url: url.to_string(),
                message: "Unsupported URL".into(),
            })?;
        let identity = VideoIdentity {
            id: id.to_string(),
            url: url.to_string(),
            title: None,
        };
        Ok(AcquiredVideo::unmanaged(identity, PathBuf::from(id)))
    }
}

/// Fingerprint depends only on the first byte of the id.
struct TestAnalyzer;

impl VideoAnalyzer for TestAnalyzer {
    fn fingerprint_len(&self) -> usize {
        2
    }

    fn fingerprint(&self, path: &Path) -> Result<Vec<f32>, VideoError> {
        let name = path.to_string_lossy();
        match name.as_bytes().first() {
            Some(b'a') => Ok(vec![1.0, 0.0]),
            Some(b'b') => Ok(vec![0.0, 1.0]),
            _ => Err(VideoError::NoFrames {
                source_label: name.into_owned(),
            }),
        }
    }

    fn frame_hashes(&self, path: &Path) -> Result<Vec<u64>, VideoError> {
        self.fingerprint(path).map(|_| vec![0])
    }

    fn analyze(&self, path: &Path) -> Result<VideoAnalysis, VideoError> {
        Ok(VideoAnalysis {
            fingerprint: self.fingerprint(path)?,
            frame_hashes: vec![u64::MAX],
        })
    }
}

fn app() -> Router {
    let store = FingerprintIndex::new(&BackendConfig::in_memory()).unwrap();
    let pipeline = OriginalityPipeline::new(
        Arc::new(TestAcquirer),
        Arc::new(TestAnalyzer),
        Arc::new(store),
        DecisionConfig::default(),
    )
    .unwrap();
    build_router(Arc::new(ServerState::with_pipeline(
        ServerConfig::default(),
        pipeline,
    )))
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_is_always_ok() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn ready_reports_corpus_size() {
    let app = app();
    let (status, body) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["corpus_entries"], 0);

    send(&app, post("/index", r#"{"url":"https://videos.test/a1"}"#)).await;
    let (_, body) = send(&app, get("/ready")).await;
    assert_eq!(body["corpus_entries"], 1);
}

#[tokio::test]
async fn index_then_analyze() {
    let app = app();

    let (status, body) = send(&app, post("/analyze", r#"{"url":"https://videos.test/a1"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"original": true}));

    let (status, body) = send(&app, post("/index", r#"{"url":"https://videos.test/a1"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"indexed": true}));

    // Same content, different id: caught by the coarse pass.
    let (_, body) = send(&app, post("/analyze", r#"{"url":"https://videos.test/a2"}"#)).await;
    assert_eq!(body["original"], false);

    // Orthogonal content with no overlapping frames.
    let (_, body) = send(&app, post("/analyze", r#"{"url":"https://videos.test/b1"}"#)).await;
    assert_eq!(body["original"], true);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app();
    let (status, body) = send(&app, post("/analyze", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = send(&app, post("/index", r#"{"url":"   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pipeline_failures_are_server_errors() {
    let app = app();
    let (status, body) = send(&app, post("/index", r#"{"url":"ftp://elsewhere/x"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "ACQUISITION_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Unsupported URL"));

    let (status, body) = send(&app, post("/analyze", r#"{"url":"https://videos.test/zzz"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "DECODE_ERROR");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, body) = send(&app(), get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let response = app().oneshot(get("/health")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
