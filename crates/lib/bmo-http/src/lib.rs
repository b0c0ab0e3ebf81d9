//! HTTP entry point for bmo-assistant.
//!
//! Accepts `{ "query": ... }` on `POST /api/mcp` and answers with
//! `{ "result": ... }`, or `{ "error": ... }` and status 500 on any failure.

use std::error::Error;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use bmo_query::QueryHandler;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub const DEFAULT_HTTP_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Reported when an error carries no message of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "Failed to generate response";

pub type AnswerError = Box<dyn Error + Send + Sync>;

/// Produces the answer to one query.
#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, query: &str) -> Result<String, AnswerError>;
}

#[async_trait]
impl Answerer for QueryHandler {
    async fn answer(&self, query: &str) -> Result<String, AnswerError> {
        Ok(Self::answer(self, query).await?)
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub addr: SocketAddr,
    pub max_body_bytes: usize,
    pub request_timeout: Option<Duration>,
}

impl HttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout: None,
        }
    }

    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = Some(request_timeout);
        self
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HTTP_ADDR)
    }
}

/// HTTP server wrapper.
pub struct HttpServer {
    config: HttpServerConfig,
    state: AppState,
}

impl HttpServer {
    #[must_use]
    pub fn new(answerer: Arc<dyn Answerer>, config: HttpServerConfig) -> Self {
        let state = AppState {
            answerer,
            request_timeout: config.request_timeout,
        };
        Self { config, state }
    }

    /// Runs the HTTP server until shutdown.
    ///
    /// # Errors
    /// Returns any listener or server error.
    pub async fn serve(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.config.addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let app = build_router(self.state, self.config.max_body_bytes);

        info!("bmo-http listening on {addr}");
        axum::serve(listener, app).await?;
        Ok(())
    }

    /// The router this server would serve, for embedding or tests.
    #[must_use]
    pub fn router(self) -> Router {
        build_router(self.state, self.config.max_body_bytes)
    }
}

#[derive(Clone)]
struct AppState {
    answerer: Arc<dyn Answerer>,
    request_timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    result: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    message: String,
}

impl ApiError {
    fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            Self {
                message: DEFAULT_ERROR_MESSAGE.to_string(),
            }
        } else {
            Self { message }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse { error: self.message });
        (StatusCode::INTERNAL_SERVER_ERROR, payload).into_response()
    }
}

fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/mcp", post(query))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload.inspect_err(|rejection| {
        error!(error = %rejection.body_text(), "rejected query body");
    })?;
    info!(query = %request.query, "query received");

    let answer = state.answerer.answer(&request.query);
    let outcome = match state.request_timeout {
        Some(limit) => tokio::time::timeout(limit, answer)
            .await
            .map_err(|_| ApiError::new("query timed out"))?,
        None => answer.await,
    };

    match outcome {
        Ok(result) => Ok(Json(QueryResponse { result })),
        Err(err) => {
            error!(error = %err, "query failed");
            Err(ApiError::new(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug)]
    struct Silent;

    impl fmt::Display for Silent {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Ok(())
        }
    }

    impl Error for Silent {}

    struct Scripted;

    #[async_trait]
    impl Answerer for Scripted {
        async fn answer(&self, query: &str) -> Result<String, AnswerError> {
            match query {
                "boom" => Err("tool host connection failed: spawn failed".into()),
                "silent" => Err(Box::new(Silent)),
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok("late".to_string())
                }
                other => Ok(format!("answer to {other}")),
            }
        }
    }

    fn router(config: HttpServerConfig) -> Router {
        HttpServer::new(Arc::new(Scripted), config).router()
    }

    async fn post_body(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn answers_query_with_result() {
        let body = json!({"query": "hello"}).to_string();

        let (status, payload) = post_body(router(HttpServerConfig::default()), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload, json!({"result": "answer to hello"}));
    }

    #[tokio::test]
    async fn failure_is_reported_as_500() {
        let body = json!({"query": "boom"}).to_string();

        let (status, payload) = post_body(router(HttpServerConfig::default()), body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            payload,
            json!({"error": "tool host connection failed: spawn failed"})
        );
    }

    #[tokio::test]
    async fn empty_error_message_gets_default_text() {
        let body = json!({"query": "silent"}).to_string();

        let (status, payload) = post_body(router(HttpServerConfig::default()), body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(payload["error"], DEFAULT_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn malformed_body_is_reported_as_500() {
        let (status, payload) = post_body(router(HttpServerConfig::default()), "{not json").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(payload["error"].as_str().is_some_and(|text| !text.is_empty()));
    }

    #[tokio::test]
    async fn missing_query_is_reported_as_500() {
        let (status, payload) = post_body(router(HttpServerConfig::default()), "{}").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(payload["error"].is_string());
    }

    #[tokio::test]
    async fn oversized_body_is_reported_as_500() {
        let config = HttpServerConfig::default().with_max_body_bytes(16);
        let body = json!({"query": "a query longer than sixteen bytes"}).to_string();

        let (status, payload) = post_body(router(config), body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(payload["error"].is_string());
    }

    #[tokio::test]
    async fn request_timeout_is_reported_as_500() {
        let config = HttpServerConfig::default().with_request_timeout(Duration::from_millis(50));
        let body = json!({"query": "slow"}).to_string();

        let (status, payload) = post_body(router(config), body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(payload["error"], "query timed out");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = router(HttpServerConfig::default()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }
}
