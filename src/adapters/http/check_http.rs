//! URL check HTTP server.
//!
//! Exposes the aggregation core over `POST /` with the JSON response shape
//! existing browser extensions already consume.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::domain::models::{ServerConfig, SignalSource, SignalStatus, Verdict};
use crate::infrastructure::setup::Credentials;
use crate::services::UrlChecker;

const MISSING_URL: &str = "Invalid request, 'url' is required";

/// Request body of `POST /`.
#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Response body of `POST /`.
///
/// `Google` and `Virus_total` are present only when the matching service
/// has a key configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Google", default, skip_serializing_if = "Option::is_none")]
    pub google: Option<u8>,
    #[serde(rename = "Virus_total", default, skip_serializing_if = "Option::is_none")]
    pub virus_total: Option<u8>,
    #[serde(rename = "mlModel")]
    pub ml_model: u8,
    pub safe: u8,
}

impl CheckResponse {
    pub fn new(url: &str, verdict: &Verdict, credentials: Credentials) -> Self {
        let results = verdict.per_source();
        // Inconclusive remote sources read as 1; only an explicit UNSAFE is 0.
        let not_unsafe = |source| u8::from(results.status_of(source) != SignalStatus::Unsafe);

        Self {
            url: url.to_string(),
            google: credentials
                .safe_browsing
                .then(|| not_unsafe(SignalSource::ReputationList)),
            virus_total: credentials
                .virustotal
                .then(|| not_unsafe(SignalSource::MultiVendor)),
            ml_model: u8::from(results.status_of(SignalSource::Classifier) == SignalStatus::Safe),
            safe: u8::from(verdict.final_status().is_safe()),
        }
    }
}

/// Error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

struct AppState {
    checker: Arc<UrlChecker>,
    credentials: Credentials,
}

/// URL check HTTP server.
pub struct CheckHttpServer {
    checker: Arc<UrlChecker>,
    credentials: Credentials,
    config: ServerConfig,
}

impl CheckHttpServer {
    pub fn new(checker: Arc<UrlChecker>, credentials: Credentials, config: ServerConfig) -> Self {
        Self {
            checker,
            credentials,
            config,
        }
    }

    /// Build the router with all endpoints.
    pub fn build_router(&self) -> Router {
        let state = Arc::new(AppState {
            checker: Arc::clone(&self.checker),
            credentials: self.credentials,
        });

        let mut router = Router::new()
            .route("/", post(check_url))
            .route("/health", get(health_check))
            .with_state(state);

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Start the HTTP server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the HTTP server, stopping gracefully once `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        tracing::info!("URL check HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn check_url(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "unreadable check request");
            CheckRequest::default()
        }
    };

    let url = request.url.unwrap_or_default();
    let verdict = state
        .checker
        .check_url(&url)
        .await
        .map_err(|_| bad_request())?;

    Ok(Json(CheckResponse::new(
        url.trim(),
        &verdict,
        state.credentials,
    )))
}

fn bad_request() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: MISSING_URL.to_string(),
        }),
    )
}
