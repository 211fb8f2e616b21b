//! HTTP API server implementation

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::cache::CacheStats;
use crate::core::client::DeeplConnector;
use crate::core::errors::TranslationError;
use crate::core::models::{Language, TranslationOptions};

/// Application state
#[derive(Clone)]
pub struct AppState {
    connector: Arc<DeeplConnector>,
}

impl AppState {
    pub fn new(connector: DeeplConnector) -> Self {
        Self {
            connector: Arc::new(connector),
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    engine: String,
    protocol: String,
    version: String,
}

/// Translation request
#[derive(Deserialize)]
pub struct TranslateRequest {
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub text_list: Vec<String>,
    #[serde(default)]
    pub options: TranslationOptions,
}

/// Translation response
#[derive(Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translations: Vec<TranslationItem>,
}

#[derive(Serialize, Deserialize)]
pub struct TranslationItem {
    pub detected_source_lang: Option<String>,
    pub text: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn invalid_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: ErrorDetail {
                message: message.to_string(),
                code: Some("invalid_request".to_string()),
                r#type: Some("invalid_request_error".to_string()),
            },
        }),
    )
}

/// Errors that would fail every text of the request
fn request_wide(err: &TranslationError) -> Option<ApiError> {
    let status = match err {
        TranslationError::CredentialMissingError { .. } => StatusCode::UNAUTHORIZED,
        TranslationError::ConfigError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => return None,
    };
    Some((
        status,
        Json(ErrorResponse {
            error: ErrorDetail {
                message: err.to_string(),
                code: Some(err.code().to_string()),
                r#type: Some("translation_error".to_string()),
            },
        }),
    ))
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        engine: state.connector.name().to_string(),
        protocol: state.connector.variant().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Cache statistics handler
async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.connector.cache_stats().await)
}

/// Translation handler
async fn translate(
    State(state): State<AppState>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    if payload.text_list.is_empty() {
        return Err(invalid_request("text_list cannot be empty"));
    }

    if payload.target_lang.trim().is_empty() {
        return Err(invalid_request("target_lang cannot be empty"));
    }

    let target = Language::parse(&payload.target_lang);
    let source = match payload.source_lang.as_deref().map(str::trim) {
        None | Some("") | Some("auto") => None,
        Some(tag) => Some(Language::parse(tag)),
    };

    // Translate each text
    let mut translations = Vec::with_capacity(payload.text_list.len());
    for text in payload.text_list {
        match state
            .connector
            .translate(source.as_ref(), &target, &text, &payload.options)
            .await
        {
            Ok(Some(result)) => {
                translations.push(TranslationItem {
                    detected_source_lang: result.detected_source_lang,
                    text: result.translation,
                });
            }
            Ok(None) => {
                // Return original text when nothing came back
                translations.push(TranslationItem {
                    detected_source_lang: None,
                    text,
                });
            }
            Err(e) => {
                if let Some(response) = request_wide(&e) {
                    return Err(response);
                }
                warn!("Translation failed for '{}': {}", text, e);
                // Return original text on error
                translations.push(TranslationItem {
                    detected_source_lang: None,
                    text,
                });
            }
        }
    }

    Ok(Json(TranslateResponse { translations }))
}

/// Routes over a shared connector
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/translate", post(translate))
        .route("/cache/stats", get(cache_stats))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(connector: DeeplConnector, host: String, port: u16) -> anyhow::Result<()> {
    let app = router(AppState::new(connector));

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
