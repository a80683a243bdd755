//! HTTP server for the table reader.
//!
//! # API Endpoints
//!
//! | Method | Path          | Description                            |
//! |--------|---------------|----------------------------------------|
//! | GET    | `/health`     | Health check                           |
//! | POST   | `/api/tables` | Upload a table CSV, get it validated   |
//! | POST   | `/api/check`  | Judge a guess against answers          |
//! | GET    | `/api/logs`   | SSE stream for real-time logs          |

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{check_guess, error_response, CheckRequest, CheckResponse, TableResponse};
use crate::config::{LoadOptions, ServerConfig};
use crate::error::{LoadError, ServerError};
use crate::loader::load_table_bytes;

type ApiError = (StatusCode, Json<Value>);

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Load(LoadError::Io(_)) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Load(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn into_api_error(self) -> ApiError {
        (self.status(), Json(error_response(&self.to_string())))
    }
}

/// Build the router.
pub fn router(config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/tables", post(upload_table))
        .route("/api/check", post(check))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_upload))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    log_info(format!("Server running on http://localhost:{}", config.port));
    log_info("POST /api/tables - Upload table CSV");
    log_info("POST /api/check  - Check a guess");
    log_info("GET  /api/logs   - SSE log stream");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "assoc",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "tables": "POST /api/tables",
            "check": "POST /api/check",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Multipart fields: `file` (required), `encoding` and `offset` (optional).
async fn upload_table(mut multipart: Multipart) -> Result<Json<TableResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut options = LoadOptions::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ServerError::BadRequest(format!("Multipart error: {}", e)).into_api_error()
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                if let Some(file_name) = field.file_name() {
                    options = options.with_origin(file_name);
                }
                let bytes = field.bytes().await.map_err(|e| {
                    ServerError::BadRequest(format!("Read error: {}", e)).into_api_error()
                })?;
                file_data = Some(bytes.to_vec());
            }
            "encoding" => {
                let text = field_text(field).await?;
                if !text.trim().is_empty() {
                    options = options.with_encoding(Some(text.trim().to_string()));
                }
            }
            "offset" => {
                let text = field_text(field).await?;
                let offset = text.trim().parse().map_err(|_| {
                    ServerError::BadRequest(format!("Invalid offset: {:?}", text)).into_api_error()
                })?;
                options = options.with_line_offset(offset);
            }
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| {
        ServerError::BadRequest("No file provided".to_string()).into_api_error()
    })?;

    let origin = options.origin.clone();
    let loaded = tokio::task::spawn_blocking(move || load_table_bytes(&bytes, &options))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()).into_api_error())?
        .map_err(|e| ServerError::from(e).into_api_error())?;

    Ok(Json(TableResponse::new(origin, &loaded)))
}

async fn field_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)).into_api_error())
}

async fn check(Json(request): Json<CheckRequest>) -> Json<CheckResponse> {
    Json(check_guess(&request))
}
