//! Axum HTTP routes for the conversion/query API.

use crate::config::ServiceConfig;
use crate::convert::{self, ConversionRequest, FileConverter};
use crate::error::{ServerError, ServerResult};
use crate::server::context;
use crate::store::{TableStore, WriteMode};
use axum::extract::{Multipart, Path as UrlPath, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub config: ServiceConfig,
    pub store: TableStore,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let store = TableStore::new(config.tables_dir.clone());
        Self { config, store }
    }
}

// ─── Route builder ───────────────────────────────────────────────

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload_and_convert))
        .route("/convert", post(convert_file))
        .route("/convert/batch", post(convert_batch))
        .route("/query", post(query))
        .route("/tables", get(list_tables))
        .route("/tables/:name", post(save_table));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─── Handlers ────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tabkit",
    }))
}

/// Query parameters for the multipart upload endpoint
#[derive(serde::Deserialize)]
struct UploadParams {
    output_format: String,
}

/// Accept a multipart file upload, convert it, and discard the upload.
async fn upload_and_convert(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> ServerResult<impl IntoResponse> {
    let mut stored: Option<PathBuf> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::Upload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(sanitize_filename)
            .ok_or_else(|| ServerError::Upload("file field has no filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::Upload(e.to_string()))?;

        // Scratch name is prefixed so concurrent uploads of the same file
        // cannot clobber each other
        let scratch = state
            .config
            .uploads_dir
            .join(format!("{}_{}", uuid::Uuid::new_v4(), filename));
        tokio::fs::create_dir_all(&state.config.uploads_dir).await?;
        tokio::fs::write(&scratch, &bytes).await?;
        stored = Some(scratch);
        break;
    }

    let input = stored.ok_or_else(|| ServerError::Upload("missing 'file' field".to_string()))?;

    let converter = FileConverter::new(
        input.clone(),
        params.output_format,
        Some(state.config.output_dir.clone()),
    );
    let result = converter.convert();

    // The upload is ephemeral either way
    let _ = tokio::fs::remove_file(&input).await;

    let output = result.map_err(ServerError::Convert)?;
    Ok(Json(serde_json::json!({ "file_path": output })))
}

async fn convert_file(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConversionRequest>,
) -> ServerResult<impl IntoResponse> {
    let output_dir = req
        .output_dir
        .unwrap_or_else(|| state.config.output_dir.clone());
    let converter = FileConverter::new(req.input_path, req.output_format, Some(output_dir));
    let output = converter.convert().map_err(ServerError::Convert)?;
    Ok(Json(serde_json::json!({ "file_path": output })))
}

async fn convert_batch(
    State(state): State<Arc<AppState>>,
    Json(mut requests): Json<Vec<ConversionRequest>>,
) -> impl IntoResponse {
    for req in &mut requests {
        if req.output_dir.is_none() {
            req.output_dir = Some(state.config.output_dir.clone());
        }
    }
    let results = convert::convert_all(&requests);
    Json(serde_json::json!({
        "count": results.len(),
        "results": results,
    }))
}

/// Request body for SQL queries: exactly one of `file_path` or `table`
#[derive(serde::Deserialize)]
struct QueryRequest {
    file_path: Option<PathBuf>,
    table: Option<String>,
    sql: String,
}

async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> ServerResult<impl IntoResponse> {
    let outcome = match (req.file_path, req.table) {
        (Some(path), None) => context::query_file(&path, &req.sql).await?,
        (None, Some(name)) => context::query_table(&state.store, &name, &req.sql).await?,
        _ => {
            return Err(ServerError::InvalidParameter {
                name: "file_path/table".to_string(),
                reason: "exactly one of 'file_path' or 'table' is required".to_string(),
            })
        }
    };
    Ok(Json(outcome))
}

async fn list_tables(State(state): State<Arc<AppState>>) -> ServerResult<impl IntoResponse> {
    let names = state.store.list_names().map_err(ServerError::Store)?;
    Ok(Json(serde_json::json!({
        "count": names.len(),
        "tables": names,
    })))
}

/// Request body for saving a table
#[derive(serde::Deserialize)]
struct SaveTableRequest {
    rows: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    mode: WriteMode,
}

async fn save_table(
    State(state): State<Arc<AppState>>,
    UrlPath(name): UrlPath<String>,
    Json(req): Json<SaveTableRequest>,
) -> ServerResult<impl IntoResponse> {
    let path = state
        .store
        .save(&name, req.rows.as_deref(), req.mode)
        .map_err(ServerError::Store)?;
    Ok(Json(serde_json::json!({ "file_path": path })))
}

// ─── Server startup ──────────────────────────────────────────────

/// Start the HTTP server
pub async fn serve(config: ServiceConfig, bind: &str, port: u16) -> ServerResult<()> {
    let state = Arc::new(AppState::new(config));

    let table_count = state.store.list_names().map(|n| n.len()).unwrap_or(0);
    info!(tables = table_count, "Loaded table store");

    let router = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .map_err(|e| ServerError::InvalidParameter {
            name: "bind".to_string(),
            reason: format!("{e}"),
        })?;

    eprintln!("tabkit listening on http://{addr}");
    eprintln!("API endpoints:");
    eprintln!("  GET  /api/health");
    eprintln!("  POST /api/upload?output_format=<ext>");
    eprintln!("  POST /api/convert");
    eprintln!("  POST /api/convert/batch");
    eprintln!("  POST /api/query");
    eprintln!("  GET  /api/tables");
    eprintln!("  POST /api/tables/:name");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Io)?;

    eprintln!("\nServer shut down.");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C handler");
    eprintln!("\nShutting down gracefully...");
}

/// Keep only the final path component of a client-supplied filename
fn sanitize_filename(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or("upload")
        .to_string()
}
