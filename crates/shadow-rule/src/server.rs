//! Axum admin server: router, handlers, graceful shutdown.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::AdminConfig;
use crate::error::{MigrationError, RuleError};
use crate::migration::{self, SchemaIntrospector, SourceDataSourceConfig};
use crate::operation::{self, OPERATION_HEADER};
use crate::rule::DropShadowRuleStatement;
use crate::store::RuleStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AdminConfig,
    pub store: RuleStore,
    pub introspector: Arc<dyn SchemaIntrospector>,
}

/// Body of `POST /migration/source-tables`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTablesRequest {
    pub data_source: SourceDataSourceConfig,
    #[serde(default)]
    pub table_name: Option<String>,
}

/// Domain failure rendered as a JSON error body.
#[derive(Debug)]
enum ApiError {
    Rule(RuleError),
    Migration(MigrationError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Rule(RuleError::MissingRequiredRule { .. }) => StatusCode::NOT_FOUND,
            ApiError::Rule(RuleError::InvalidConfiguration(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Migration(MigrationError::AddMigrationSourceResource(_)) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Rule(e) => e.to_string(),
            ApiError::Migration(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message() });
        (self.status(), Json(body)).into_response()
    }
}

/// Build the admin router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rules/shadow", get(handle_get_rule))
        .route("/rules/shadow/drop", post(handle_drop_rule))
        .route("/migration/source-tables", post(handle_source_tables))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Build and run the HTTP server.
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let listen_addr = state.config.server.listen_address.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Shadow rule admin listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shadow rule admin shut down gracefully");
    Ok(())
}

/// GET /rules/shadow: the current configuration, 404 when none exists.
async fn handle_get_rule(State(state): State<Arc<AppState>>) -> Response {
    match state.store.snapshot() {
        Some(config) => (StatusCode::OK, Json(config)).into_response(),
        None => ApiError::Rule(RuleError::missing_shadow_rule(
            state.store.database_name(),
            Vec::new(),
        ))
        .into_response(),
    }
}

/// POST /rules/shadow/drop
///
/// Runs the existence check and the update as one step against the store;
/// a rejected statement leaves the configuration untouched.
async fn handle_drop_rule(
    State(state): State<Arc<AppState>>,
    Json(statement): Json<DropShadowRuleStatement>,
) -> Response {
    let operation_id = operation::generate_id();
    let span = shadow_tracing::admin_request_span!(&operation_id, "drop_shadow_rule");
    let start = Instant::now();

    let response = span.in_scope(|| match state.store.drop_rules(&statement) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => ApiError::Rule(e).into_response(),
    });

    finish(&span, &operation_id, start, response)
}

/// POST /migration/source-tables: schema name to matching tables of a source.
async fn handle_source_tables(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SourceTablesRequest>,
) -> Response {
    let operation_id = operation::generate_id();
    let span = shadow_tracing::admin_request_span!(&operation_id, "source_tables");
    let start = Instant::now();

    let result = migration::schema_tables_from_actual(
        state.introspector.clone(),
        request.data_source,
        request.table_name,
    )
    .instrument(span.clone())
    .await;

    let response = match result {
        Ok(tables) => (StatusCode::OK, Json(tables)).into_response(),
        Err(e) => ApiError::Migration(e).into_response(),
    };
    finish(&span, &operation_id, start, response)
}

/// Health check endpoint.
async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Record status and latency on the request span and echo the operation ID.
fn finish(span: &tracing::Span, operation_id: &str, start: Instant, mut response: Response) -> Response {
    span.record("status", response.status().as_u16());
    span.record("latency_ms", start.elapsed().as_millis() as u64);
    if let Ok(value) = HeaderValue::from_str(operation_id) {
        response.headers_mut().insert(OPERATION_HEADER, value);
    }
    response
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
