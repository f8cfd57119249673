//! HTTP surface
//!
//! Provides REST API endpoints for:
//! - Prompt validation, plan generation and execution
//! - Stored table upload and catalog browsing
//! - Lineage and Prometheus metrics

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tabplan_exec::DataTable;
use tabplan_prompt::{PlanTranslator, Validation};
use tabplan_registry::{LineageGraph, LineageTracker, TableRegistry};

use crate::catalog::TableCatalog;
use crate::config::Config;
use crate::error::ApiError;
use crate::metrics::Metrics;
use crate::transform::{self, ExecutePlanRequest, ExecuteRequest, GenerateRequest, PlanPreviewResponse, PlanRequest};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<TableRegistry>,
    pub lineage: Arc<LineageTracker>,
    pub translator: Arc<PlanTranslator>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, prometheus::Error> {
        let translator = PlanTranslator::new(
            config.engine.translator.clone(),
            config.engine.validator.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(TableRegistry::new()),
            lineage: Arc::new(LineageTracker::new()),
            translator: Arc::new(translator),
            metrics: Arc::new(Metrics::new("tabplan")?),
        })
    }
}

#[derive(Deserialize)]
struct ValidateRequest {
    prompt: String,
}

#[derive(Deserialize)]
struct CatalogQuery {
    format: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/smart-transform/generate", post(generate))
        .route("/smart-transform/execute", post(execute))
        .route("/smart/validate", post(validate))
        .route("/smart/plan/generate", post(generate_plan))
        .route("/smart/plan/execute", post(execute_plan))
        .route("/tables", get(list_tables))
        .route("/tables/:name", get(get_table).post(upload_table))
        .route("/lineage", get(lineage))
        .route("/metrics", get(metrics))
        .route("/health", get(health_check))
        .with_state(state)
}

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.server.addr();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("tabplan server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<transform::GenerateResponse>, ApiError> {
    transform::generate(&state, &req).map(Json)
}

async fn execute(
    State(state): State<AppState>,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<transform::ExecuteResponse>, ApiError> {
    transform::execute(&state, &req).map(Json)
}

async fn validate(State(state): State<AppState>, Json(req): Json<ValidateRequest>) -> Json<Validation> {
    Json(transform::validate(&state, &req.prompt))
}

async fn generate_plan(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<Value>, ApiError> {
    let plan = transform::generate_plan(&state, &req)?;
    Ok(Json(json!({"success": true, "plan": plan})))
}

async fn execute_plan(
    State(state): State<AppState>,
    Json(req): Json<ExecutePlanRequest>,
) -> Result<Json<PlanPreviewResponse>, ApiError> {
    transform::execute_plan_preview(&state, &req).map(Json)
}

async fn list_tables(State(state): State<AppState>) -> Json<Value> {
    let tables: Vec<Value> = state
        .registry
        .names()
        .into_iter()
        .filter_map(|name| {
            let table = state.registry.get(&name).ok()?;
            Some(json!({"name": name, "rows": table.height(), "columns": table.columns()}))
        })
        .collect();
    Json(json!({ "tables": tables }))
}

async fn get_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, ApiError> {
    let table = state.registry.get(&name)?;
    let catalog = TableCatalog::from_table(&name, &table);

    if query.format.as_deref() == Some("markdown") {
        let headers = [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")];
        return Ok((headers, catalog.to_markdown()).into_response());
    }
    Ok(Json(catalog).into_response())
}

/// Store JSON records under `name`, replacing any table already there
async fn upload_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(records): Json<Vec<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let table = DataTable::from_records(&records)?;
    let body = json!({
        "success": true,
        "name": name,
        "rows": table.height(),
        "columns": table.columns(),
    });
    state.registry.insert(name, table);
    Ok((StatusCode::CREATED, Json(body)))
}

async fn lineage(State(state): State<AppState>) -> Json<LineageGraph> {
    Json(state.lineage.graph())
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let headers = [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")];
    (headers, state.metrics.gather())
}

async fn health_check() -> &'static str {
    "OK"
}
