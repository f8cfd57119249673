//! Prompt → plan → execution workflows behind the HTTP handlers

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tabplan_exec::{execute_plan, format_preview, DataTable, Diagnostic, ExecutionError, PlanOutput};
use tabplan_ir::{Plan, PipelineGraph, SchemaDescriptor};
use tabplan_prompt::{Translation, Validation};
use tabplan_registry::TransformRecord;
use tracing::{info, info_span};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::AppState;

/// Rows per table in the multi-table plan preview
const PLAN_PREVIEW_ROWS: usize = 20;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(flatten)]
    pub graph: PipelineGraph,
    pub preview_data: Vec<Value>,
    pub plan: Plan,
    pub validation: Validation,
    pub fingerprint: String,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub prompt: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub success: bool,
    pub output_filename: String,
    pub preview_data: Vec<Value>,
    pub plan: Plan,
    pub validation: Validation,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub prompt: String,
    #[serde(default)]
    pub file_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExecutePlanRequest {
    pub plan: Plan,
    #[serde(default)]
    pub file_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanPreviewResponse {
    pub success: bool,
    /// table id → `{columns, data}`
    pub results: Map<String, Value>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AppState {
    fn translate(&self, prompt: &str, schema: &SchemaDescriptor) -> Translation {
        let translation = self.translator.translate(prompt, schema);
        self.metrics.record_validation(translation.validation.valid);
        self.metrics.record_plan(&translation.fired);
        translation
    }

    fn run(&self, source: &DataTable, plan: &Plan) -> Result<PlanOutput, ApiError> {
        match execute_plan(source, plan) {
            Ok(output) => {
                self.metrics.record_noops(output.trace.len());
                Ok(output)
            }
            Err(e) => {
                self.metrics.record_transform("error");
                Err(e.into())
            }
        }
    }

    fn first_source(&self, file_ids: &[String]) -> Result<Arc<DataTable>, ApiError> {
        let first = file_ids.first().ok_or(ApiError::NoFiles)?;
        Ok(self.registry.get(first)?)
    }
}

/// Plan a prompt against a stored table (or the demo schema) and describe it
pub fn generate(state: &AppState, req: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
    let source = req
        .filename
        .as_deref()
        .map(|name| state.registry.get(name))
        .transpose()?;

    let schema = match &source {
        Some(table) => table.schema(),
        None => SchemaDescriptor::new(state.config.engine.demo_schema.iter().cloned()),
    };

    let translation = state.translate(&req.prompt, &schema);

    let preview_data = match &source {
        Some(table) => {
            let output = state.run(table, &translation.plan)?;
            output
                .first_non_empty()
                .map(|(_, result)| format_preview(result, &state.config.engine.preview))
                .unwrap_or_default()
        }
        None => Vec::new(),
    };

    let fingerprint = translation.plan.fingerprint();
    info!(fingerprint = %fingerprint, detectors = ?translation.fired, "plan generated");

    Ok(GenerateResponse {
        graph: translation.plan.pipeline_graph(),
        preview_data,
        plan: translation.plan,
        validation: translation.validation,
        fingerprint,
    })
}

/// Plan, execute and store the primary result of a prompt over a stored table
///
/// The first non-empty result table is kept as `{table_id}_{filename}`. When
/// every result is empty the source itself is stored as `smart_{filename}`.
pub fn execute(state: &AppState, req: &ExecuteRequest) -> Result<ExecuteResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("transform", %request_id, filename = %req.filename);
    let _enter = span.enter();

    let source = state.registry.get(&req.filename)?;
    let translation = state.translate(&req.prompt, &source.schema());
    let output = state.run(&source, &translation.plan)?;

    let (output_filename, result, outcome) = match output.first_non_empty() {
        Some((table_id, table)) => (format!("{}_{}", table_id, req.filename), table.clone(), "success"),
        None => (format!("smart_{}", req.filename), (*source).clone(), "fallback"),
    };

    let preview_data = format_preview(&result, &state.config.engine.preview);
    let output_rows = result.height();
    state.registry.insert(output_filename.clone(), result);

    let fingerprint = translation.plan.fingerprint();
    let mut metadata = Map::new();
    metadata.insert("prompt".to_string(), Value::from(req.prompt.as_str()));
    metadata.insert("fingerprint".to_string(), Value::from(fingerprint.as_str()));

    let transform_id = format!("transform_{}", output_filename);
    state.lineage.record_transform(TransformRecord {
        source: &req.filename,
        source_rows: source.height(),
        transform_id: &transform_id,
        transform_label: "Smart Transform",
        transform_metadata: metadata,
        output: &output_filename,
        output_rows,
    });
    state.metrics.record_transform(outcome);

    crate::log_event!(
        level: tracing::Level::INFO,
        event: "transform_executed",
        output: output_filename,
        rows: output_rows,
        noops: output.trace.len(),
        fingerprint: fingerprint
    );

    Ok(ExecuteResponse {
        success: true,
        output_filename,
        preview_data,
        plan: translation.plan,
        validation: translation.validation,
        diagnostics: output.trace,
    })
}

pub fn validate(state: &AppState, prompt: &str) -> Validation {
    let validation = state.translator.validator().validate(prompt);
    state.metrics.record_validation(validation.valid);
    validation
}

/// Plan against the first listed table without executing
pub fn generate_plan(state: &AppState, req: &PlanRequest) -> Result<Plan, ApiError> {
    let source = state.first_source(&req.file_ids)?;
    Ok(state.translate(&req.prompt, &source.schema()).plan)
}

/// Execute a caller-supplied plan and preview every result table
pub fn execute_plan_preview(state: &AppState, req: &ExecutePlanRequest) -> Result<PlanPreviewResponse, ApiError> {
    req.plan.check().map_err(ExecutionError::from)?;
    let source = state.first_source(&req.file_ids)?;
    let output = state.run(&source, &req.plan)?;
    state.metrics.record_transform("preview");

    let results = output
        .iter()
        .map(|(table_id, table)| {
            let preview = json!({
                "columns": table.columns(),
                "data": table.head(PLAN_PREVIEW_ROWS).to_records(),
            });
            (table_id.to_string(), preview)
        })
        .collect();

    if !output.trace.is_empty() {
        info!(noops = output.trace.len(), "plan executed with skipped operations");
    }

    Ok(PlanPreviewResponse {
        success: true,
        results,
        diagnostics: output.trace,
    })
}
