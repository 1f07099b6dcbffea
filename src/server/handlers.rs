use std::time::Duration;

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::context;
use crate::errors::RelayError;
use crate::extract;
use crate::log::LogEntry;
use crate::prompt;
use crate::store;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    pub model: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub include_ui: bool,
}

#[derive(Debug, Deserialize)]
pub struct FixRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub code: String,
    pub model: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub include_ui: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub output: String,
    pub version: u32,
    pub version_path: String,
    pub script_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResponse {
    #[serde(flatten)]
    pub generated: GenerateResponse,
    pub fixed_from: FixedFrom,
}

#[derive(Debug, Serialize)]
pub struct FixedFrom {
    pub script: String,
}

pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, RelayError> {
    let model = req
        .model
        .clone()
        .unwrap_or_else(|| state.config.default_model.clone());
    let entry = state.log.begin("POST", "/generate", &model, &req.prompt);

    let result = run_pipeline(&state, &model, &req.prompt, req.language.as_deref(), req.include_ui, None).await;
    finish_entry(&state, &entry, &result);
    let (resp, _) = result?;
    Ok(Json(resp))
}

pub async fn fixcode(
    State(state): State<AppState>,
    Json(req): Json<FixRequest>,
) -> Result<Json<FixResponse>, RelayError> {
    let model = req
        .model
        .clone()
        .unwrap_or_else(|| state.config.default_model.clone());
    let entry = state.log.begin("POST", "/fixcode", &model, &req.prompt);

    let result = match validate_code(&req.code) {
        Ok(()) => {
            run_pipeline(
                &state,
                &model,
                &req.prompt,
                req.language.as_deref(),
                req.include_ui,
                Some(&req.code),
            )
            .await
        }
        Err(e) => Err(e),
    };
    finish_entry(&state, &entry, &result);
    let (generated, _) = result?;

    Ok(Json(FixResponse {
        generated,
        fixed_from: FixedFrom { script: store::script_name_for(&req.code) },
    }))
}

fn validate_code(code: &str) -> Result<(), RelayError> {
    if code.trim().is_empty() {
        return Err(RelayError::Input("Missing code.".into()));
    }
    Ok(())
}

/// Shared request pipeline: validate, load context, compose, call the
/// provider, extract, persist a version.
async fn run_pipeline(
    state: &AppState,
    model: &str,
    user_prompt: &str,
    language: Option<&str>,
    include_ui: bool,
    fix_code: Option<&str>,
) -> Result<(GenerateResponse, Duration), RelayError> {
    if user_prompt.trim().is_empty() {
        return Err(RelayError::Input("Missing prompt.".into()));
    }
    let provider = state
        .provider
        .as_ref()
        .ok_or_else(|| RelayError::Config("OpenRouter API key is not configured".into()))?;

    let ctx = context::load_primary(&state.config.context_path)?;
    let ui_docs = if include_ui {
        context::load_ui_docs(&state.config.ui_context_path)
    } else {
        None
    };

    let full_prompt = match fix_code {
        Some(code) => prompt::fix_prompt(&ctx, ui_docs.as_deref(), user_prompt, code, language),
        None => prompt::generation_prompt(&ctx, ui_docs.as_deref(), user_prompt, language),
    };

    let generation = provider.generate(model, &full_prompt).await?;
    let code = extract::extract(&generation.output);
    let stored = state.store.record(&code, Some(user_prompt))?;

    Ok((
        GenerateResponse {
            output: code,
            version: stored.version,
            version_path: stored.path.display().to_string(),
            script_name: stored.script_name,
        },
        generation.elapsed,
    ))
}

/// Reflect the request outcome into its pending log entry.
fn finish_entry(
    state: &AppState,
    entry: &str,
    result: &Result<(GenerateResponse, Duration), RelayError>,
) {
    match result {
        Ok((resp, elapsed)) => state.log.complete(
            entry,
            200,
            Some(*elapsed),
            Some(std::path::Path::new(&resp.version_path)),
            Some(resp.output.len() as u64),
        ),
        Err(err) => {
            error!("request failed: {err}");
            state.log.fail(entry, err.status().as_u16());
        }
    }
}

pub async fn api_logs(State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    Json(state.log.snapshot())
}

pub async fn logs_page(State(state): State<AppState>) -> Html<String> {
    Html(super::logs_page::render(&state.log.snapshot()))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
