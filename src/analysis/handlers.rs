use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::dto::{AnalyzeResponse, ChatSessionSummary, LabelItem};
use super::error::InferenceError;
use super::services;
use crate::{
    chat::services::open_session,
    images::services::{is_supported_mime, preprocess, UploadItem},
    nutrition::label::parse,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/labels", get(list_labels))
}

pub fn write_routes(upload_limit_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze)) // multipart field "file"
        .layer(DefaultBodyLimit::max(upload_limit_bytes))
}

#[instrument(skip(state))]
pub async fn list_labels(State(state): State<AppState>) -> Json<Vec<LabelItem>> {
    let items = state
        .labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let parsed = parse(label);
            LabelItem {
                index,
                label: label.to_string(),
                parsed: !parsed.is_fallback(),
                facts: parsed.facts().clone(),
            }
        })
        .collect();
    Json(items)
}

/// POST /analyze (multipart, one JPG/PNG in field `file`)
#[instrument(skip(state, mp))]
pub async fn analyze(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<AnalyzeResponse>, (StatusCode, String)> {
    let mut upload: Option<UploadItem> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        upload = Some(UploadItem { body, content_type });
        break;
    }

    let Some(upload) = upload else {
        return Err((StatusCode::BAD_REQUEST, "file is required".into()));
    };
    if !is_supported_mime(&upload.content_type) {
        warn!(content_type = %upload.content_type, "unsupported upload type");
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "only JPG and PNG images are supported".into(),
        ));
    }

    let size = state.config.model_input_size;
    let tensor = tokio::task::spawn_blocking(move || preprocess(&upload, size))
        .await
        .map_err(internal)?
        .map_err(|e| reject(InferenceError::from(e)))?;

    let record = services::run(
        &tensor,
        state.classifier.as_ref(),
        &state.labels,
        state.config.daily_target_kcal,
    )
    .await
    .map_err(reject)?;
    info!(
        food = %record.food_name,
        confidence = record.confidence,
        calories = record.calories,
        "food analysed"
    );

    let chat_session = open_session(&state, &record)
        .await
        .map(|(id, remaining_questions)| ChatSessionSummary {
            id,
            remaining_questions,
        });

    Ok(Json(AnalyzeResponse {
        record,
        chat_session,
    }))
}

fn reject(e: InferenceError) -> (StatusCode, String) {
    let status = match e {
        InferenceError::InvalidImage(_) => StatusCode::BAD_REQUEST,
        InferenceError::Model(_) | InferenceError::EmptyPrediction => StatusCode::BAD_GATEWAY,
        InferenceError::ConfigMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_client_error() {
        warn!(error = %e, "analysis rejected");
    } else {
        error!(error = %e, "analysis failed");
    }
    (status, e.to_string())
}

fn internal<E: std::error::Error>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
