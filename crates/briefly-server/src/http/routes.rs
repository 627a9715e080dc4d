//! Route handlers for the briefing API.

use axum::{
    extract::{Extension, Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use briefly_core::{BriefingRecord, MaybeEncoded, StoredBriefing, UserContext};

use super::{bad_request, AppResult, AppState, JsonResponse};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/briefings", get(list_briefings).post(save_briefing))
        .route("/api/briefings/generate", post(generate_briefing))
        .route(
            "/api/briefings/:id",
            get(get_briefing).delete(delete_briefing),
        )
        .with_state(state)
}

// === Health ===

#[derive(Serialize)]
struct HealthResponse {
    healthy: bool,
    version: String,
    uptime_seconds: u64,
}

async fn health(State(state): State<AppState>) -> Json<JsonResponse<HealthResponse>> {
    Json(JsonResponse::ok(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}

// === Generation ===

#[derive(Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    conversation: String,
}

#[derive(Serialize)]
struct GenerateResponse {
    briefing: BriefingRecord,
    saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    save_error: Option<String>,
}

async fn generate_briefing(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Json(req): Json<GenerateRequest>,
) -> AppResult<Response> {
    if req.conversation.trim().is_empty() {
        return Ok(bad_request("No conversation provided"));
    }

    let outcome = state.service.generate(&ctx, &req.conversation).await?;
    let response = GenerateResponse {
        saved: outcome.save_error.is_none(),
        save_error: outcome.save_error.map(|e| e.to_string()),
        briefing: outcome.record,
    };

    Ok(Json(JsonResponse::ok(response)).into_response())
}

// === Stored briefings ===

async fn list_briefings(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
) -> AppResult<Json<JsonResponse<Vec<StoredBriefing>>>> {
    let briefings = state.service.list(&ctx).await?;
    Ok(Json(JsonResponse::ok(briefings)))
}

async fn get_briefing(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
) -> AppResult<Json<JsonResponse<StoredBriefing>>> {
    let briefing = state.service.load(&ctx, id).await?;
    Ok(Json(JsonResponse::ok(briefing)))
}

#[derive(Serialize)]
struct DeleteResponse {
    deleted: bool,
}

async fn delete_briefing(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
) -> AppResult<Json<JsonResponse<DeleteResponse>>> {
    state.service.delete(&ctx, id).await?;
    Ok(Json(JsonResponse::ok(DeleteResponse { deleted: true })))
}

#[derive(Deserialize)]
struct SaveRequest {
    #[serde(default)]
    input_text: String,
    /// Accepted structured or string-encoded; resolved before the save so
    /// new rows are always structured.
    #[serde(default)]
    briefing_result: Option<MaybeEncoded<BriefingRecord>>,
}

#[derive(Serialize)]
struct SaveResponse {
    id: i64,
}

async fn save_briefing(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Json(req): Json<SaveRequest>,
) -> AppResult<Response> {
    let briefing_result = match req.briefing_result {
        Some(result) => result,
        None => return Ok(bad_request("input_text and briefing_result are required")),
    };
    if req.input_text.trim().is_empty() {
        return Ok(bad_request("input_text and briefing_result are required"));
    }

    let record = briefing_result.resolve("briefing_result").resolve_sections();
    // `{}`, `""`, and undecodable shapes all resolve to the empty record;
    // reject them like a missing field instead of storing an empty envelope.
    if record == BriefingRecord::default() {
        return Ok(bad_request("input_text and briefing_result are required"));
    }

    let id = state.service.save_raw(&ctx, &req.input_text, &record).await?;

    Ok(Json(JsonResponse::ok(SaveResponse { id })).into_response())
}
