//! Pass request handlers. All routes here sit behind `mw_require_auth`.

use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::models::{NewPassRequest, PassRequest, PassSummary, SubmitReceipt};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

/// POST /pass-requests
pub async fn submit_pass(
    State(state): State<AppState>,
    ctx: Ctx,
    payload: std::result::Result<Json<NewPassRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitReceipt>)> {
    let Json(req) = payload?;
    info!("POST /pass-requests - account {}", ctx.account_id());

    let receipt = state.passes.submit(&ctx, ctx.account_id(), req).await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /pass-requests
pub async fn list_passes(State(state): State<AppState>, ctx: Ctx) -> Result<Json<Vec<PassRequest>>> {
    let passes = state.passes.list_by_owner(&ctx, ctx.account_id()).await?;

    Ok(Json(passes))
}

/// GET /pass-requests/history
pub async fn pass_history(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<Vec<PassSummary>>> {
    let history = state.passes.history(&ctx, ctx.account_id()).await?;

    Ok(Json(history))
}

/// DELETE /pass-requests/{id}
pub async fn delete_pass(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(pass_id): Path<i64>,
) -> Result<StatusCode> {
    info!("DELETE /pass-requests/{} - account {}", pass_id, ctx.account_id());

    state.passes.delete(&ctx, ctx.account_id(), pass_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
