//! Account handlers

use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::models::{AccountInfo, NewAccount};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub account_id: i64,
    pub message: String,
}

/// POST /accounts
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewAccount>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    info!("POST /accounts - {}", req.email.trim());

    let account_id = state.accounts.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            account_id,
            message: "Registration successful! Please login.".to_string(),
        }),
    ))
}

/// GET /accounts/me
pub async fn me(State(state): State<AppState>, ctx: Ctx) -> Result<Json<AccountInfo>> {
    let account = state.accounts.get_account(ctx.account_id()).await?;

    Ok(Json(account))
}
