//! Login and logout

use crate::core::auth::bearer_token;
use crate::core::config::AppState;
use crate::core::error::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub account_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// POST /sessions
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(req) = payload?;
    info!("POST /sessions - {}", req.email.trim());

    let (account_id, session) = state
        .accounts
        .authenticate(&req.email, &req.password)
        .await?;

    Ok(Json(LoginResponse {
        token: session.token,
        account_id,
        expires_at: session.expires_at,
    }))
}

/// DELETE /sessions
///
/// Always succeeds, with or without a token.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    info!("DELETE /sessions");

    if let Some(token) = bearer_token(&headers) {
        state.accounts.logout(token).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}
