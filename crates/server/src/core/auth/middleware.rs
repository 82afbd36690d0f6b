use crate::core::auth::bearer_token;
use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Resolve the bearer token into a `Ctx` and attach it to the request
pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let token = bearer_token(req.headers()).ok_or(Error::AuthenticationRequired)?;
    let ctx = state.sessions.validate_session(token).await?;

    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
