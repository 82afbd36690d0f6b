//! HTTP routes
//!
//! Public routes cover registration, login, logout and health. Everything
//! under `/pass-requests` and `/accounts/me` goes through `mw_require_auth`.

use crate::core::auth::middleware::mw_require_auth;
use crate::core::AppState;
use crate::handlers;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/accounts/me", get(handlers::me))
        .route(
            "/pass-requests",
            get(handlers::list_passes).post(handlers::submit_pass),
        )
        .route("/pass-requests/history", get(handlers::pass_history))
        .route("/pass-requests/{id}", delete(handlers::delete_pass))
        .route_layer(middleware::from_fn_with_state(state.clone(), mw_require_auth));

    Router::new()
        .route("/accounts", post(handlers::register))
        .route("/sessions", post(handlers::login).delete(handlers::logout))
        .route("/health", get(health_check))
        .merge(protected)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK - Pass Desk Server"
}
