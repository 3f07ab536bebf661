use axum::Router;
use axum::routing::get;

use crate::state::AppState;

pub mod health;

/// API routes without the prefix; `create_router` mounts them.
pub fn routes(state: &AppState) -> Router {
    domain_users::handlers::router(state.user_service())
}

/// `/ready`, checking the database on every call.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
