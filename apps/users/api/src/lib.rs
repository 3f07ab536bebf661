//! Users HTTP service.
//!
//! Routes:
//! - `{API_PREFIX}/users/...` CRUD and password change
//! - `/health` liveness, `/ready` database readiness
//! - `/swagger-ui`, `/redoc`, `/rapidoc`, `/scalar`, `/api-docs/openapi.json`

use axum::Router;
use axum_helpers::server::{create_router, health_router};

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

use state::AppState;

/// Full application router for `state`
pub fn build_app(state: &AppState) -> std::io::Result<Router> {
    let router = create_router::<openapi::ApiDoc>(
        api::routes(state),
        &state.config.api_prefix,
        &state.config.environment,
    )?;

    Ok(router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone())))
}
