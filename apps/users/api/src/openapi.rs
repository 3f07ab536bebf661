use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::HealthResponse)
    ),
    info(
        title = "Users API",
        version = "0.1.0",
        description = "User records with lifecycle events published to the broker"
    ),
    nest(
        (path = crate::config::DEFAULT_API_PREFIX, api = domain_users::ApiDoc)
    )
)]
pub struct ApiDoc;
