//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "code": 1005,
        "error": "INTERNAL_ERROR",
        "message": "An internal server error occurred",
        "stack": "incident:01932c4e-7d3a-7c11-9f0e-4a2b6f0c1d22",
        "url": "/api/v1/users/"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "code": 1001,
        "error": "VALIDATION_ERROR",
        "message": "Request validation failed",
        "details": {
            "username": [{
                "code": "length",
                "message": "username must be at least 3 characters",
                "params": {"min": 3, "value": "ab"}
            }]
        },
        "stack": "ValidationError(...)",
        "url": "/api/v1/users/"
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Invalid identifier",
    content_type = "application/json",
    example = json!({
        "code": 1002,
        "error": "INVALID_ID",
        "message": "Invalid id: abc",
        "stack": "InvalidId(\"abc\")",
        "url": "/api/v1/users/abc"
    })
)]
pub struct BadRequestIdResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "code": 1004,
        "error": "NOT_FOUND",
        "message": "User 7 not found",
        "stack": "NotFound(\"User 7 not found\")",
        "url": "/api/v1/users/7"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Conflict - Resource already exists",
    content_type = "application/json",
    example = json!({
        "code": 1008,
        "error": "CONFLICT",
        "message": "Email already registered",
        "stack": "Conflict(\"Email already registered\")",
        "url": "/api/v1/users/"
    })
)]
pub struct ConflictResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Service Unavailable",
    content_type = "application/json",
    example = json!({
        "code": 1011,
        "error": "SERVICE_UNAVAILABLE",
        "message": "Service is temporarily unavailable",
        "stack": "incident:01932c4e-7d3a-7c11-9f0e-4a2b6f0c1d22",
        "url": "/ready"
    })
)]
pub struct ServiceUnavailableResponse(pub ErrorResponse);
