use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(i32),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("User with username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Old password does not match")]
    PasswordMismatch,

    #[error("Database error: {0}")]
    Database(DbErr),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<DbErr> for UserError {
    /// Unique violations become conflicts; everything else stays a storage error.
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => UserError::Conflict(detail),
            _ => UserError::Database(err),
        }
    }
}

impl From<validator::ValidationErrors> for UserError {
    fn from(errors: validator::ValidationErrors) -> Self {
        UserError::Validation(errors.to_string())
    }
}

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            err @ (UserError::DuplicateEmail(_) | UserError::DuplicateUsername(_)) => {
                AppError::Conflict(err.to_string())
            }
            UserError::Conflict(detail) => {
                tracing::debug!(%detail, "Unique constraint violated");
                AppError::Conflict("User already exists".to_string())
            }
            UserError::Validation(msg) => AppError::BadRequest(msg),
            err @ UserError::PasswordMismatch => AppError::BadRequest(err.to_string()),
            UserError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_user_error_status_mapping() {
        let cases = [
            (UserError::NotFound(7), StatusCode::NOT_FOUND),
            (
                UserError::DuplicateEmail("a@b.c".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                UserError::Conflict("UNIQUE constraint failed: users.email".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                UserError::Validation("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (UserError::PasswordMismatch, StatusCode::BAD_REQUEST),
            (
                UserError::Database(DbErr::Custom("disk".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let label = err.to_string();
            assert_eq!(err.into_response().status(), expected, "{}", label);
        }
    }

    #[test]
    fn test_generic_db_error_is_not_conflict() {
        let err: UserError = DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, UserError::Database(_)));
    }
}
