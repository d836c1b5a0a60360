//! The error type every handler returns and its JSON rendering:
//! `{ "error": message, "code": CODE }`, plus `details` (field to
//! messages) for request validation failures.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sonora_cloud::CloudError;
use sonora_core::error::CoreError;
use sonora_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Object storage, text extraction or the AI provider.
    #[error("External service error: {0}")]
    Cloud(#[from] CloudError),

    /// `validator` rejected a request body.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A bulk chunk ran past its timeout; earlier chunks stay committed.
    #[error("Batch {batch} timed out after {timeout_secs}s")]
    BatchTimeout { batch: usize, timeout_secs: u64 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(e) => Self::Database(e),
            DbError::Core(e) => Self::Core(e),
            DbError::Timeout { batch, timeout_secs } => Self::BatchTimeout { batch, timeout_secs },
        }
    }
}

/// PostgreSQL SQLSTATE codes that are the client's fault.
mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const CHECK_VIOLATION: &str = "23514";
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorBody {
    fn new(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    /// Opaque 500 body; the cause is logged, never returned.
    fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "An internal error occurred")
    }
}

impl AppError {
    fn render(&self) -> (StatusCode, ErrorBody) {
        match self {
            Self::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("NOT_FOUND", format!("{entity} with id {id} not found")),
            ),
            Self::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new("VALIDATION_ERROR", msg.as_str()))
            }
            Self::Core(CoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, ErrorBody::new("CONFLICT", msg.as_str()))
            }
            Self::Core(CoreError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, ErrorBody::new("UNAUTHORIZED", msg.as_str()))
            }
            Self::Core(CoreError::Forbidden(msg)) => {
                (StatusCode::FORBIDDEN, ErrorBody::new("FORBIDDEN", msg.as_str()))
            }
            Self::Core(CoreError::Internal(msg)) => {
                tracing::error!(error = %msg, "Internal core error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }
            Self::Database(err) => render_sqlx(err),
            Self::Cloud(CloudError::Config(msg)) => {
                tracing::error!(error = %msg, "External service misconfigured");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }
            Self::Cloud(err) => {
                tracing::error!(error = %err, "External service failed");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody::new("UPSTREAM_ERROR", "An external service failed"),
                )
            }
            Self::Validation(errors) => {
                let mut body = ErrorBody::new("VALIDATION_ERROR", "Request validation failed");
                body.details = Some(field_messages(errors));
                (StatusCode::BAD_REQUEST, body)
            }
            Self::BatchTimeout { .. } => {
                tracing::warn!(error = %self, "Bulk insert timed out");
                (StatusCode::GATEWAY_TIMEOUT, ErrorBody::new("BATCH_TIMEOUT", self.to_string()))
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new("BAD_REQUEST", msg.as_str())),
            Self::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.render();
        (status, Json(body)).into_response()
    }
}

/// One entry per invalid field, holding each failed rule's message (or its
/// code when the rule has no message).
fn field_messages(errors: &validator::ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, failures)| {
            let messages = failures
                .iter()
                .map(|f| f.message.as_ref().unwrap_or(&f.code).to_string())
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Constraint violations are the client's fault; unique violations are
/// 409 only on `uq_` constraints. Anything else is an opaque 500.
fn render_sqlx(err: &sqlx::Error) -> (StatusCode, ErrorBody) {
    if let sqlx::Error::RowNotFound = err {
        return (StatusCode::NOT_FOUND, ErrorBody::new("NOT_FOUND", "Resource not found"));
    }
    if let sqlx::Error::Database(db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some(sqlstate::UNIQUE_VIOLATION) if constraint.starts_with("uq_") => {
                return (
                    StatusCode::CONFLICT,
                    ErrorBody::new("CONFLICT", format!("Duplicate value violates {constraint}")),
                );
            }
            Some(sqlstate::FOREIGN_KEY_VIOLATION) => {
                return (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("INVALID_REFERENCE", format!("Referenced record does not exist ({constraint})")),
                );
            }
            Some(sqlstate::CHECK_VIOLATION) => {
                return (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("VALIDATION_ERROR", format!("Value violates {constraint}")),
                );
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(email)]
        email: String,
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn validation_errors_list_each_field() {
        let errors = Probe {
            email: "nope".into(),
            name: String::new(),
        }
        .validate()
        .unwrap_err();
        let (status, body) = AppError::from(errors).render();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "VALIDATION_ERROR");
        let details = body.details.unwrap();
        assert_eq!(details["email"], vec!["email"]);
        assert_eq!(details["name"], vec!["Name is required"]);
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (CoreError::NotFound { entity: "Contract", id: 9 }, StatusCode::NOT_FOUND),
            (CoreError::Conflict("taken".into()), StatusCode::CONFLICT),
            (CoreError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (CoreError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::Core(err).render().0, expected);
        }
    }

    #[test]
    fn internal_details_are_hidden() {
        let (_, body) = AppError::InternalError("db password is hunter2".into()).render();
        assert_eq!(body.error, "An internal error occurred");
        assert!(body.details.is_none());
    }

    #[test]
    fn db_errors_keep_their_kind() {
        let err = AppError::from(DbError::Timeout { batch: 2, timeout_secs: 30 });
        assert_matches!(err, AppError::BatchTimeout { batch: 2, timeout_secs: 30 });

        let err = AppError::from(DbError::Core(CoreError::Validation("bad sort".into())));
        assert_matches!(err, AppError::Core(CoreError::Validation(_)));

        let err = AppError::from(DbError::Sqlx(sqlx::Error::RowNotFound));
        assert_eq!(err.render().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn batch_timeout_is_a_gateway_timeout() {
        let (status, body) = AppError::BatchTimeout { batch: 3, timeout_secs: 30 }.render();
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body.error, "Batch 3 timed out after 30s");
    }
}
