use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use critica_core::error::CoreError;
use critica_core::validation::{field_messages, NON_FIELD_ERRORS};
use critica_mail::MailError;
use serde_json::json;
use validator::ValidationErrors;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `critica_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Per-field messages attached to validation responses.
type FieldMessages = BTreeMap<String, Vec<String>>;

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Core(CoreError::InvalidFields(errors))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        AppError::InternalError(format!("Mail delivery failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string(), None)
                }
                CoreError::Validation(msg) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                    Some(non_field(msg)),
                ),
                CoreError::InvalidFields(errors) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Validation failed".to_string(),
                    Some(field_messages(errors)),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
                }
                CoreError::Forbidden(msg) => {
                    (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None)
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(fields) = fields {
            body["fields"] = json!(fields);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String, Option<FieldMessages>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}

fn non_field(msg: &str) -> FieldMessages {
    single(NON_FIELD_ERRORS, msg.to_string())
}

fn single(field: &str, msg: String) -> FieldMessages {
    BTreeMap::from([(field.to_string(), vec![msg])])
}

/// Map a constraint name to the request field it guards.
///
/// Constraints are named `<uq|ck>_<table>_<column>[_<detail>]`; the review
/// pair constraint has no single field.
fn constraint_field(constraint: &str) -> &str {
    if constraint == "uq_reviews_author_title" {
        return NON_FIELD_ERRORS;
    }
    let mut parts = constraint.splitn(4, '_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("uq" | "ck"), Some(_table), Some(column)) if !column.is_empty() => column,
        _ => NON_FIELD_ERRORS,
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique (`23505`), foreign-key (`23503`) and check (`23514`) violations
///   map to 400; unique violations report under the guarded field.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String, Option<FieldMessages>) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some("23505") => {
                    let field = constraint_field(constraint);
                    let msg = if field == NON_FIELD_ERRORS {
                        "You have already reviewed this title".to_string()
                    } else {
                        format!("An entry with this {field} already exists")
                    };
                    (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        msg.clone(),
                        Some(single(field, msg)),
                    )
                }
                Some("23503") => (
                    StatusCode::BAD_REQUEST,
                    "BAD_REQUEST",
                    format!("Referenced entity does not exist: {constraint}"),
                    None,
                ),
                Some("23514") => {
                    let field = constraint_field(constraint);
                    let msg = format!("Value violates constraint: {constraint}");
                    (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        msg.clone(),
                        Some(single(field, msg)),
                    )
                }
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    internal()
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
