use validator::ValidationErrors;

/// Domain-level error shared by the `db` and `api` crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `key` is whatever the resource is addressed by: an id, a slug or a username.
    #[error("Entity not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    /// A validation failure that is not tied to a single field.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Per-field validation failures.
    #[error("Validation failed: {0}")]
    InvalidFields(#[from] ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable key.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
