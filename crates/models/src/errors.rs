use thiserror::Error;

/// Failures raised by the entity helpers in this crate.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    /// Shorthand for a blank required field.
    pub fn required(field: &str) -> Self {
        Self::Validation(format!("{field} required"))
    }
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Db(e.to_string())
    }
}
