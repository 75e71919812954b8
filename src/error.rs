use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(String),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        LedgerError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::Conflict(_))
    }

    /// HTTP status an adapter should answer with for this error
    pub fn status_hint(&self) -> u16 {
        match self {
            LedgerError::NotFound { .. } => 404,
            LedgerError::Conflict(_) => 409,
            LedgerError::InvalidInput(_) => 400,
            LedgerError::Storage(_) | LedgerError::Schema(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
