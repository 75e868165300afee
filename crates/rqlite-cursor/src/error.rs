use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A statement failed on the server. Carries the failing result item as JSON.
    #[error("database error: {0}")]
    Database(String),

    #[error("not supported: {0}")]
    NotSupported(&'static str),

    #[error("cannot convert column {column}: {message}")]
    Conversion { column: String, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ureq::Transport> for DbError {
    fn from(e: ureq::Transport) -> Self {
        DbError::Transport(e.to_string())
    }
}

impl DbError {
    pub fn code(&self) -> &'static str {
        match self {
            DbError::InvalidArgument(_) => "INVALID_ARGUMENT",
            DbError::Database(_) => "DATABASE_ERROR",
            DbError::NotSupported(_) => "NOT_SUPPORTED",
            DbError::Conversion { .. } => "CONVERSION_ERROR",
            DbError::Transport(_) => "TRANSPORT_ERROR",
            DbError::Io(_) => "IO_ERROR",
            DbError::Json(_) => "JSON_ERROR",
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
