use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("user directory error: {0}")]
    Directory(String),
    #[error("ticket store error: {0}")]
    Store(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("ticket".to_string()),
            other => AppError::Store(other.to_string()),
        }
    }
}
