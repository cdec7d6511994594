use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to parse {part}: {reason}")]
    Parse { part: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
