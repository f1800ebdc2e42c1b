use thiserror::Error;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum MimeMapError {
    #[error("malformed mailcap entry: {0}")]
    MailcapParse(String),

    #[error("malformed mime.types entry: {0}")]
    MimeTypesParse(String),

    #[error("no data content handler available for {0}")]
    UnsupportedDataType(String),

    #[error("invalid file path: {0}")]
    InvalidPath(PathBuf),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MimeMapError>;
