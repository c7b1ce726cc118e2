use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("{0} motor not connected")]
    Disconnected(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
