use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("adc busy: {0}")]
    Busy(String),
    #[error("adc timeout")]
    Timeout,
    #[error("spi error: {0}")]
    Spi(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
