use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ShockError {
    #[error("sensor error: {0}")]
    Sensor(String),
    #[error("watchdog error: {0}")]
    Watchdog(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
