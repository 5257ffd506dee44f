use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BinError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("remote unavailable: {0}")]
    Remote(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("missing distance sensor")]
    MissingDistanceSensor,
    #[error("missing load cell")]
    MissingLoadCell,
    #[error("missing touch sensor")]
    MissingTouchSensor,
    #[error("missing servo")]
    MissingServo,
    #[error("missing display")]
    MissingDisplay,
    #[error("missing buzzer")]
    MissingBuzzer,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
