use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("ultrasonic echo timeout")]
    EchoTimeout,
    #[error("hx711 data-ready timeout")]
    DataReadyTimeout,
    #[error("remote store unavailable")]
    RemoteUnavailable,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
