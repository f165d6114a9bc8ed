use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BinError {
    #[error("actuator fault: {0}")]
    Actuator(String),
    #[error("indicator fault: {0}")]
    Indicator(String),
    #[error("buzzer fault: {0}")]
    Buzzer(String),
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing lid ranging pins")]
    MissingLidRanging,
    #[error("missing fill ranging pins")]
    MissingFillRanging,
    #[error("missing lid actuator")]
    MissingActuator,
    #[error("missing indicators")]
    MissingIndicators,
    #[error("missing buzzer")]
    MissingBuzzer,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

/// Coarse classification of a failed loop tick, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFault {
    /// Actuator, indicator or buzzer refused a command.
    Drive,
    Unclassified,
}

impl TickFault {
    pub fn classify(report: &eyre::Report) -> Self {
        match report.downcast_ref::<BinError>() {
            Some(BinError::Actuator(_) | BinError::Indicator(_) | BinError::Buzzer(_)) => {
                TickFault::Drive
            }
            _ => TickFault::Unclassified,
        }
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
