use thiserror::Error;

pub type Result<T> = std::result::Result<T, JamError>;

#[derive(Debug, Error)]
pub enum JamError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("integration failed at t = {reached} after {steps} steps: {reason}")]
    NumericalFailure {
        reached: f64,
        steps: usize,
        reason: String,
    },

    #[error("reproduction number undefined: removal rate + fragment decay rate = {denominator}")]
    DivisionByZero { denominator: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl JamError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        JamError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}
