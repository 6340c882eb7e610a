use thiserror::Error;

#[derive(Debug, Error)]
pub enum TetherError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid interval `{name}`: must be a positive number of milliseconds")]
    InvalidInterval { name: &'static str },
}

impl TetherError {
    /// Short error code string used in log fields and user-facing reports.
    pub fn code(&self) -> &'static str {
        match self {
            TetherError::Config(_) => "CONFIG_ERROR",
            TetherError::InvalidInterval { .. } => "INVALID_INTERVAL",
        }
    }
}

impl From<figment::Error> for TetherError {
    fn from(e: figment::Error) -> Self {
        TetherError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TetherError>;
