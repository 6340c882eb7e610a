use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// An interval could not be read or is invalid. Fatal to the check loop.
    #[error("Configuration error: {0}")]
    Config(#[from] tether_core::TetherError),

    /// The connection is closed; the request was not written.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The transport refused the request (e.g. its outbound queue is full).
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The check loop task panicked or was aborted.
    #[error("Check loop aborted: {0}")]
    CheckLoop(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
