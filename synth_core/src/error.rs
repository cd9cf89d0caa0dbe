use thiserror::Error;

/// Session error types
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to configure synthesis stream: {0}")]
    Config(anyhow::Error),

    #[error("Synthesis stream receive failed: {0}")]
    Receive(anyhow::Error),

    #[error("Session cancelled")]
    Cancelled,
}
