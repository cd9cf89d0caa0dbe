use synth_core::SessionError;
use thiserror::Error;

/// Relay error types
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Transport error: {0}")]
    Transport(anyhow::Error),

    #[error("Track write failed: {0}")]
    Track(anyhow::Error),

    #[error("Relay cancelled")]
    Cancelled,
}
