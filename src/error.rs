use thiserror::Error;

/// Failures at the highscore boundary (service calls and storage)
#[derive(Debug, Error)]
pub enum HighScoreError {
    /// The request never produced a response
    #[error("highscore request failed: {0}")]
    Network(String),
    #[error("highscore service responded with status {0}")]
    Status(u16),
    #[error("malformed highscore data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("highscore storage error: {0}")]
    Io(#[from] std::io::Error),
}
