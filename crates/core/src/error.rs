/// Result alias that carries the custom [`BeatlineError`] type.
pub type Result<T> = std::result::Result<T, BeatlineError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum BeatlineError {
    /// Input rejected before it reaches the grid engine, e.g. an
    /// out-of-range tempo or empty lyric text.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The audio file could not be decoded. The session is left in its
    /// pre-load state when this is returned.
    #[error("decode failed: {0}")]
    Decode(String),
    /// An external collaborator (tempo detection, transcription, clip
    /// probing) reported a failure. Never fatal to the session.
    #[error("external collaborator failed: {0}")]
    External(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl BeatlineError {
    /// Creates an external-collaborator error from any displayable message.
    pub fn external<T: Into<String>>(msg: T) -> Self {
        Self::External(msg.into())
    }
}
