//! Error types for Drishti

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Drishti error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encode/decode error
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] postcard::Error),

    /// Observation payload serialization error
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Camera backend selected in configuration but compiled without its bindings
    #[error("Camera backend '{0}' is not available in this build")]
    BackendUnavailable(&'static str),

    /// No camera backend selected
    #[error("No camera backend configured")]
    NoBackend,

    /// Operation requires a connected camera
    #[error("Camera is not connected")]
    NotConnected,

    /// Camera connect/disconnect/grab failure
    #[error("Camera error: {0}")]
    Camera(String),
}
