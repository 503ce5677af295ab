//! Error types shared across Viewfinder crates.

/// Top-level error type for Viewfinder operations.
#[derive(Debug, thiserror::Error)]
pub enum ViewfinderError {
    #[error("Camera access is not authorized")]
    NotAuthorized,

    #[error("No cameras available")]
    NoCamerasAvailable,

    #[error("Camera is in use by another application: {name}")]
    CameraInUse { name: String },

    #[error("Configuration failed: {message}")]
    ConfigurationFailed { message: String },

    #[error("Session failed to start: {message}")]
    SessionStart { message: String },

    #[error("Platform error: {message}")]
    Platform { message: String },

    #[error("Configuration file error: {message}")]
    Config { message: String },

    #[error("Unknown error: {message}")]
    Unknown { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ViewfinderError.
pub type ViewfinderResult<T> = Result<T, ViewfinderError>;

impl ViewfinderError {
    pub fn camera_in_use(name: impl Into<String>) -> Self {
        Self::CameraInUse { name: name.into() }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationFailed {
            message: msg.into(),
        }
    }

    pub fn session_start(msg: impl Into<String>) -> Self {
        Self::SessionStart {
            message: msg.into(),
        }
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown {
            message: msg.into(),
        }
    }
}
