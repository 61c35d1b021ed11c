//! Error types for wingspot.

use crate::constants::messages;

/// Result type alias for wingspot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for wingspot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Submitted file does not declare an image media type.
    #[error("'{name}' is not an image (declared type: {media_type})")]
    InvalidMediaType {
        /// Name of the submitted file.
        name: String,
        /// Declared media type.
        media_type: String,
    },

    /// Submitted file exceeds the upload size limit.
    #[error("'{name}' is {size} bytes, max allowed: {limit} bytes")]
    FileTooLarge {
        /// Name of the submitted file.
        name: String,
        /// Declared size in bytes.
        size: u64,
        /// Size limit in bytes.
        limit: u64,
    },

    /// Image bytes could not be decoded.
    #[error("could not load image '{name}'")]
    Decode {
        /// Name of the image source.
        name: String,
        /// Underlying decode error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The classifier capability is missing or not callable.
    #[error("classifier unavailable: {reason}")]
    ModelUnavailable {
        /// Why the classifier cannot be used.
        reason: String,
    },

    /// Constructing the classifier failed.
    #[error("failed to load classifier: {reason}")]
    ModelLoad {
        /// Description of the load failure.
        reason: String,
    },

    /// The classifier call itself failed.
    #[error("inference failed: {reason}")]
    Inference {
        /// Description of the inference failure.
        reason: String,
    },

    /// The classifier did not answer within the configured timeout.
    #[error("inference timed out after {secs}s")]
    InferenceTimeout {
        /// Timeout that expired, in seconds.
        secs: u64,
    },

    /// A classification is already in flight.
    #[error("a classification is already in progress")]
    Busy,

    /// No live capture is possible on this device.
    #[error("camera capture is not supported: {reason}")]
    CameraUnsupported {
        /// Why capture is unsupported.
        reason: String,
    },

    /// Permission or hardware failure while using the camera.
    #[error("{reason}")]
    CameraAccess {
        /// Description of the camera failure.
        reason: String,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Stable machine-readable code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::ConfigDirNotFound
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigValidation { .. }
            | Self::ConfigWrite { .. }
            | Self::ConfigSerialize { .. } => "CONFIG_ERROR",
            Self::InvalidMediaType { .. } => "INVALID_MEDIA_TYPE",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::ModelUnavailable { .. } => "MODEL_UNAVAILABLE",
            Self::ModelLoad { .. } => "MODEL_LOAD_ERROR",
            Self::Inference { .. } => "INFERENCE_FAILURE",
            Self::InferenceTimeout { .. } => "INFERENCE_TIMEOUT",
            Self::Busy => "BUSY",
            Self::CameraUnsupported { .. } => "CAMERA_UNSUPPORTED",
            Self::CameraAccess { .. } => "CAMERA_ACCESS_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Message shown to the user in place of results.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidMediaType { .. } => messages::INVALID_MEDIA_TYPE.to_string(),
            Self::FileTooLarge { .. } => messages::FILE_TOO_LARGE.to_string(),
            Self::CameraUnsupported { .. } => messages::CAMERA_UNSUPPORTED.to_string(),
            Self::CameraAccess { reason } => format!("{}{reason}", messages::CAMERA_ERROR_PREFIX),
            Self::Busy => messages::BUSY.to_string(),
            other => format!("{}{other}", messages::FAILURE_PREFIX),
        }
    }

    /// Whether this error was raised before any processing started.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidMediaType { .. } | Self::FileTooLarge { .. }
        )
    }
}
