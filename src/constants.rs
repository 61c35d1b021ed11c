//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "wingspot";

/// Largest accepted upload, in bytes (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of entries kept in the scan history.
pub const HISTORY_CAPACITY: usize = 5;

/// Media type prefix that marks a file as an image.
pub const IMAGE_MEDIA_PREFIX: &str = "image/";

/// Capture-time format for history entries (two-digit hour and minute).
pub const HISTORY_TIME_FORMAT: &str = "%H:%M";

/// Separator between label and time when a history entry is rendered.
pub const HISTORY_SEPARATOR: &str = " • ";

/// Default inference timeout in seconds.
pub const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 30;

/// Camera capture defaults.
pub mod camera {
    /// Raster width used when the track reports none.
    pub const DEFAULT_WIDTH: u32 = 640;
    /// Raster height used when the track reports none.
    pub const DEFAULT_HEIGHT: u32 = 480;
    /// JPEG quality for the intermediate snapshot encoding (0.92).
    pub const JPEG_QUALITY: u8 = 92;
    /// Facing mode requested when opening a camera.
    pub const FACING_MODE: &str = "environment";
}

/// Classifier defaults, matching MobileNet v2 at full width.
pub mod model {
    /// Model architecture version.
    pub const VERSION: u8 = 2;
    /// Width multiplier.
    pub const ALPHA: f32 = 1.0;
    /// Square input edge in pixels.
    pub const INPUT_SIZE: u32 = 224;
    /// Number of predictions returned per image.
    pub const TOP_K: usize = 3;
    /// Supported width multipliers.
    pub const SUPPORTED_ALPHAS: [f32; 4] = [0.25, 0.5, 0.75, 1.0];
    /// Supported architecture versions.
    pub const SUPPORTED_VERSIONS: [u8; 2] = [1, 2];
}

/// Probability value bounds.
pub mod probability {
    /// Minimum valid probability.
    pub const MIN: f32 = 0.0;
    /// Maximum valid probability.
    pub const MAX: f32 = 1.0;
    /// Decimal places for percentage formatting.
    pub const DECIMAL_PLACES: usize = 1;
}

/// User-facing messages.
pub mod messages {
    /// Shown when a submitted file is not an image.
    pub const INVALID_MEDIA_TYPE: &str = "Please upload a valid image file.";
    /// Shown when a submitted file exceeds the size limit.
    pub const FILE_TOO_LARGE: &str = "Image is too large. Keep it under 10 MB.";
    /// Shown when the classifier returns no predictions.
    pub const UNRECOGNIZED: &str = "Unable to recognize this butterfly. Try a clearer photo.";
    /// Shown when live capture is not available.
    pub const CAMERA_UNSUPPORTED: &str = "Camera capture is not supported on this device.";
    /// Prefix for camera failures.
    pub const CAMERA_ERROR_PREFIX: &str = "Camera error: ";
    /// Prefix for every other failure.
    pub const FAILURE_PREFIX: &str = "Something went wrong: ";
    /// Shown when a request arrives while another is in flight.
    pub const BUSY: &str = "Still identifying the previous photo. Try again in a moment.";
}
