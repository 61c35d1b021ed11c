//! Live camera capture.

mod device;
mod live;
mod replay;

pub use device::{StreamConstraints, TrackSettings, VideoDevice, VideoStream};
pub use live::{CaptureOptions, LiveCamera, release_all_streams};
pub use replay::StillFrameDevice;
