//! Integration tests for camera capture through the orchestrator.

#![allow(clippy::unwrap_used)]

mod common;

use common::{FakeBackend, FakeCamera, Script, ScriptedSession, butterfly_predictions};
use image::{ImageFormat, Rgb, RgbImage};
use std::sync::Arc;
use tempfile::NamedTempFile;
use wingspot::Error;
use wingspot::camera::{
    LiveCamera, StillFrameDevice, StreamConstraints, TrackSettings, VideoStream,
};
use wingspot::constants::messages;
use wingspot::pipeline::Outcome;

#[tokio::test]
async fn test_snapshot_uses_track_size_and_releases_camera() {
    let session = ScriptedSession::new(Script::Answer(butterfly_predictions()));
    let orchestrator = common::orchestrator(&FakeBackend::new(Arc::clone(&session)));
    let device = FakeCamera::new(TrackSettings {
        width: Some(1280),
        height: Some(720),
    });

    let camera = LiveCamera::open(&device, &StreamConstraints::default())
        .await
        .unwrap();
    let outcome = orchestrator.submit_camera_frame(camera).await;

    assert!(outcome.is_ranked());
    assert_eq!(session.last_size(), Some((1280, 720)));
    assert!(!device.stream.is_live());
    assert_eq!(orchestrator.completed_scans(), 1);
}

#[tokio::test]
async fn test_snapshot_falls_back_to_default_size() {
    let session = ScriptedSession::new(Script::Answer(butterfly_predictions()));
    let orchestrator = common::orchestrator(&FakeBackend::new(Arc::clone(&session)));
    let device = FakeCamera::new(TrackSettings::default());

    let camera = LiveCamera::open(&device, &StreamConstraints::default())
        .await
        .unwrap();
    orchestrator.submit_camera_frame(camera).await;

    assert_eq!(session.last_size(), Some((640, 480)));
}

#[tokio::test]
async fn test_unsupported_camera_reported_inline() {
    let orchestrator = common::orchestrator(&FakeBackend::new(ScriptedSession::new(
        Script::Answer(butterfly_predictions()),
    )));
    let mut device = FakeCamera::new(TrackSettings::default());
    device.supported = false;

    let err = LiveCamera::open(&device, &StreamConstraints::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::CameraUnsupported { .. }));

    let outcome = orchestrator.report(&err);
    assert_eq!(
        outcome,
        Outcome::Failed {
            code: "CAMERA_UNSUPPORTED".to_string(),
            message: messages::CAMERA_UNSUPPORTED.to_string(),
        }
    );
    assert!(!orchestrator.is_busy());
    assert_eq!(orchestrator.completed_scans(), 0);
}

#[tokio::test]
async fn test_denied_camera_message_includes_reason() {
    let orchestrator = common::orchestrator(&FakeBackend::new(ScriptedSession::new(
        Script::Answer(butterfly_predictions()),
    )));
    let mut device = FakeCamera::new(TrackSettings::default());
    device.deny = Some("Permission denied".to_string());

    let err = LiveCamera::open(&device, &StreamConstraints::default())
        .await
        .err()
        .unwrap();
    let outcome = orchestrator.report(&err);

    assert_eq!(
        outcome,
        Outcome::Failed {
            code: "CAMERA_ACCESS_ERROR".to_string(),
            message: "Camera error: Permission denied".to_string(),
        }
    );
    assert!(orchestrator.history().is_empty());
}

#[tokio::test]
async fn test_closed_camera_is_released() {
    let device = FakeCamera::new(TrackSettings::default());
    let camera = LiveCamera::open(&device, &StreamConstraints::default())
        .await
        .unwrap();

    camera.close();
    assert!(!device.stream.is_live());
}

#[tokio::test]
async fn test_still_frame_device_end_to_end() {
    let frame = NamedTempFile::with_suffix(".png").unwrap();
    RgbImage::from_pixel(50, 40, Rgb([120, 80, 10]))
        .save_with_format(frame.path(), ImageFormat::Png)
        .unwrap();

    let session = ScriptedSession::new(Script::Answer(butterfly_predictions()));
    let orchestrator = common::orchestrator(&FakeBackend::new(Arc::clone(&session)));
    let device = StillFrameDevice::new(frame.path());
    let constraints = StreamConstraints {
        width: Some(100),
        height: Some(80),
        ..StreamConstraints::default()
    };

    let camera = LiveCamera::open(&device, &constraints).await.unwrap();
    let outcome = orchestrator.submit_camera_frame(camera).await;

    assert!(outcome.is_ranked());
    assert_eq!(session.last_size(), Some((100, 80)));
}
