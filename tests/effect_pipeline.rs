//! End-to-end tests through the public surface: lifecycle, frame
//! processing, and the composited output pixels.

use std::sync::Arc;

use hackervision::{
    DetailLevel, EffectConfig, EffectController, EffectError, Frame, FrameGeometry, PixelFormat,
    SessionState, ThresholdPair,
};

const ACCENT: [u8; 4] = [0, 255, 0, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const SCANLINE_BLACK: [u8; 4] = [0, 80, 0, 255];

fn rgba_vertical_step(size: u32, edge_at: u32) -> Frame {
    let mut data = Vec::new();
    for _y in 0..size {
        for x in 0..size {
            let v = if x >= edge_at { 255 } else { 0 };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    Frame::from_vec(
        data,
        FrameGeometry::new(size, size),
        PixelFormat::Rgba8,
        size as usize * 4,
    )
    .unwrap()
}

fn gray_horizontal_step(size: u32, edge_at: u32) -> Frame {
    let mut data = Vec::new();
    for y in 0..size {
        for _x in 0..size {
            data.push(if y >= edge_at { 255 } else { 0 });
        }
    }
    Frame::from_vec(
        data,
        FrameGeometry::new(size, size),
        PixelFormat::Gray8,
        size as usize,
    )
    .unwrap()
}

fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 4] {
    let row = frame.row(y);
    let px = &row[x as usize * 4..][..4];
    [px[0], px[1], px[2], px[3]]
}

fn active_controller(geometry: FrameGeometry) -> Arc<EffectController> {
    let controller = Arc::new(EffectController::new(EffectConfig::default()));
    controller.request_start(true).unwrap();
    controller.start_session(geometry).unwrap();
    controller
}

#[test]
fn vertical_edge_becomes_a_single_accent_column() {
    let controller = active_controller(FrameGeometry::new(4, 4));
    controller.set_sensitivity(50);

    let output = controller.on_frame(&rgba_vertical_step(4, 2)).unwrap();

    for y in 0..4 {
        for x in 0..4 {
            let expected = if x == 2 {
                // accent green saturates through the scanline tint
                ACCENT
            } else if y % 4 == 0 {
                SCANLINE_BLACK
            } else {
                BLACK
            };
            assert_eq!(pixel(&output, x, y), expected, "({x},{y})");
        }
    }
}

#[test]
fn edge_column_tracks_the_step_position() {
    let controller = active_controller(FrameGeometry::new(8, 8));
    controller.set_sensitivity(50);

    let output = controller.on_frame(&rgba_vertical_step(8, 4)).unwrap();

    for y in 0..8 {
        for x in 0..8 {
            let green = pixel(&output, x, y) == ACCENT;
            assert_eq!(green, x == 4, "({x},{y})");
        }
    }
}

#[test]
fn horizontal_edge_becomes_a_single_accent_row() {
    let controller = active_controller(FrameGeometry::new(6, 6));
    controller.set_sensitivity(50);

    let output = controller.on_frame(&gray_horizontal_step(6, 3)).unwrap();

    for y in 0..6 {
        for x in 0..6 {
            let green = pixel(&output, x, y) == ACCENT;
            assert_eq!(green, y == 3, "({x},{y})");
        }
    }
}

#[test]
fn uniform_frame_produces_no_edges() {
    let controller = active_controller(FrameGeometry::new(8, 8));

    let flat = Frame::from_vec(
        vec![128; 64],
        FrameGeometry::new(8, 8),
        PixelFormat::Gray8,
        8,
    )
    .unwrap();
    let output = controller.on_frame(&flat).unwrap();

    for y in 0..8 {
        for x in 0..8 {
            let expected = if y % 4 == 0 { SCANLINE_BLACK } else { BLACK };
            assert_eq!(pixel(&output, x, y), expected, "({x},{y})");
        }
    }
}

#[test]
fn full_lifecycle_with_permission_flow() {
    let controller = Arc::new(EffectController::new(EffectConfig::default()));
    assert_eq!(controller.state(), SessionState::Idle);

    assert_eq!(
        controller.request_start(false).unwrap(),
        SessionState::Authorizing
    );
    controller.authorization_granted().unwrap();
    assert_eq!(controller.state(), SessionState::Ready);

    controller.start_session(FrameGeometry::new(4, 4)).unwrap();
    assert_eq!(controller.state(), SessionState::Active);

    let frame = rgba_vertical_step(4, 2);
    drop(controller.on_frame(&frame).unwrap());

    controller.pause().unwrap();
    controller.resume().unwrap();
    drop(controller.on_frame(&frame).unwrap());

    controller.stop();
    assert_eq!(controller.state(), SessionState::Stopped);
    assert!(matches!(
        controller.on_frame(&frame),
        Err(EffectError::InvalidTransition { .. })
    ));
}

#[test]
fn denied_permission_terminates_the_attempt() {
    let controller = Arc::new(EffectController::new(EffectConfig::default()));
    controller.request_start(false).unwrap();

    assert!(matches!(
        controller.authorization_denied(),
        Err(EffectError::PermissionDenied)
    ));
    assert_eq!(controller.state(), SessionState::Stopped);

    // a fresh attempt is allowed after the denial
    assert_eq!(
        controller.request_start(false).unwrap(),
        SessionState::Authorizing
    );
}

#[test]
fn session_restarts_with_a_new_geometry() {
    let controller = active_controller(FrameGeometry::new(4, 4));
    drop(controller.on_frame(&rgba_vertical_step(4, 2)).unwrap());

    controller.stop();
    controller.request_start(true).unwrap();
    controller.start_session(FrameGeometry::new(6, 6)).unwrap();

    let output = controller.on_frame(&gray_horizontal_step(6, 3)).unwrap();
    assert_eq!(output.geometry(), FrameGeometry::new(6, 6));
    assert_eq!(pixel(&output, 0, 3), ACCENT);
}

#[test]
fn diagnostics_count_processed_and_skipped_frames() {
    let controller = active_controller(FrameGeometry::new(4, 4));
    let good = rgba_vertical_step(4, 2);
    let bad = rgba_vertical_step(8, 4);

    for _ in 0..3 {
        drop(controller.on_frame(&good).unwrap());
    }
    drop(controller.on_frame(&bad).unwrap());

    let snapshot = controller.diagnostics();
    assert_eq!(snapshot.frame_count, 3);
    assert_eq!(snapshot.skip_count, 1);
    assert!((snapshot.skip_rate - 25.0).abs() < 1e-9);
}

#[test]
fn sensitivity_maps_to_inverted_thresholds_and_labels() {
    let controller = active_controller(FrameGeometry::new(4, 4));

    controller.set_sensitivity(0);
    assert_eq!(controller.current_label(), DetailLevel::Architectural);
    controller.set_sensitivity(100);
    assert_eq!(controller.current_label(), DetailLevel::Maximum);
    assert_eq!(
        controller.current_label().display_line(),
        "SCAN DEPTH: MAXIMUM"
    );

    let relaxed = ThresholdPair::from_sensitivity(100);
    let strict = ThresholdPair::from_sensitivity(0);
    assert!(relaxed.low() < strict.low());
    assert!(relaxed.high() < strict.high());
}

#[test]
fn config_round_trips_from_partial_json() {
    let config: EffectConfig = serde_json::from_str(r#"{"initialSensitivity": 75}"#).unwrap();
    assert_eq!(config.initial_sensitivity, 75);
    assert_eq!(config.requested_width, 1280);
    assert_eq!(config.requested_height, 720);

    let controller = Arc::new(EffectController::new(config));
    assert_eq!(controller.sensitivity(), 75);
    assert_eq!(controller.current_label(), DetailLevel::Maximum);
}
