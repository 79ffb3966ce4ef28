//! Frame driver: event draining, rendering order, resize handling and runs.

use std::sync::{Arc, Mutex};

use glam::Mat4;
use stride_client::input::KeyScript;
use stride_client::DemoApp;
use stride_shared::animation::AnimEvent;
use stride_shared::config::DemoConfig;
use stride_shared::input::KeyCode;
use stride_shared::movement::StepOutcome;
use stride_shared::render::{BackgroundLayer, RenderBackend, Viewport};
use stride_shared::transform::Transform;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Background,
    Begin,
    ViewProj,
    Draw(Transform),
    End,
    Resize(Viewport),
    BackgroundResize(Viewport),
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Call>>>);

impl Recorder {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl RenderBackend for Recorder {
    fn begin_frame(&mut self) {
        self.push(Call::Begin);
    }
    fn set_view_proj(&mut self, _view_proj: Mat4) {
        self.push(Call::ViewProj);
    }
    fn draw_character(&mut self, transform: &Transform) {
        self.push(Call::Draw(*transform));
    }
    fn resize(&mut self, viewport: Viewport) {
        self.push(Call::Resize(viewport));
    }
    fn end_frame(&mut self) {
        self.push(Call::End);
    }
}

struct RecordingBackground(Recorder);

impl BackgroundLayer for RecordingBackground {
    fn resize(&mut self, viewport: Viewport) {
        self.0.push(Call::BackgroundResize(viewport));
    }
    fn render(&mut self) {
        self.0.push(Call::Background);
    }
}

fn recorded_app() -> (DemoApp, Recorder) {
    let rec = Recorder::default();
    let app = DemoApp::new(
        DemoConfig::default(),
        Box::new(rec.clone()),
        Box::new(RecordingBackground(rec.clone())),
    );
    (app, rec)
}

#[test]
fn frame_renders_background_then_scene_after_update() {
    let (mut app, rec) = recorded_app();
    app.push_key(KeyCode::W, true);
    app.frame(0.1);

    let calls = rec.take();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[0], Call::Background);
    assert_eq!(calls[1], Call::Begin);
    assert_eq!(calls[2], Call::ViewProj);
    match calls[3] {
        Call::Draw(t) => assert!(t.position.z > 0.0, "scene drawn before update"),
        ref other => panic!("expected draw, got {other:?}"),
    }
    assert_eq!(calls[4], Call::End);
}

#[test]
fn resize_reaches_collaborators_before_drawing() {
    let (mut app, rec) = recorded_app();
    app.push_resize(1024, 512);
    app.frame(0.016);

    let calls = rec.take();
    let vp = Viewport::new(1024, 512);
    assert_eq!(calls[0], Call::Resize(vp));
    assert_eq!(calls[1], Call::BackgroundResize(vp));
    assert_eq!(app.camera.aspect, 2.0);
    assert_eq!(app.viewport(), vp);
}

/// Two apps fed the same keys stay in lockstep even when only one of them
/// is resized every frame.
#[test]
fn resize_does_not_touch_movement_state() {
    let mut plain = DemoApp::headless(DemoConfig::default());
    let mut resized = DemoApp::headless(DemoConfig::default());

    let script = [
        (0, KeyCode::W, true),
        (10, KeyCode::A, true),
        (20, KeyCode::SHIFT, true),
        (30, KeyCode::A, false),
        (40, KeyCode::W, false),
    ];
    for frame in 0..80u32 {
        for &(at, code, down) in &script {
            if at == frame {
                plain.push_key(code, down);
                resized.push_key(code, down);
            }
        }
        resized.push_resize(400 + frame, 300 + frame * 2);
        plain.frame(1.0 / 60.0);
        resized.frame(1.0 / 60.0);

        assert_eq!(plain.character, resized.character);
        assert_eq!(
            plain.controller.movement.velocity(),
            resized.controller.movement.velocity()
        );
    }
    assert_ne!(plain.viewport(), resized.viewport());
}

#[test]
fn bad_timestamps_are_dropped_frames() {
    let mut app = DemoApp::headless(DemoConfig::default());
    app.push_key(KeyCode::W, true);
    app.frame_at(1000.0);
    app.frame_at(1100.0);
    let t = app.character;

    // Clock went backwards.
    let report = app.frame_at(1050.0);
    assert_eq!(report.movement, StepOutcome::SkippedFrame);
    assert_eq!(app.character, t);
    assert!((app.sim_time() - 0.1).abs() < 1e-5);
    assert_eq!(app.frame_count(), 3);
}

#[test]
fn replay_script_in_simulated_time() -> anyhow::Result<()> {
    let script = KeyScript::from_json_str(
        r#"{ "events": [
            { "at": 0.0, "code": 87, "down": true },
            { "at": 0.5, "code": 50, "down": true },
            { "at": 0.6, "code": 50, "down": false },
            { "at": 1.0, "code": 87, "down": false }
        ] }"#,
    )?;
    let mut app = DemoApp::headless(DemoConfig::default());
    let reports = app.replay(&script, 180);

    assert_eq!(reports.len(), 180);
    assert!(app.character.position.z > 1.0);
    assert!(!app.input.keys().forward);
    assert_eq!(
        app.drain_anim_events(),
        vec![
            AnimEvent::Started { clip: 1 },
            AnimEvent::Finished { clip: 1 }
        ]
    );
    Ok(())
}

#[tokio::test]
async fn paced_run_advances_frames() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();

    let cfg = DemoConfig {
        frame_hz: 120,
        ..Default::default()
    };
    let mut app = DemoApp::headless(cfg);
    app.push_key(KeyCode::W, true);
    app.run_for_frames(12).await;

    assert_eq!(app.frame_count(), 12);
    assert!(app.character.position.z > 0.0);
    assert!((app.sim_time() - 0.1).abs() < 1e-4);
}
