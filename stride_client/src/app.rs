//! Frame loop driver.
//!
//! `DemoApp` owns everything one running demo needs:
//! - The latched keyboard state and the queue window events land in
//! - The character controller, its transform and the animation mixer
//! - Camera, scene renderer and background layer
//!
//! Each frame drains queued resize and key events, runs the controller once,
//! advances the mixer and renders background then scene.

use std::time::Duration;

use stride_shared::{
    animation::{AnimEvent, AnimationMixer, ClipMixer},
    config::DemoConfig,
    controller::{CharacterController, FrameReport},
    event::{EventBus, KeyEvent, ResizeEvent},
    input::{InputState, KeyCode},
    math::yaw_of,
    movement::StepOutcome,
    render::{BackgroundLayer, Camera, NullRenderer, RenderBackend, SolidBackground, Viewport},
    transform::Transform,
};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::input::{parse_key_line, KeyScript};

/// Turns host timestamps in milliseconds into frame deltas in seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    prev_ms: Option<f64>,
}

impl FrameClock {
    const MILLIS_TO_SECONDS: f64 = 0.001;

    /// Delta since the previous timestamp; the first call yields 0.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let prev = self.prev_ms.replace(now_ms).unwrap_or(now_ms);
        ((now_ms - prev) * Self::MILLIS_TO_SECONDS) as f32
    }
}

/// A running character demo.
pub struct DemoApp {
    pub cfg: DemoConfig,
    pub input: InputState,
    pub controller: CharacterController,
    pub character: Transform,
    /// `None` when the model's clips could not start the idle loop.
    pub mixer: Option<ClipMixer>,
    pub camera: Camera,
    viewport: Viewport,
    renderer: Box<dyn RenderBackend>,
    background: Box<dyn BackgroundLayer>,
    events: EventBus,
    clock: FrameClock,
    frame: u64,
    sim_time: f32,
}

impl DemoApp {
    pub fn new(
        cfg: DemoConfig,
        renderer: Box<dyn RenderBackend>,
        background: Box<dyn BackgroundLayer>,
    ) -> Self {
        let mut controller = CharacterController::new(cfg.movement, cfg.animation);
        let mut mixer = ClipMixer::new(cfg.clips.clone());
        let mixer = match controller.animator.start(&mut mixer) {
            Ok(()) => Some(mixer),
            Err(e) => {
                warn!(error = %e, clips = cfg.clips.len(), "Running without animations");
                None
            }
        };

        let viewport = cfg.viewport;
        info!(
            width = viewport.width,
            height = viewport.height,
            frame_hz = cfg.frame_hz,
            "Demo initialized"
        );

        Self {
            camera: Camera::new(viewport),
            viewport,
            cfg,
            input: InputState::new(),
            controller,
            character: Transform::IDENTITY,
            mixer,
            renderer,
            background,
            events: EventBus::default(),
            clock: FrameClock::default(),
            frame: 0,
            sim_time: 0.0,
        }
    }

    /// App with a no-op renderer and a solid background.
    pub fn headless(cfg: DemoConfig) -> Self {
        let background = SolidBackground::new(cfg.viewport);
        Self::new(cfg, Box::new(NullRenderer), Box::new(background))
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds over all integrated frames.
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Queues a key transition for the next frame.
    pub fn push_key(&mut self, code: KeyCode, down: bool) {
        self.events.push(KeyEvent { code, down });
    }

    /// Queues a window resize for the next frame.
    pub fn push_resize(&mut self, width: u32, height: u32) {
        self.events.push(ResizeEvent { width, height });
    }

    /// Animation transitions since the last call.
    pub fn drain_anim_events(&mut self) -> Vec<AnimEvent> {
        self.events.drain::<AnimEvent>()
    }

    /// Runs one frame from a host timestamp in milliseconds.
    pub fn frame_at(&mut self, now_ms: f64) -> FrameReport {
        let dt = self.clock.tick(now_ms);
        self.frame(dt)
    }

    /// Runs one frame of `dt` seconds.
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        self.apply_resizes();
        self.apply_keys();

        let mixer = self.mixer.as_mut().map(|m| m as &mut dyn AnimationMixer);
        let report = self
            .controller
            .update(&self.input, Some(&mut self.character), mixer, dt);

        if report.movement != StepOutcome::SkippedFrame {
            if let Some(mixer) = self.mixer.as_mut() {
                mixer.advance(dt);
                for op in mixer.take_ops() {
                    trace!(?op, "Mixer");
                }
            }
            self.sim_time += dt;
        }
        for ev in &report.anim_events {
            self.events.push(*ev);
        }

        self.render();
        self.frame += 1;
        report
    }

    fn apply_resizes(&mut self) {
        for ResizeEvent { width, height } in self.events.drain::<ResizeEvent>() {
            let viewport = Viewport::new(width, height);
            self.viewport = viewport;
            self.camera.resize(viewport);
            self.renderer.resize(viewport);
            self.background.resize(viewport);
            debug!(width, height, "Viewport resized");
        }
    }

    fn apply_keys(&mut self) {
        for KeyEvent { code, down } in self.events.drain::<KeyEvent>() {
            if !self.input.handle_key_event(code, down) {
                trace!(code = code.0, down, "Unmapped key");
            }
        }
    }

    fn render(&mut self) {
        self.background.render();
        self.renderer.begin_frame();
        self.renderer.set_view_proj(self.camera.view_proj());
        self.renderer.draw_character(&self.character);
        self.renderer.end_frame();
    }

    /// Runs `frames` fixed steps against a key script in simulated time.
    pub fn replay(&mut self, script: &KeyScript, frames: u32) -> Vec<FrameReport> {
        let dt = self.cfg.frame_dt();
        let mut reports = Vec::with_capacity(frames as usize);
        for _ in 0..frames {
            let t0 = self.sim_time;
            let due: Vec<KeyEvent> = script.due(t0, t0 + dt).collect();
            for ev in due {
                self.push_key(ev.code, ev.down);
            }
            reports.push(self.frame(dt));
        }
        reports
    }

    /// Runs `frames` fixed steps paced at `frame_hz`.
    pub async fn run_for_frames(&mut self, frames: u32) {
        let dt = self.cfg.frame_dt();
        let step = Duration::from_secs_f32(dt);
        let mut next = Instant::now();

        for _ in 0..frames {
            next += step;
            self.frame(dt);
            tokio::time::sleep_until(next).await;
        }
    }

    /// Human-readable state summary.
    pub fn status(&self) -> Vec<String> {
        let p = self.character.position;
        let mut out = vec![
            format!("Frame: {}", self.frame),
            format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z),
            format!("Yaw: {:.1} deg", yaw_of(self.character.rotation).to_degrees()),
            format!("Speed: {:.2}", self.controller.movement.speed()),
            format!("Animation: {:?}", self.controller.anim_state()),
            format!("Viewport: {}x{}", self.viewport.width, self.viewport.height),
        ];
        if self.mixer.is_none() {
            out.push("Mixer: none".to_string());
        }
        out
    }

    /// Executes a console command line.
    pub fn exec_command(&mut self, line: &str) -> Vec<String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        match tokens[0] {
            "status" => self.status(),
            "down" | "up" | "press" | "release" => match parse_key_line(line) {
                Some(ev) => {
                    self.push_key(ev.code, ev.down);
                    Vec::new()
                }
                None => vec![format!("Usage: {} <key|code>", tokens[0])],
            },
            "resize" => {
                let size: Option<(u32, u32)> = tokens
                    .get(1)
                    .zip(tokens.get(2))
                    .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
                match size {
                    Some((w, h)) => {
                        self.push_resize(w, h);
                        vec![format!("Resizing to {w}x{h}")]
                    }
                    None => vec!["Usage: resize <width> <height>".to_string()],
                }
            }
            "clear" => {
                self.input.clear();
                vec!["Keys released".to_string()]
            }
            "reset" => {
                self.controller.movement.reset();
                self.character = Transform::IDENTITY;
                vec!["Character reset".to_string()]
            }
            other => vec![format!("Unknown command: {other}")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_first_frame_is_zero() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(1000.0), 0.0);
        assert!((clock.tick(1016.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn key_then_frame_moves_character() {
        let mut app = DemoApp::headless(DemoConfig::default());
        app.push_key(KeyCode::W, true);
        app.frame(1.0 / 60.0);
        assert!(app.character.position.z > 0.0);
        assert_eq!(app.frame_count(), 1);
    }

    #[test]
    fn commands_drive_the_app() {
        let mut app = DemoApp::headless(DemoConfig::default());
        assert!(app.exec_command("down w").is_empty());
        app.frame(0.1);
        assert!(app.input.keys().forward);

        assert_eq!(app.exec_command("resize 640 480"), vec!["Resizing to 640x480"]);
        app.frame(0.0);
        assert_eq!(app.viewport(), Viewport::new(640, 480));

        app.exec_command("reset");
        assert_eq!(app.character, Transform::IDENTITY);
        assert_eq!(app.controller.movement.speed(), 0.0);

        assert_eq!(app.exec_command("jump"), vec!["Unknown command: jump"]);
        assert!(app.exec_command("status")[0].starts_with("Frame: 2"));
    }

    #[test]
    fn no_clips_runs_without_mixer() {
        let cfg = DemoConfig {
            clips: Vec::new(),
            ..Default::default()
        };
        let mut app = DemoApp::headless(cfg);
        assert!(app.mixer.is_none());
        app.push_key(KeyCode::DIGIT_1, true);
        let report = app.frame(0.016);
        assert!(report.anim_events.is_empty());
    }
}
