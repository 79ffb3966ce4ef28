//! Animation selection.
//!
//! The character loops an idle clip until one of the four action keys is
//! pressed. The chosen clip then plays exactly once with a short fade-in and
//! the selector falls back to the idle loop when the clip's duration has
//! elapsed. Completion is tracked with an explicit elapsed-time accumulator
//! fed by the frame delta, so the state machine never reads a clock.
//!
//! Playback itself goes through the [`AnimationMixer`] trait. [`ClipMixer`]
//! is an in-memory implementation used by the headless client and tests.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::input::AnimKeys;

/// How many times an action repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    Once,
    Repeat,
}

/// A request to start a clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayRequest {
    pub clip: usize,
    pub loop_mode: LoopMode,
    /// Seconds to ramp weight from 0 to 1.
    pub fade_in: Option<f32>,
    /// Rewind to the first frame before playing.
    pub reset: bool,
}

/// Mixer abstraction provided by the rendering engine.
pub trait AnimationMixer {
    fn clip_count(&self) -> usize;

    /// Duration in seconds of a clip, `None` when the index has no clip.
    fn clip_duration(&self, index: usize) -> Option<f32>;

    fn play(&mut self, request: PlayRequest);

    fn stop(&mut self, index: usize);

    /// Advances playback time.
    fn advance(&mut self, dt: f32);
}

/// Clip metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub name: String,
    pub duration: f32,
}

impl ClipInfo {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Clips of the bundled character: four actions followed by the idle loop.
pub fn default_clips() -> Vec<ClipInfo> {
    vec![
        ClipInfo::new("slash", 1.2),
        ClipInfo::new("kick", 0.9),
        ClipInfo::new("spin", 1.5),
        ClipInfo::new("taunt", 2.0),
        ClipInfo::new("idle", 2.4),
    ]
}

/// A clip currently driven by a [`ClipMixer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveAction {
    pub clip: usize,
    pub loop_mode: LoopMode,
    /// Local clip time in seconds.
    pub time: f32,
    /// Blend weight in `[0, 1]`.
    pub weight: f32,
    fade_in: f32,
    pub finished: bool,
}

/// Mixer operations, in the order they were issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerOp {
    Play(usize),
    Stop(usize),
}

/// In-memory mixer holding at most one active action.
#[derive(Debug, Clone, Default)]
pub struct ClipMixer {
    clips: Vec<ClipInfo>,
    active: Option<ActiveAction>,
    ops: Vec<MixerOp>,
}

impl ClipMixer {
    pub fn new(clips: Vec<ClipInfo>) -> Self {
        Self {
            clips,
            active: None,
            ops: Vec::new(),
        }
    }

    pub fn clips(&self) -> &[ClipInfo] {
        &self.clips
    }

    pub fn active(&self) -> Option<&ActiveAction> {
        self.active.as_ref()
    }

    /// Drains the operation log.
    pub fn take_ops(&mut self) -> Vec<MixerOp> {
        std::mem::take(&mut self.ops)
    }
}

impl AnimationMixer for ClipMixer {
    fn clip_count(&self) -> usize {
        self.clips.len()
    }

    fn clip_duration(&self, index: usize) -> Option<f32> {
        self.clips.get(index).map(|c| c.duration)
    }

    fn play(&mut self, request: PlayRequest) {
        if request.clip >= self.clips.len() {
            return;
        }
        if let Some(prev) = self.active {
            if prev.clip == request.clip && !request.reset && !prev.finished {
                return;
            }
            if prev.clip != request.clip {
                debug!(from = prev.clip, to = request.clip, "Replacing active action");
            }
        }
        let fade_in = request.fade_in.filter(|f| *f > 0.0).unwrap_or(0.0);
        self.active = Some(ActiveAction {
            clip: request.clip,
            loop_mode: request.loop_mode,
            time: 0.0,
            weight: if fade_in > 0.0 { 0.0 } else { 1.0 },
            fade_in,
            finished: false,
        });
        self.ops.push(MixerOp::Play(request.clip));
    }

    fn stop(&mut self, index: usize) {
        if self.active.is_some_and(|a| a.clip == index) {
            self.active = None;
            self.ops.push(MixerOp::Stop(index));
        }
    }

    fn advance(&mut self, dt: f32) {
        if !crate::math::is_valid_dt(dt) {
            return;
        }
        let Some(action) = self.active.as_mut() else {
            return;
        };
        let duration = self
            .clips
            .get(action.clip)
            .map(|c| c.duration)
            .unwrap_or(0.0);

        action.time += dt;
        action.weight = if action.fade_in > 0.0 {
            (action.time / action.fade_in).min(1.0)
        } else {
            1.0
        };
        match action.loop_mode {
            LoopMode::Once if action.time >= duration => {
                action.time = duration;
                action.finished = true;
            }
            LoopMode::Repeat if duration > 0.0 => {
                action.time %= duration;
            }
            _ => {}
        }
    }
}

/// What the selector does when an action key is pressed mid-action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetriggerPolicy {
    /// Stop the running action and start the new one.
    #[default]
    Interrupt,
    /// Keep the running action; the press is dropped.
    Ignore,
}

/// Animation tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Clip looped while no action plays.
    #[serde(default = "default_idle_clip")]
    pub idle_clip: usize,
    /// Fade-in for action clips, in seconds.
    #[serde(default = "default_fade_in")]
    pub fade_in: f32,
    #[serde(default)]
    pub retrigger: RetriggerPolicy,
}

fn default_idle_clip() -> usize {
    4
}

fn default_fade_in() -> f32 {
    0.5
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            idle_clip: default_idle_clip(),
            fade_in: default_fade_in(),
            retrigger: RetriggerPolicy::default(),
        }
    }
}

/// Selector state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimState {
    /// Looping the idle clip.
    Idle { clip: usize },
    /// Playing a one-shot clip.
    Acting {
        clip: usize,
        elapsed: f32,
        duration: f32,
    },
}

impl AnimState {
    pub fn clip(&self) -> usize {
        match *self {
            AnimState::Idle { clip } | AnimState::Acting { clip, .. } => clip,
        }
    }
}

/// Emitted on state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimEvent {
    Started { clip: usize },
    Finished { clip: usize },
}

/// Everything one selector frame produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimUpdate {
    pub events: Vec<AnimEvent>,
    pub error: Option<AnimError>,
}

/// Animation selection errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimError {
    /// The mixer has no clip at this index.
    MissingClip(usize),
}

impl fmt::Display for AnimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimError::MissingClip(index) => write!(f, "no animation found for index {index}"),
        }
    }
}

impl std::error::Error for AnimError {}

/// Idle/Acting state machine over an [`AnimationMixer`].
#[derive(Debug, Clone)]
pub struct AnimationSelector {
    cfg: AnimationConfig,
    state: AnimState,
    prev_keys: AnimKeys,
}

impl AnimationSelector {
    pub fn new(cfg: AnimationConfig) -> Self {
        Self {
            cfg,
            state: AnimState::Idle {
                clip: cfg.idle_clip,
            },
            prev_keys: AnimKeys::empty(),
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.cfg
    }

    pub fn state(&self) -> AnimState {
        self.state
    }

    pub fn is_acting(&self) -> bool {
        matches!(self.state, AnimState::Acting { .. })
    }

    /// Starts the idle loop.
    pub fn start(&mut self, mixer: &mut dyn AnimationMixer) -> Result<(), AnimError> {
        let idle = self.cfg.idle_clip;
        if mixer.clip_duration(idle).is_none() {
            error!(clip = idle, clips = mixer.clip_count(), "No idle animation in model");
            return Err(AnimError::MissingClip(idle));
        }
        mixer.play(idle_request(idle));
        self.state = AnimState::Idle { clip: idle };
        Ok(())
    }

    /// Runs completion then trigger for one frame.
    ///
    /// A trigger error does not discard a completion that already happened
    /// in the same frame.
    pub fn update(&mut self, mixer: &mut dyn AnimationMixer, keys: AnimKeys, dt: f32) -> AnimUpdate {
        let mut out = AnimUpdate::default();
        out.events.extend(self.tick(mixer, dt));
        match self.trigger(mixer, keys) {
            Ok(started) => out.events.extend(started),
            Err(e) => out.error = Some(e),
        }
        out
    }

    /// Advances the one-shot deadline and returns to idle once it passes.
    pub fn tick(&mut self, mixer: &mut dyn AnimationMixer, dt: f32) -> Option<AnimEvent> {
        let AnimState::Acting {
            clip,
            elapsed,
            duration,
        } = self.state
        else {
            return None;
        };

        let elapsed = elapsed + dt;
        if elapsed < duration {
            self.state = AnimState::Acting {
                clip,
                elapsed,
                duration,
            };
            return None;
        }

        let idle = self.cfg.idle_clip;
        mixer.stop(clip);
        if mixer.clip_duration(idle).is_some() {
            mixer.play(idle_request(idle));
        } else {
            error!(clip = idle, "No idle animation to return to");
        }
        self.state = AnimState::Idle { clip: idle };
        debug!(clip, elapsed, "Action finished");
        Some(AnimEvent::Finished { clip })
    }

    /// Starts an action for a newly pressed key.
    ///
    /// A key going down since the previous call fires; holding a key does not
    /// restart its clip. Once fired, the lowest held slot wins, so holding "1"
    /// and pressing "3" plays clip 0. A missing clip leaves the state unchanged.
    pub fn trigger(
        &mut self,
        mixer: &mut dyn AnimationMixer,
        keys: AnimKeys,
    ) -> Result<Option<AnimEvent>, AnimError> {
        let pressed = keys.difference(self.prev_keys);
        self.prev_keys = keys;
        if pressed.is_empty() {
            return Ok(None);
        }

        let Some(slot) = keys.selected_slot() else {
            return Ok(None);
        };
        let clip = usize::from(slot);

        if self.is_acting() && self.cfg.retrigger == RetriggerPolicy::Ignore {
            debug!(clip, "Action already playing; press ignored");
            return Ok(None);
        }

        let Some(duration) = mixer.clip_duration(clip) else {
            error!(clip, "No animation found for index");
            return Err(AnimError::MissingClip(clip));
        };

        mixer.stop(self.state.clip());
        mixer.play(PlayRequest {
            clip,
            loop_mode: LoopMode::Once,
            fade_in: Some(self.cfg.fade_in),
            reset: true,
        });
        self.state = AnimState::Acting {
            clip,
            elapsed: 0.0,
            duration,
        };
        info!(clip, duration, "Action started");
        Ok(Some(AnimEvent::Started { clip }))
    }
}

fn idle_request(clip: usize) -> PlayRequest {
    PlayRequest {
        clip,
        loop_mode: LoopMode::Repeat,
        fade_in: None,
        reset: false,
    }
}
