//! Per-frame character update.
//!
//! Order within a frame: velocity, rotation, position, then animation.

use tracing::{trace, warn};

use crate::{
    animation::{AnimError, AnimEvent, AnimState, AnimationConfig, AnimationMixer, AnimationSelector},
    input::InputState,
    movement::{Movement, MovementParams, StepOutcome},
    transform::Transform,
};

/// Result of one [`CharacterController::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub movement: StepOutcome,
    pub anim_events: Vec<AnimEvent>,
    /// Set when an action key named a clip the mixer does not have.
    pub anim_error: Option<AnimError>,
}

/// Keyboard-driven character controller.
#[derive(Debug, Clone)]
pub struct CharacterController {
    pub movement: Movement,
    pub animator: AnimationSelector,
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::new(MovementParams::default(), AnimationConfig::default())
    }
}

impl CharacterController {
    pub fn new(params: MovementParams, anim: AnimationConfig) -> Self {
        Self {
            movement: Movement::new(params),
            animator: AnimationSelector::new(anim),
        }
    }

    pub fn anim_state(&self) -> AnimState {
        self.animator.state()
    }

    /// Advances one frame.
    ///
    /// Missing `target` or `mixer` skip their part of the update. A frame with
    /// a negative or non-finite `dt` is dropped entirely, including the
    /// animation deadline.
    pub fn update(
        &mut self,
        input: &InputState,
        target: Option<&mut Transform>,
        mixer: Option<&mut dyn AnimationMixer>,
        dt: f32,
    ) -> FrameReport {
        let movement = self.movement.step(input.keys(), target, dt);
        let mut report = FrameReport {
            movement,
            anim_events: Vec::new(),
            anim_error: None,
        };
        if movement == StepOutcome::SkippedFrame {
            return report;
        }

        if let Some(mixer) = mixer {
            let anim = self.animator.update(mixer, input.anim_keys(), dt);
            if let Some(e) = anim.error {
                warn!(error = %e, "Animation switch aborted");
            }
            report.anim_events = anim.events;
            report.anim_error = anim.error;
        }

        trace!(
            velocity_z = self.movement.velocity().z,
            state = ?self.animator.state(),
            "Controller frame"
        );
        report
    }
}
