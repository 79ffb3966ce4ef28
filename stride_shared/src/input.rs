//! Input latch.
//!
//! Window code reports raw key-down/key-up codes; this module folds them into
//! a small set of boolean flags that the frame update reads once per frame.
//! The latch is a plain value owned by whoever drives the frame loop, so
//! there is no shared mutable state between the event side and the update.

use serde::{Deserialize, Serialize};

/// Raw key code as reported by the host window (DOM `keyCode` numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const W: Self = Self(87);
    pub const A: Self = Self(65);
    pub const S: Self = Self(83);
    pub const D: Self = Self(68);
    pub const SPACE: Self = Self(32);
    pub const SHIFT: Self = Self(16);
    pub const DIGIT_1: Self = Self(49);
    pub const DIGIT_2: Self = Self(50);
    pub const DIGIT_3: Self = Self(51);
    pub const DIGIT_4: Self = Self(52);
    /// Known to the host but bound to nothing.
    pub const DIGIT_5: Self = Self(53);

    /// Looks up a key by its short name (`w`, `shift`, `1`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let code = match name.to_ascii_lowercase().as_str() {
            "w" => Self::W,
            "a" => Self::A,
            "s" => Self::S,
            "d" => Self::D,
            "space" => Self::SPACE,
            "shift" => Self::SHIFT,
            "1" => Self::DIGIT_1,
            "2" => Self::DIGIT_2,
            "3" => Self::DIGIT_3,
            "4" => Self::DIGIT_4,
            "5" => Self::DIGIT_5,
            _ => return None,
        };
        Some(code)
    }
}

/// What a mapped key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Forward,
    Backward,
    Left,
    Right,
    /// Reserved for a jump mechanic; changes no flag.
    Jump,
    Sprint,
    /// Selects the one-shot animation in slot 0..=3.
    Anim(u8),
}

impl KeyAction {
    /// Fixed code-to-action table. Unknown codes map to `None`.
    pub fn from_code(code: KeyCode) -> Option<Self> {
        let action = match code {
            KeyCode::W => Self::Forward,
            KeyCode::A => Self::Left,
            KeyCode::S => Self::Backward,
            KeyCode::D => Self::Right,
            KeyCode::SPACE => Self::Jump,
            KeyCode::SHIFT => Self::Sprint,
            KeyCode::DIGIT_1 => Self::Anim(0),
            KeyCode::DIGIT_2 => Self::Anim(1),
            KeyCode::DIGIT_3 => Self::Anim(2),
            KeyCode::DIGIT_4 => Self::Anim(3),
            _ => return None,
        };
        Some(action)
    }
}

bitflags::bitflags! {
    /// Animation-select keys currently held.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AnimKeys: u8 {
        const ONE = 1 << 0;
        const TWO = 1 << 1;
        const THREE = 1 << 2;
        const FOUR = 1 << 3;
    }
}

impl AnimKeys {
    /// Flag for a slot index, `None` outside `0..=3`.
    pub fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            0 => Some(Self::ONE),
            1 => Some(Self::TWO),
            2 => Some(Self::THREE),
            3 => Some(Self::FOUR),
            _ => None,
        }
    }

    /// First held slot in priority order 0, 1, 2, 3.
    pub fn selected_slot(self) -> Option<u8> {
        (0..4u8).find(|&slot| Self::from_slot(slot).is_some_and(|f| self.contains(f)))
    }
}

/// Movement keys currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Shift; doubles acceleration by default.
    pub sprint: bool,
}

/// Latched keyboard state for one controlling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    keys: MoveKeys,
    anim: AnimKeys,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one key event. Returns `true` when the code is mapped.
    ///
    /// Exactly one flag changes for a mapped code; space is mapped but is a
    /// reserved hook and leaves every flag as it was.
    pub fn handle_key_event(&mut self, code: KeyCode, is_down: bool) -> bool {
        let Some(action) = KeyAction::from_code(code) else {
            return false;
        };
        match action {
            KeyAction::Forward => self.keys.forward = is_down,
            KeyAction::Backward => self.keys.backward = is_down,
            KeyAction::Left => self.keys.left = is_down,
            KeyAction::Right => self.keys.right = is_down,
            KeyAction::Sprint => self.keys.sprint = is_down,
            KeyAction::Jump => {}
            KeyAction::Anim(slot) => {
                if let Some(flag) = AnimKeys::from_slot(slot) {
                    self.anim.set(flag, is_down);
                }
            }
        }
        true
    }

    /// Releases every key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn keys(&self) -> MoveKeys {
        self.keys
    }

    pub fn anim_keys(&self) -> AnimKeys {
        self.anim
    }

    /// Builder used by tests and scripted drivers.
    pub fn with_keys(mut self, keys: MoveKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_anim(mut self, anim: AnimKeys) -> Self {
        self.anim = anim;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_shift_toggle_their_flag() {
        let mut input = InputState::new();
        assert!(input.handle_key_event(KeyCode::W, true));
        assert!(input.handle_key_event(KeyCode::SHIFT, true));
        assert!(input.keys().forward);
        assert!(input.keys().sprint);

        input.handle_key_event(KeyCode::W, false);
        assert!(!input.keys().forward);
        assert!(input.keys().sprint);
    }

    #[test]
    fn a_turns_left_and_d_turns_right() {
        let mut input = InputState::new();
        input.handle_key_event(KeyCode::A, true);
        assert!(input.keys().left && !input.keys().right);
        input.handle_key_event(KeyCode::D, true);
        assert!(input.keys().right);
    }

    #[test]
    fn unmapped_codes_are_ignored() {
        let mut input = InputState::new();
        assert!(!input.handle_key_event(KeyCode(90), true));
        assert!(!input.handle_key_event(KeyCode::DIGIT_5, true));
        assert_eq!(input, InputState::default());
    }

    #[test]
    fn space_is_mapped_but_changes_nothing() {
        let mut input = InputState::new();
        assert!(input.handle_key_event(KeyCode::SPACE, true));
        assert_eq!(input, InputState::default());
    }

    #[test]
    fn digit_keys_latch_anim_flags() {
        let mut input = InputState::new();
        input.handle_key_event(KeyCode::DIGIT_3, true);
        input.handle_key_event(KeyCode::DIGIT_1, true);
        assert_eq!(input.anim_keys(), AnimKeys::ONE | AnimKeys::THREE);
        assert_eq!(input.anim_keys().selected_slot(), Some(0));

        input.handle_key_event(KeyCode::DIGIT_1, false);
        assert_eq!(input.anim_keys().selected_slot(), Some(2));
    }

    #[test]
    fn clear_releases_everything() {
        let mut input = InputState::new();
        input.handle_key_event(KeyCode::W, true);
        input.handle_key_event(KeyCode::DIGIT_4, true);
        input.clear();
        assert_eq!(input, InputState::default());
        assert_eq!(input.anim_keys().selected_slot(), None);
    }

    #[test]
    fn key_names_resolve() {
        assert_eq!(KeyCode::from_name("W"), Some(KeyCode::W));
        assert_eq!(KeyCode::from_name("shift"), Some(KeyCode::SHIFT));
        assert_eq!(KeyCode::from_name("2"), Some(KeyCode::DIGIT_2));
        assert_eq!(KeyCode::from_name("f1"), None);
    }
}
