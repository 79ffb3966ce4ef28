//! Input handling.
//!
//! The headless client has no window, so key transitions arrive as text
//! lines (`down w`, `up 87`) from stdin or as a timed JSON script. Both end up
//! as [`KeyEvent`]s queued on the app.

use serde::{Deserialize, Serialize};
use stride_shared::{event::KeyEvent, input::KeyCode};

/// Parses `down <key>` / `up <key>`, where `<key>` is a name or a numeric
/// code. Returns `None` for anything else.
pub fn parse_key_line(line: &str) -> Option<KeyEvent> {
    let mut tokens = line.split_whitespace();
    let down = match tokens.next()? {
        "down" | "press" => true,
        "up" | "release" => false,
        _ => return None,
    };
    let key = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    let code = KeyCode::from_name(key).or_else(|| key.parse().ok().map(KeyCode))?;
    Some(KeyEvent { code, down })
}

/// One timed key transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedKey {
    /// Seconds since the start of the run.
    pub at: f32,
    pub code: u32,
    pub down: bool,
}

/// Timed key transitions replayed against simulated time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyScript {
    pub events: Vec<ScriptedKey>,
}

impl KeyScript {
    /// Parses a script from JSON. Events are ordered by time.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        let mut script: Self = serde_json::from_str(s)?;
        script.events.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(script)
    }

    /// Events with `t0 <= at < t1`, in order.
    pub fn due(&self, t0: f32, t1: f32) -> impl Iterator<Item = KeyEvent> + '_ {
        self.events
            .iter()
            .filter(move |e| e.at >= t0 && e.at < t1)
            .map(|e| KeyEvent {
                code: KeyCode(e.code),
                down: e.down,
            })
    }

    /// Time of the last event, or 0.
    pub fn duration(&self) -> f32 {
        self.events.last().map_or(0.0, |e| e.at)
    }
}
