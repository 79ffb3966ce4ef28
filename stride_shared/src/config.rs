//! Configuration system.
//!
//! Loads demo configuration from JSON strings/files. Every field has a
//! default, so a file only needs the values it changes.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    animation::{default_clips, AnimationConfig, ClipInfo},
    movement::MovementParams,
    render::Viewport,
};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Frames per second of the paced loop.
    #[serde(default = "default_frame_hz")]
    pub frame_hz: u32,
    /// Initial drawable size.
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub movement: MovementParams,
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Clips available on the character, by index.
    #[serde(default = "default_clips")]
    pub clips: Vec<ClipInfo>,
}

fn default_frame_hz() -> u32 {
    60
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frame_hz: default_frame_hz(),
            viewport: Viewport::default(),
            movement: MovementParams::default(),
            animation: AnimationConfig::default(),
            clips: default_clips(),
        }
    }
}

impl DemoConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// Seconds per frame at `frame_hz` (at least 1 Hz).
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.frame_hz.max(1) as f32
    }
}
