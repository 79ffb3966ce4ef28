//! Rendering abstraction.
//!
//! This crate intentionally does not depend on a graphics backend. The 3D
//! scene renderer and the 2D background compositor are traits; the frame
//! driver only hands them the camera matrix and the character transform.

use serde::{Deserialize, Serialize};

use crate::{
    math::{Mat4, Vec3},
    transform::Transform,
};

/// Drawable size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; a zero height reads as 1.
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Perspective camera looking at the character's spawn area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Camera {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            fov_y_deg: 60.0,
            aspect: viewport.aspect(),
            near: 1.0,
            far: 1000.0,
            position: Vec3::new(25.0, 10.0, 25.0),
            target: Vec3::new(0.0, 10.0, 0.0),
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        proj * view
    }
}

/// A minimal 3D rendering API.
pub trait RenderBackend: Send + Sync {
    fn begin_frame(&mut self);
    fn set_view_proj(&mut self, view_proj: Mat4);
    fn draw_character(&mut self, transform: &Transform);
    fn resize(&mut self, viewport: Viewport);
    fn end_frame(&mut self);
}

/// A no-op renderer useful for headless runs.
#[derive(Default)]
pub struct NullRenderer;

impl RenderBackend for NullRenderer {
    fn begin_frame(&mut self) {}
    fn set_view_proj(&mut self, _view_proj: Mat4) {}
    fn draw_character(&mut self, _transform: &Transform) {}
    fn resize(&mut self, _viewport: Viewport) {}
    fn end_frame(&mut self) {}
}

/// 2D layer drawn behind the scene.
pub trait BackgroundLayer: Send + Sync {
    fn resize(&mut self, viewport: Viewport);
    fn render(&mut self);
}

/// Full-screen rectangle in one colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolidBackground {
    /// `0xRRGGBB`.
    pub color: u32,
    pub viewport: Viewport,
    pub frames: u64,
}

impl SolidBackground {
    pub const DEFAULT_COLOR: u32 = 0x012345;

    pub fn new(viewport: Viewport) -> Self {
        Self {
            color: Self::DEFAULT_COLOR,
            viewport,
            frames: 0,
        }
    }
}

impl BackgroundLayer for SolidBackground {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn render(&mut self) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_handles_zero_extent() {
        assert_eq!(Viewport::new(800, 0).aspect(), 800.0);
        assert_eq!(Viewport::new(0, 600).aspect(), 1.0 / 600.0);
        assert_eq!(Viewport::new(0, 0).aspect(), 1.0);
        assert!((Viewport::new(1920, 1080).aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn camera_resize_updates_aspect_only() {
        let mut cam = Camera::new(Viewport::default());
        let before = cam;
        cam.resize(Viewport::new(600, 600));
        assert_eq!(cam.aspect, 1.0);
        assert_eq!(cam.position, before.position);
        assert_eq!(cam.fov_y_deg, before.fov_y_deg);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let cam = Camera::new(Viewport::default());
        let clip = cam.view_proj() * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    }
}
