//! `stride_shared`
//!
//! Core of the keyboard-driven character demo.
//!
//! Design goals:
//! - One frame update is a pure function of input, state and `dt`.
//! - Rendering engine and background compositor stay behind traits.
//! - No global state; the frame driver owns everything.
//! - No `unsafe`.

pub mod animation;
pub mod config;
pub mod controller;
pub mod event;
pub mod input;
pub mod math;
pub mod movement;
pub mod render;
pub mod transform;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::animation::*;
    pub use crate::config::*;
    pub use crate::controller::*;
    pub use crate::event::*;
    pub use crate::input::*;
    pub use crate::math::*;
    pub use crate::movement::*;
    pub use crate::transform::*;
}
