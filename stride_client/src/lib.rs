//! `stride_client`
//!
//! Client-side driver:
//! - Frame loop owning input, controller, mixer and renderers
//! - Key events from stdin lines or timed JSON scripts
//! - Paced and simulated-time runs

pub mod app;
pub mod input;

pub use app::DemoApp;
