// src/lib.rs
//! Snow scene renderer: a walk camera over a heightmapped terrain, a spinning
//! platform the camera can ride, and a shadow-mapped wgpu frame.

pub mod config;
pub mod demo_scene;
pub mod engine_lib;
pub mod error;
pub mod media;
pub mod rendering_lib;

pub use config::SceneConfig;
pub use error::{Result, SceneError};
