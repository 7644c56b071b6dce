// src/engine_lib/mod.rs
pub mod camera;
pub mod collision;
pub mod controller;
pub mod drawables;
pub mod orchestrator;
pub mod primitives;
pub mod scene_logic;
pub mod scene_types;
pub mod step_timer;
pub mod terrain;

pub use camera::Camera;
pub use controller::{CameraDelta, InputSource, InputState, LookAngles};
pub use orchestrator::{LifecycleState, Orchestrator};
pub use scene_types::{CompositeDrawable, DrawableKind, DrawableModel, ObjectId, SceneObject, SceneObjects};
