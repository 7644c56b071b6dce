// src/rendering_lib/mod.rs

pub mod backend;
pub mod frame_plan;
pub mod renderer;
pub mod shader;
pub mod vertex;

pub use backend::{GpuBackend, MaterialHandle, MeshHandle, RecordingBackend, TextureHandle};
pub use frame_plan::{DrawCall, FramePlan, Pass, PassTarget, PipelineKind};
pub use renderer::Renderer;
pub use shader::ShaderLibrary;
pub use vertex::MeshVertex;
