// src/error.rs

use std::path::PathBuf;

/// Errors raised while building or restoring the scene.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode image {name}: {source}")]
    Image {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("media file not found in any search directory: {0}")]
    MediaNotFound(String),

    #[error("heightmap {name} holds {found} samples, expected {expected}")]
    Heightmap {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to open window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("no compatible GPU adapter found")]
    AdapterUnavailable,

    #[error("failed to open GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to create window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("GPU validation failed: {0}")]
    Gpu(String),

    #[error("no shader named {0}")]
    ShaderNotFound(String),

    #[error("invalid lifecycle transition: {0}")]
    InvalidState(&'static str),
}

pub type Result<T> = std::result::Result<T, SceneError>;
