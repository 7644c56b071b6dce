// src/rendering_lib/backend.rs
//! The narrow slice of the GPU device the scene needs while building drawables.

use crate::error::Result;
use crate::media::LoadedImage;
use crate::rendering_lib::vertex::MeshVertex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// A diffuse texture plus optional normal map, bound together when drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

pub trait GpuBackend {
    fn upload_mesh(&mut self, label: &str, vertices: &[MeshVertex], indices: &[u32]) -> Result<MeshHandle>;
    /// `srgb` marks colour data; normal maps are uploaded linear.
    fn upload_texture(&mut self, label: &str, image: &LoadedImage, srgb: bool) -> Result<TextureHandle>;
    fn create_material(
        &mut self,
        texture: Option<TextureHandle>,
        normal_map: Option<TextureHandle>,
    ) -> Result<MaterialHandle>;
    /// Drops every mesh, texture and material. Handles issued before are invalid afterwards.
    fn release_all(&mut self);
}

/// Backend that stores uploads in memory. Used by tests and headless tooling.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub meshes: Vec<RecordedMesh>,
    pub textures: Vec<String>,
    pub materials: Vec<(Option<TextureHandle>, Option<TextureHandle>)>,
    pub releases: usize,
    /// Fail the upload of any mesh whose label equals this.
    pub fail_mesh_label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordedMesh {
    pub label: String,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&RecordedMesh> {
        self.meshes.get(handle.0 as usize)
    }
}

impl GpuBackend for RecordingBackend {
    fn upload_mesh(&mut self, label: &str, vertices: &[MeshVertex], indices: &[u32]) -> Result<MeshHandle> {
        if self.fail_mesh_label.as_deref() == Some(label) {
            return Err(crate::error::SceneError::InvalidState("mesh upload rejected"));
        }
        self.meshes.push(RecordedMesh {
            label: label.to_string(),
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        });
        Ok(MeshHandle(self.meshes.len() as u32 - 1))
    }

    fn upload_texture(&mut self, label: &str, _image: &LoadedImage, _srgb: bool) -> Result<TextureHandle> {
        self.textures.push(label.to_string());
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn create_material(
        &mut self,
        texture: Option<TextureHandle>,
        normal_map: Option<TextureHandle>,
    ) -> Result<MaterialHandle> {
        self.materials.push((texture, normal_map));
        Ok(MaterialHandle(self.materials.len() as u32 - 1))
    }

    fn release_all(&mut self) {
        self.meshes.clear();
        self.textures.clear();
        self.materials.clear();
        self.releases += 1;
    }
}
