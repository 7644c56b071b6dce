// src/engine_lib/scene_types.rs
use std::sync::Arc;

use glam::{Mat4, Vec4};

use crate::engine_lib::camera::Camera;
use crate::engine_lib::terrain::Heightfield;
use crate::rendering_lib::backend::{MaterialHandle, MeshHandle};
use crate::rendering_lib::frame_plan::ViewProjection;

/// One mesh with its own model transform and flat colour.
#[derive(Clone, Debug)]
pub struct DrawableModel {
    pub name: String,
    pub mesh: MeshHandle,
    pub index_count: u32,
    pub material: Option<MaterialHandle>,
    pub has_normal_map: bool,
    pub model: Mat4,
    pub color: Vec4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawableKind {
    Terrain,
    Skybox,
    SnowMan,
    CrateBox,
}

/// Parts drawn together under one placement. Immutable once built.
#[derive(Clone, Debug)]
pub struct CompositeDrawable {
    pub kind: DrawableKind,
    pub parts: Vec<DrawableModel>,
    /// Only terrain carries height data.
    pub heightfield: Option<Heightfield>,
}

impl CompositeDrawable {
    pub fn new(kind: DrawableKind) -> Self {
        Self {
            kind,
            parts: Vec::new(),
            heightfield: None,
        }
    }

    /// Height under terrain-space `(x, z)`; 0 for composites without a heightfield.
    pub fn get_height(&self, x: f32, z: f32) -> f32 {
        self.heightfield
            .as_ref()
            .map_or(0.0, |field| field.get_height(x, z))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub drawable: Arc<CompositeDrawable>,
    pub world: Mat4,
    pub anim: Mat4,
    /// Receives the platform rotation as its animation transform each step.
    pub rides_platform: bool,
}

impl SceneObject {
    pub fn new(drawable: Arc<CompositeDrawable>, world: Mat4, anim: Mat4) -> Self {
        Self {
            drawable,
            world,
            anim,
            rides_platform: false,
        }
    }

    pub fn riding_platform(mut self) -> Self {
        self.rides_platform = true;
        self
    }

    /// Full transform of one of this object's parts.
    pub fn part_transform(&self, part: &DrawableModel) -> Mat4 {
        self.anim * self.world * part.model
    }
}

/// Scene objects in insertion order, addressed by [`ObjectId`].
#[derive(Clone, Debug, Default)]
pub struct SceneObjects {
    objects: Vec<SceneObject>,
}

impl SceneObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: SceneObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

/// Directional light expressed as a second camera with an orthographic volume.
#[derive(Clone, Debug)]
pub struct LightState {
    pub camera: Camera,
    pub view: Mat4,
    pub projection: Mat4,
}

impl LightState {
    pub fn new(mut camera: Camera, extent: f32) -> Self {
        camera.update_view_matrix();
        let half = extent * 0.5;
        let projection =
            Mat4::orthographic_lh(-half, half, -half, half, camera.near_z(), camera.far_z());
        Self {
            view: camera.view(),
            projection,
            camera,
        }
    }

    pub fn view_projection(&self) -> ViewProjection {
        ViewProjection {
            view: self.view,
            projection: self.projection,
        }
    }
}
