// src/rendering_lib/frame_plan.rs
//! One frame's passes and draw calls, in submission order, as plain data.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::rendering_lib::backend::{MaterialHandle, MeshHandle};

/// Matrices for one draw, laid out the way the WGSL `Matrices` struct reads them.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MatrixBlock {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub inv_trans_world: [[f32; 4]; 4],
    pub light_view: [[f32; 4]; 4],
    pub light_projection: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraBlock {
    pub cam_pos: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorBlock {
    pub color: [f32; 4],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawConstants {
    pub matrices: MatrixBlock,
    pub camera: CameraBlock,
    pub color: ColorBlock,
}

/// View and projection pair a pass renders with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewProjection {
    pub view: Mat4,
    pub projection: Mat4,
}

impl DrawConstants {
    /// `world` is the fully combined object transform.
    pub fn new(world: Mat4, eye: ViewProjection, light: ViewProjection, cam_pos: Vec3, color: Vec4) -> Self {
        Self {
            matrices: MatrixBlock {
                world: world.to_cols_array_2d(),
                view: eye.view.to_cols_array_2d(),
                projection: eye.projection.to_cols_array_2d(),
                inv_trans_world: world.inverse().transpose().to_cols_array_2d(),
                light_view: light.view.to_cols_array_2d(),
                light_projection: light.projection.to_cols_array_2d(),
            },
            camera: CameraBlock {
                cam_pos: cam_pos.extend(1.0).to_array(),
            },
            color: ColorBlock {
                color: color.to_array(),
            },
        }
    }

    pub fn world(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.matrices.world)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    Shadow,
    Skybox,
    Terrain,
    Standard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassTarget {
    ShadowMap,
    Primary,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub pipeline: PipelineKind,
    pub mesh: MeshHandle,
    pub index_count: u32,
    pub material: Option<MaterialHandle>,
    pub samples_shadow_map: bool,
    pub constants: DrawConstants,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pass {
    pub label: &'static str,
    pub target: PassTarget,
    /// `None` keeps the colour already in the target.
    pub clear_color: Option<[f64; 4]>,
    pub clear_depth: bool,
    pub draws: Vec<DrawCall>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    /// Applied to the primary target before any pass runs.
    pub clear_color: [f64; 4],
    pub passes: Vec<Pass>,
}

impl FramePlan {
    pub fn draw_count(&self) -> usize {
        self.passes.iter().map(|p| p.draws.len()).sum()
    }

    pub fn pass(&self, target: PassTarget) -> Option<&Pass> {
        self.passes.iter().find(|p| p.target == target)
    }
}
