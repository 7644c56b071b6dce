// src/demo_scene.rs

use std::f32::consts::{FRAC_PI_4, PI};
use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::config::SceneConfig;
use crate::engine_lib::camera::Camera;
use crate::engine_lib::drawables::{build, BuildContext};
use crate::engine_lib::scene_logic::Platform;
use crate::engine_lib::scene_types::{
    CompositeDrawable, DrawableKind, LightState, ObjectId, SceneObject, SceneObjects,
};
use crate::error::Result;

/// Linear-space background the primary target is cleared to each frame.
pub const BACKGROUND: [f64; 4] = [0.052860655, 0.052860655, 0.052860655, 1.0];

/// Fixed placement data for the snow scene.
#[derive(Debug, Clone)]
pub struct SceneLayout {
    pub terrain_offset: Vec3,
    pub platform_center: Vec3,
    pub platform_scale: Vec3,
    pub platform_speed: f32,
    pub probe_half_extents: Vec3,
    pub light_position: Vec3,
    pub light_pitch: f32,
    pub light_yaw: f32,
    pub shadow_extent: f32,
}

impl SceneLayout {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            shadow_extent: config.shadow.extent,
            ..Self::default()
        }
    }

    pub fn platform(&self) -> Platform {
        Platform::new(self.platform_center, self.platform_scale, self.platform_speed)
    }

    /// Light camera sharing the main camera's lens.
    pub fn light(&self, lens: &Camera) -> LightState {
        let mut camera = lens.clone();
        camera.set_position(self.light_position);
        camera.turn(self.light_pitch, self.light_yaw);
        LightState::new(camera, self.shadow_extent)
    }
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            terrain_offset: Vec3::new(-96.0, 0.0, -96.0),
            platform_center: Vec3::new(8.0, 1.725, 0.0),
            platform_scale: Vec3::splat(2.0),
            platform_speed: PI * 0.25,
            probe_half_extents: Vec3::ONE,
            light_position: Vec3::new(-20.0, 20.0, -20.0),
            light_pitch: -FRAC_PI_4,
            light_yaw: FRAC_PI_4,
            shadow_extent: 30.0,
        }
    }
}

/// GPU-resident scene content produced by one device setup.
#[derive(Debug)]
pub struct SceneContent {
    pub skybox: Arc<CompositeDrawable>,
    pub terrain: ObjectId,
    pub objects: SceneObjects,
}

pub fn build_scene(ctx: &mut BuildContext<'_>, layout: &SceneLayout) -> Result<SceneContent> {
    let skybox = Arc::new(build(DrawableKind::Skybox, ctx)?);
    let terrain = Arc::new(build(DrawableKind::Terrain, ctx)?);
    let snowman = Arc::new(build(DrawableKind::SnowMan, ctx)?);
    let crate_box = Arc::new(build(DrawableKind::CrateBox, ctx)?);

    let snowman_ground = terrain.get_height(layout.terrain_offset.x, layout.terrain_offset.z);
    let center = layout.platform_center;
    let scale = layout.platform_scale;

    let mut objects = SceneObjects::new();
    let terrain_id = objects.insert(SceneObject::new(
        terrain,
        Mat4::from_translation(layout.terrain_offset),
        Mat4::IDENTITY,
    ));
    objects.insert(SceneObject::new(
        snowman.clone(),
        Mat4::from_translation(Vec3::new(0.0, snowman_ground, 0.0)),
        Mat4::from_scale(Vec3::splat(1.5)),
    ));
    objects.insert(
        SceneObject::new(
            crate_box,
            Mat4::from_translation(center) * Mat4::from_scale(scale),
            Mat4::IDENTITY,
        )
        .riding_platform(),
    );
    objects.insert(
        SceneObject::new(
            snowman,
            Mat4::from_translation(Vec3::new(center.x, center.y + scale.y * 0.5, center.z)),
            Mat4::IDENTITY,
        )
        .riding_platform(),
    );

    log::info!("Scene assembled with {} objects", objects.len());
    Ok(SceneContent {
        skybox,
        terrain: terrain_id,
        objects,
    })
}
