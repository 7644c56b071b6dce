// src/engine_lib/orchestrator.rs
//! Owns the scene and turns each frame's input into a [`FramePlan`].

use std::sync::Arc;

use glam::Mat4;

use crate::config::SceneConfig;
use crate::demo_scene::{build_scene, SceneContent, SceneLayout, BACKGROUND};
use crate::engine_lib::camera::Camera;
use crate::engine_lib::controller::{InputSource, LookAngles};
use crate::engine_lib::drawables::BuildContext;
use crate::engine_lib::scene_logic::{apply_platform_rotation, update_mount, MountOutcome, MountState, Platform};
use crate::engine_lib::scene_types::{CompositeDrawable, LightState, ObjectId, SceneObject, SceneObjects};
use crate::engine_lib::step_timer::StepTimer;
use crate::error::{Result, SceneError};
use crate::media::AssetSource;
use crate::rendering_lib::backend::GpuBackend;
use crate::rendering_lib::frame_plan::{
    DrawCall, DrawConstants, FramePlan, Pass, PassTarget, PipelineKind, ViewProjection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    DeviceReady,
    Running,
    DeviceLost,
}

pub struct Orchestrator {
    state: LifecycleState,
    layout: SceneLayout,
    camera: Camera,
    look: LookAngles,
    timer: StepTimer,
    platform: Platform,
    mount: MountState,
    skybox: Option<Arc<CompositeDrawable>>,
    terrain: Option<ObjectId>,
    objects: SceneObjects,
    light: Option<LightState>,
    exit_requested: bool,
}

impl Orchestrator {
    pub fn new(config: &SceneConfig) -> Self {
        let cam = &config.camera;
        let mut camera = Camera::new(
            cam.fov_y_deg.to_radians(),
            config.window.aspect(),
            cam.near,
            cam.far,
        );
        camera.set_position(cam.start_position());
        let look = LookAngles::new(cam.start_pitch, cam.start_yaw);
        camera.turn(look.pitch, look.yaw);
        camera.update_view_matrix();

        let layout = SceneLayout::from_config(config);
        Self {
            state: LifecycleState::Uninitialized,
            platform: layout.platform(),
            layout,
            camera,
            look,
            timer: StepTimer::new(config.timing.fixed_step()),
            mount: MountState::default(),
            skybox: None,
            terrain: None,
            objects: SceneObjects::new(),
            light: None,
            exit_requested: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn look_angles(&self) -> LookAngles {
        self.look
    }

    pub fn mount_state(&self) -> MountState {
        self.mount
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn objects(&self) -> &SceneObjects {
        &self.objects
    }

    pub fn light(&self) -> Option<&LightState> {
        self.light.as_ref()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn step_count(&self) -> u64 {
        self.timer.frame_count()
    }

    /// Keeps the lens in step with the window.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let c = &self.camera;
        let (fov_y, near, far) = (c.fov_y(), c.near_z(), c.far_z());
        self.camera.set_lens(fov_y, width as f32 / height as f32, near, far);
    }

    /// Builds every drawable and the light. On failure nothing is kept.
    pub fn create_device_resources(
        &mut self,
        backend: &mut dyn GpuBackend,
        assets: &dyn AssetSource,
    ) -> Result<()> {
        match self.state {
            LifecycleState::Uninitialized | LifecycleState::DeviceLost => {}
            _ => return Err(SceneError::InvalidState("device resources already exist")),
        }

        let content = {
            let mut ctx = BuildContext::new(backend, assets);
            build_scene(&mut ctx, &self.layout)
        };
        let SceneContent {
            skybox,
            terrain,
            mut objects,
        } = match content {
            Ok(content) => content,
            Err(err) => {
                backend.release_all();
                return Err(err);
            }
        };

        apply_platform_rotation(&mut objects, self.platform.rotation());
        self.skybox = Some(skybox);
        self.terrain = Some(terrain);
        self.objects = objects;
        self.light = Some(self.layout.light(&self.camera));
        self.state = LifecycleState::DeviceReady;
        log::debug!("Device resources created");
        Ok(())
    }

    /// Drops every device-dependent resource. Camera and look angles survive.
    pub fn release_device_resources(&mut self, backend: &mut dyn GpuBackend) {
        self.skybox = None;
        self.terrain = None;
        self.objects.clear();
        self.light = None;
        backend.release_all();
        self.state = LifecycleState::DeviceLost;
        log::debug!("Device resources released");
    }

    pub fn recreate_device_resources(
        &mut self,
        backend: &mut dyn GpuBackend,
        assets: &dyn AssetSource,
    ) -> Result<()> {
        if self.state != LifecycleState::DeviceLost {
            self.release_device_resources(backend);
        }
        self.create_device_resources(backend, assets)
    }

    pub fn on_device_lost(&mut self, backend: &mut dyn GpuBackend) {
        log::warn!("Device lost, releasing scene resources");
        self.release_device_resources(backend);
    }

    pub fn on_device_restored(
        &mut self,
        backend: &mut dyn GpuBackend,
        assets: &dyn AssetSource,
    ) -> Result<()> {
        log::info!("Device restored, rebuilding scene resources");
        self.recreate_device_resources(backend, assets)
    }

    /// Runs the simulation steps due for `elapsed` seconds and plans the frame.
    /// Returns `None` without resources or before the first completed step.
    pub fn tick(&mut self, elapsed: f64, input: &mut dyn InputSource) -> Option<FramePlan> {
        match self.state {
            LifecycleState::Uninitialized | LifecycleState::DeviceLost => return None,
            LifecycleState::DeviceReady => self.state = LifecycleState::Running,
            LifecycleState::Running => {}
        }

        let mut steps = Vec::new();
        self.timer.tick(elapsed, |dt| steps.push(dt as f32));
        for dt in steps {
            self.step(dt, input);
        }

        if self.timer.frame_count() == 0 {
            return None;
        }
        Some(self.build_frame_plan())
    }

    /// One simulation step: input, camera, animation, then the mount probe.
    pub fn step(&mut self, dt: f32, input: &mut dyn InputSource) {
        let delta = input.sample();
        if delta.exit && !self.exit_requested {
            log::info!("Exit requested");
            self.exit_requested = true;
        }
        if delta.dismount {
            self.mount.request_dismount();
        }

        self.camera.walk(delta.walk);
        self.camera.strafe(delta.strafe);
        self.look.apply(delta.pitch, delta.yaw);
        self.camera.turn(self.look.pitch, self.look.yaw);
        self.camera.update_view_matrix();

        let delta_rotation = self.platform.advance(dt);
        apply_platform_rotation(&mut self.objects, self.platform.rotation());

        let outcome = update_mount(
            &mut self.camera,
            &self.platform,
            delta_rotation,
            self.layout.probe_half_extents,
            &mut self.mount,
        );
        if outcome != MountOutcome::Free {
            self.camera.update_view_matrix();
        }
    }

    fn draw_calls(
        &self,
        object: &SceneObject,
        pipeline: PipelineKind,
        eye: ViewProjection,
        light: ViewProjection,
        draws: &mut Vec<DrawCall>,
    ) {
        let samples_shadow_map = matches!(pipeline, PipelineKind::Terrain | PipelineKind::Standard);
        for part in &object.drawable.parts {
            draws.push(DrawCall {
                pipeline,
                mesh: part.mesh,
                index_count: part.index_count,
                material: if pipeline == PipelineKind::Shadow { None } else { part.material },
                samples_shadow_map,
                constants: DrawConstants::new(
                    object.part_transform(part),
                    eye,
                    light,
                    self.camera.position(),
                    part.color,
                ),
            });
        }
    }

    /// Shadow pass over terrain and objects, then the main pass:
    /// skybox, terrain, remaining objects.
    pub fn build_frame_plan(&self) -> FramePlan {
        let eye = ViewProjection {
            view: self.camera.view(),
            projection: self.camera.proj(),
        };
        let light = self
            .light
            .as_ref()
            .map_or(eye, LightState::view_projection);
        let terrain_id = self.terrain;
        let terrain = terrain_id.and_then(|id| self.objects.get(id));
        let others: Vec<&SceneObject> = self
            .objects
            .iter()
            .filter(|(id, _)| Some(*id) != terrain_id)
            .map(|(_, object)| object)
            .collect();

        let mut shadow_draws = Vec::new();
        if let Some(terrain) = terrain {
            self.draw_calls(terrain, PipelineKind::Shadow, eye, light, &mut shadow_draws);
        }
        for object in &others {
            self.draw_calls(object, PipelineKind::Shadow, eye, light, &mut shadow_draws);
        }

        let mut main_draws = Vec::new();
        if let Some(skybox) = &self.skybox {
            let sky = SceneObject::new(skybox.clone(), Mat4::IDENTITY, Mat4::IDENTITY);
            self.draw_calls(&sky, PipelineKind::Skybox, eye, light, &mut main_draws);
        }
        if let Some(terrain) = terrain {
            self.draw_calls(terrain, PipelineKind::Terrain, eye, light, &mut main_draws);
        }
        for object in &others {
            self.draw_calls(object, PipelineKind::Standard, eye, light, &mut main_draws);
        }

        FramePlan {
            clear_color: BACKGROUND,
            passes: vec![
                Pass {
                    label: "Shadow Pass",
                    target: PassTarget::ShadowMap,
                    clear_color: Some([0.0, 0.0, 0.0, 1.0]),
                    clear_depth: true,
                    draws: shadow_draws,
                },
                Pass {
                    label: "Main Pass",
                    target: PassTarget::Primary,
                    clear_color: None,
                    clear_depth: true,
                    draws: main_draws,
                },
            ],
        }
    }
}
