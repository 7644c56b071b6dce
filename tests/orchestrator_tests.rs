// tests/orchestrator_tests.rs
use std::collections::VecDeque;

use approx::assert_relative_eq;
use glam::{Mat4, Vec3};
use snowscape::engine_lib::{CameraDelta, InputSource, LifecycleState, Orchestrator};
use snowscape::media::MemoryAssets;
use snowscape::rendering_lib::{PassTarget, PipelineKind, RecordingBackend};
use snowscape::{SceneConfig, SceneError};

const STEP: f64 = 1.0 / 32.0;

/// Plays back queued deltas, then stands still.
#[derive(Default)]
struct Script(VecDeque<CameraDelta>);

impl Script {
    fn then(mut self, delta: CameraDelta) -> Self {
        self.0.push_back(delta);
        self
    }
}

impl InputSource for Script {
    fn sample(&mut self) -> CameraDelta {
        self.0.pop_front().unwrap_or_default()
    }
}

fn config() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.timing.fixed_timestep = STEP;
    config
}

fn ready(config: &SceneConfig) -> (Orchestrator, RecordingBackend, MemoryAssets) {
    let mut orchestrator = Orchestrator::new(config);
    let mut backend = RecordingBackend::new();
    let assets = MemoryAssets::new();
    orchestrator.create_device_resources(&mut backend, &assets).unwrap();
    (orchestrator, backend, assets)
}

#[test]
fn no_plan_without_device_resources() {
    let mut orchestrator = Orchestrator::new(&config());
    assert!(orchestrator.tick(0.5, &mut Script::default()).is_none());
    assert_eq!(orchestrator.state(), LifecycleState::Uninitialized);
    assert_eq!(orchestrator.step_count(), 0);
}

#[test]
fn no_plan_before_the_first_step() {
    let (mut orchestrator, _backend, _assets) = ready(&config());
    assert_eq!(orchestrator.state(), LifecycleState::DeviceReady);

    assert!(orchestrator.tick(0.0, &mut Script::default()).is_none());
    assert_eq!(orchestrator.state(), LifecycleState::Running);

    assert!(orchestrator.tick(STEP, &mut Script::default()).is_some());
    assert_eq!(orchestrator.step_count(), 1);
}

#[test]
fn shadow_pass_precedes_main_pass() {
    let (mut orchestrator, backend, _assets) = ready(&config());
    let plan = orchestrator.tick(STEP, &mut Script::default()).unwrap();

    assert_eq!(plan.passes.len(), 2);
    assert_eq!(plan.passes[0].target, PassTarget::ShadowMap);
    assert_eq!(plan.passes[1].target, PassTarget::Primary);
    assert!(plan.passes[0].clear_depth && plan.passes[1].clear_depth);

    let object_parts: usize = orchestrator.objects().iter().map(|(_, o)| o.drawable.parts.len()).sum();
    let shadow = plan.pass(PassTarget::ShadowMap).unwrap();
    assert_eq!(shadow.draws.len(), object_parts);
    assert!(shadow.draws.iter().all(|d| d.pipeline == PipelineKind::Shadow && d.material.is_none()));

    // The skybox is the first mesh uploaded and never casts a shadow.
    let skybox_mesh = backend.meshes.iter().position(|m| m.label == "skybox").unwrap() as u32;
    assert!(shadow.draws.iter().all(|d| d.mesh.0 != skybox_mesh));

    let main = plan.pass(PassTarget::Primary).unwrap();
    assert_eq!(main.draws.len(), object_parts + 1);
    assert_eq!(main.draws[0].pipeline, PipelineKind::Skybox);
    assert_eq!(main.draws[0].mesh.0, skybox_mesh);
    assert!(!main.draws[0].samples_shadow_map);
    assert_eq!(main.draws[1].pipeline, PipelineKind::Terrain);
    assert!(main.draws[2..].iter().all(|d| d.pipeline == PipelineKind::Standard && d.samples_shadow_map));
}

#[test]
fn skybox_draws_with_identity_world() {
    let (mut orchestrator, _backend, _assets) = ready(&config());
    let plan = orchestrator.tick(STEP, &mut Script::default()).unwrap();
    let sky = &plan.pass(PassTarget::Primary).unwrap().draws[0];
    assert_eq!(sky.constants.world(), Mat4::IDENTITY);
}

#[test]
fn device_loss_drops_the_scene_and_restore_rebuilds_it() {
    let (mut orchestrator, mut backend, assets) = ready(&config());
    orchestrator.tick(STEP * 3.0, &mut Script::default()).unwrap();
    let camera_before = orchestrator.camera().position();
    let objects_before = orchestrator.objects().len();

    orchestrator.on_device_lost(&mut backend);
    assert_eq!(orchestrator.state(), LifecycleState::DeviceLost);
    assert!(orchestrator.objects().is_empty());
    assert!(orchestrator.light().is_none());
    assert_eq!(backend.releases, 1);
    assert!(orchestrator.tick(STEP, &mut Script::default()).is_none());

    orchestrator.on_device_restored(&mut backend, &assets).unwrap();
    assert_eq!(orchestrator.state(), LifecycleState::DeviceReady);
    assert_eq!(orchestrator.objects().len(), objects_before);
    assert_eq!(orchestrator.camera().position(), camera_before);
    assert!(orchestrator.tick(STEP, &mut Script::default()).is_some());
}

#[test]
fn creating_resources_twice_is_rejected() {
    let (mut orchestrator, mut backend, assets) = ready(&config());
    let result = orchestrator.create_device_resources(&mut backend, &assets);
    assert!(matches!(result, Err(SceneError::InvalidState(_))));
    assert_eq!(orchestrator.state(), LifecycleState::DeviceReady);
}

#[test]
fn failed_setup_keeps_nothing() {
    let mut orchestrator = Orchestrator::new(&config());
    let mut backend = RecordingBackend::new();
    backend.fail_mesh_label = Some("box".to_string());

    let result = orchestrator.create_device_resources(&mut backend, &MemoryAssets::new());
    assert!(result.is_err());
    assert_eq!(orchestrator.state(), LifecycleState::Uninitialized);
    assert!(orchestrator.objects().is_empty());
    assert_eq!(backend.releases, 1);
    assert!(orchestrator.tick(STEP, &mut Script::default()).is_none());
}

#[test]
fn missing_strict_media_fails_setup() {
    let mut orchestrator = Orchestrator::new(&config());
    let mut backend = RecordingBackend::new();
    let mut assets = MemoryAssets::new();
    assets.strict = true;

    let result = orchestrator.create_device_resources(&mut backend, &assets);
    assert!(matches!(result, Err(SceneError::MediaNotFound(_))));
    assert_eq!(orchestrator.state(), LifecycleState::Uninitialized);
}

#[test]
fn camera_on_the_platform_rides_it() {
    let mut config = config();
    config.camera.start_position = [8.0, 1.725, 0.0];
    let (mut orchestrator, _backend, _assets) = ready(&config);
    let start = orchestrator.camera().position();

    orchestrator.tick(STEP, &mut Script::default()).unwrap();

    assert!(orchestrator.mount_state().mounted);
    let delta = orchestrator.platform().total_rotation;
    let expected = Mat4::from_rotation_y(delta).transform_point3(start);
    let pos = orchestrator.camera().position();
    assert_relative_eq!(pos.x, expected.x, epsilon = 1e-4);
    assert_relative_eq!(pos.y, expected.y, epsilon = 1e-4);
    assert_relative_eq!(pos.z, expected.z, epsilon = 1e-4);

    // The view was rebuilt after the ride moved the camera.
    let eye_in_view = orchestrator.camera().view().transform_point3(pos);
    assert_relative_eq!(eye_in_view.length(), 0.0, epsilon = 1e-4);
}

#[test]
fn dismount_places_camera_beside_the_platform() {
    let mut config = config();
    config.camera.start_position = [8.0, 1.725, 0.0];
    let (mut orchestrator, _backend, _assets) = ready(&config);

    let dismount = CameraDelta {
        dismount: true,
        ..CameraDelta::default()
    };
    // A request before boarding is ignored; the second one lands.
    let mut input = Script::default().then(dismount).then(dismount);
    orchestrator.tick(STEP, &mut input).unwrap();
    assert!(orchestrator.mount_state().mounted);
    orchestrator.tick(STEP, &mut input).unwrap();

    let total = orchestrator.platform().total_rotation;
    let expected = Mat4::from_rotation_y(total)
        .transform_point3(Vec3::new(8.0 + 8.0_f32.sqrt(), 1.725, 0.0));
    let pos = orchestrator.camera().position();
    assert_relative_eq!(pos.x, expected.x, epsilon = 1e-4);
    assert_relative_eq!(pos.z, expected.z, epsilon = 1e-4);

    orchestrator.tick(STEP, &mut Script::default()).unwrap();
    assert!(!orchestrator.mount_state().mounted);
}

#[test]
fn exit_request_is_latched() {
    let (mut orchestrator, _backend, _assets) = ready(&config());
    let exit = CameraDelta {
        exit: true,
        ..CameraDelta::default()
    };
    orchestrator.tick(STEP, &mut Script::default().then(exit)).unwrap();
    assert!(orchestrator.exit_requested());
    orchestrator.tick(STEP, &mut Script::default()).unwrap();
    assert!(orchestrator.exit_requested());
}

#[test]
fn riding_objects_follow_the_platform_spin() {
    let (mut orchestrator, _backend, _assets) = ready(&config());
    orchestrator.tick(STEP * 4.0, &mut Script::default()).unwrap();

    let spin = orchestrator.platform().rotation();
    for (_, object) in orchestrator.objects().iter() {
        if object.rides_platform {
            assert_eq!(object.anim, spin);
        } else {
            assert_ne!(object.anim, spin);
        }
    }
}
