// src/engine_lib/scene_logic.rs
//! Platform animation and the camera's ride/dismount behaviour.

use glam::{Mat4, Vec3};

use crate::engine_lib::camera::Camera;
use crate::engine_lib::collision::{box_corners, is_intersect_obb, BoxCorners};
use crate::engine_lib::scene_types::SceneObjects;

/// A box spinning about world Y, carrying anything flagged to ride it.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Centre of the box before rotation.
    pub center: Vec3,
    pub scale: Vec3,
    /// Radians per second.
    pub angular_speed: f32,
    pub total_rotation: f32,
}

impl Platform {
    pub fn new(center: Vec3, scale: Vec3, angular_speed: f32) -> Self {
        Self {
            center,
            scale,
            angular_speed,
            total_rotation: 0.0,
        }
    }

    /// Advances the spin and returns this step's increment.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let delta = dt * self.angular_speed;
        self.total_rotation += delta;
        delta
    }

    pub fn rotation(&self) -> Mat4 {
        Mat4::from_rotation_y(self.total_rotation)
    }

    /// Unrotated corners of the box.
    pub fn corners(&self) -> BoxCorners {
        box_corners(self.center, self.scale * 0.5)
    }

    /// Where a dismounting camera is placed: just beyond the box's diagonal,
    /// carried round by the current spin.
    pub fn dismount_point(&self) -> Vec3 {
        let offset = (self.scale.x * self.scale.x + self.scale.z * self.scale.z).sqrt();
        self.rotation()
            .transform_point3(Vec3::new(self.center.x + offset, self.center.y, self.center.z))
    }
}

/// Assigns the platform's rotation to every object flagged to ride it.
pub fn apply_platform_rotation(objects: &mut SceneObjects, rotation: Mat4) {
    for object in objects.iter_mut().filter(|o| o.rides_platform) {
        object.anim = rotation;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MountState {
    pub mounted: bool,
    pub dismount_requested: bool,
}

impl MountState {
    /// Dismount requests only register while riding.
    pub fn request_dismount(&mut self) {
        if self.mounted {
            self.dismount_requested = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Free,
    Riding,
    Dismounted,
}

/// Probes the camera against the platform and moves it accordingly.
/// Leaves the view matrix stale when the camera moved.
pub fn update_mount(
    camera: &mut Camera,
    platform: &Platform,
    delta_rotation: f32,
    probe_half_extents: Vec3,
    state: &mut MountState,
) -> MountOutcome {
    let was_mounted = state.mounted;
    state.mounted = is_intersect_obb(
        camera.position(),
        probe_half_extents,
        platform.rotation(),
        &platform.corners(),
    );

    if !state.mounted {
        state.dismount_requested = false;
        if was_mounted {
            log::debug!("Camera left the platform");
        }
        return MountOutcome::Free;
    }

    if state.dismount_requested {
        state.dismount_requested = false;
        camera.set_position(platform.dismount_point());
        log::debug!("Camera dismounted to {:?}", camera.position());
        return MountOutcome::Dismounted;
    }

    if !was_mounted {
        log::debug!("Camera boarded the platform");
    }
    let ride = Mat4::from_rotation_y(delta_rotation);
    camera.set_position(ride.transform_point3(camera.position()));
    MountOutcome::Riding
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn platform() -> Platform {
        Platform::new(Vec3::new(8.0, 1.725, 0.0), Vec3::splat(2.0), std::f32::consts::FRAC_PI_4)
    }

    #[test]
    fn advance_accumulates() {
        let mut p = platform();
        let d = p.advance(0.5);
        assert_relative_eq!(d, std::f32::consts::FRAC_PI_8);
        p.advance(0.5);
        assert_relative_eq!(p.total_rotation, std::f32::consts::FRAC_PI_4);
    }

    #[test]
    fn camera_on_platform_rides_the_rotation() {
        let p = platform();
        let mut camera = Camera::default();
        camera.set_position(Vec3::new(8.0, 2.5, 0.0));
        let mut state = MountState::default();

        let delta = 0.1;
        let outcome = update_mount(&mut camera, &p, delta, Vec3::ONE, &mut state);
        assert_eq!(outcome, MountOutcome::Riding);
        assert!(state.mounted);
        let expected = Mat4::from_rotation_y(delta).transform_point3(Vec3::new(8.0, 2.5, 0.0));
        assert_relative_eq!(camera.position().distance(expected), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position().length(), Vec3::new(8.0, 2.5, 0.0).length(), epsilon = 1e-5);
    }

    #[test]
    fn dismount_places_camera_beyond_the_box() {
        let p = platform();
        let mut camera = Camera::default();
        camera.set_position(Vec3::new(8.0, 2.5, 0.0));
        let mut state = MountState { mounted: true, dismount_requested: false };
        state.request_dismount();

        let outcome = update_mount(&mut camera, &p, 0.1, Vec3::ONE, &mut state);
        assert_eq!(outcome, MountOutcome::Dismounted);
        assert!(!state.dismount_requested);
        let offset = 8.0f32.sqrt();
        assert_relative_eq!(camera.position().x, 8.0 + offset, epsilon = 1e-5);
        assert_relative_eq!(camera.position().y, 1.725, epsilon = 1e-5);
    }

    #[test]
    fn leaving_clears_pending_dismount() {
        let p = platform();
        let mut camera = Camera::default();
        camera.set_position(Vec3::new(-50.0, 0.0, 0.0));
        let mut state = MountState { mounted: true, dismount_requested: true };

        let outcome = update_mount(&mut camera, &p, 0.1, Vec3::ONE, &mut state);
        assert_eq!(outcome, MountOutcome::Free);
        assert_eq!(state, MountState::default());
        assert_eq!(camera.position(), Vec3::new(-50.0, 0.0, 0.0));
    }

    #[test]
    fn dismount_request_ignored_when_free() {
        let mut state = MountState::default();
        state.request_dismount();
        assert!(!state.dismount_requested);
    }
}
