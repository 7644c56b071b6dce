// src/engine_lib/camera.rs

use glam::{Mat3, Mat4, Vec3, Vec4};

/// Left-handed walk camera. The view matrix is cached: every mutator leaves it
/// stale until [`Camera::update_view_matrix`] is called.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    right: Vec3,
    up: Vec3,
    look: Vec3,

    near_z: f32,
    far_z: f32,
    aspect: f32,
    fov_y: f32,
    near_window_height: f32,
    far_window_height: f32,

    view: Mat4,
    proj: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            right: Vec3::X,
            up: Vec3::Y,
            look: Vec3::Z,
            near_z: 0.0,
            far_z: 0.0,
            aspect: 0.0,
            fov_y: 0.0,
            near_window_height: 0.0,
            far_window_height: 0.0,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        };
        camera.set_lens(std::f32::consts::FRAC_PI_4, 1280.0 / 960.0, 0.1, 1000.0);
        camera
    }
}

impl Camera {
    pub fn new(fov_y: f32, aspect: f32, near_z: f32, far_z: f32) -> Self {
        let mut camera = Self::default();
        camera.set_lens(fov_y, aspect, near_z, far_z);
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn look(&self) -> Vec3 {
        self.look
    }

    pub fn near_z(&self) -> f32 {
        self.near_z
    }

    pub fn far_z(&self) -> f32 {
        self.far_z
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn fov_x(&self) -> f32 {
        let half_width = 0.5 * self.near_window_width();
        2.0 * (half_width / self.near_z).atan()
    }

    pub fn near_window_width(&self) -> f32 {
        self.aspect * self.near_window_height
    }

    pub fn near_window_height(&self) -> f32 {
        self.near_window_height
    }

    pub fn far_window_width(&self) -> f32 {
        self.aspect * self.far_window_height
    }

    pub fn far_window_height(&self) -> f32 {
        self.far_window_height
    }

    /// Caller guarantees `0 < near_z < far_z` and `fov_y` in (0, pi).
    pub fn set_lens(&mut self, fov_y: f32, aspect: f32, near_z: f32, far_z: f32) {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near_z = near_z;
        self.far_z = far_z;

        let half_tan = (0.5 * fov_y).tan();
        self.near_window_height = 2.0 * near_z * half_tan;
        self.far_window_height = 2.0 * far_z * half_tan;

        self.proj = Mat4::perspective_lh(fov_y, aspect, near_z, far_z);
    }

    /// Degenerate when `target - eye` is parallel to `world_up`.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, world_up: Vec3) {
        let look = (target - eye).normalize();
        let right = world_up.cross(look).normalize();
        let up = look.cross(right);

        self.position = eye;
        self.look = look;
        self.right = right;
        self.up = up;
    }

    /// Points the camera along the spherical direction `(pitch, yaw)` with +Y up.
    pub fn turn(&mut self, pitch: f32, yaw: f32) {
        let target = self.position + Self::direction(pitch, yaw);
        self.look_at(self.position, target, Vec3::Y);
    }

    pub fn direction(pitch: f32, yaw: f32) -> Vec3 {
        let (sin_p, cos_p) = pitch.sin_cos();
        let (sin_y, cos_y) = yaw.sin_cos();
        Vec3::new(cos_p * sin_y, sin_p, cos_p * cos_y)
    }

    pub fn strafe(&mut self, d: f32) {
        self.position += d * self.right;
    }

    pub fn walk(&mut self, d: f32) {
        self.position += d * self.look;
    }

    /// Rotates up and look about the right vector.
    pub fn pitch(&mut self, angle: f32) {
        let rotation = Mat3::from_axis_angle(self.right, angle);
        self.up = rotation * self.up;
        self.look = rotation * self.look;
    }

    /// Rotates the whole basis about world Y.
    pub fn rotate_y(&mut self, angle: f32) {
        let rotation = Mat3::from_rotation_y(angle);
        self.right = rotation * self.right;
        self.up = rotation * self.up;
        self.look = rotation * self.look;
    }

    pub fn update_view_matrix(&mut self) {
        let look = self.look.normalize();
        let up = look.cross(self.right).normalize();
        let right = up.cross(look);

        let p = self.position;
        let x = -p.dot(right);
        let y = -p.dot(up);
        let z = -p.dot(look);

        self.right = right;
        self.up = up;
        self.look = look;

        // Rows are the basis vectors; the last column is the inverse translation.
        self.view = Mat4::from_cols(
            Vec4::new(right.x, up.x, look.x, 0.0),
            Vec4::new(right.y, up.y, look.y, 0.0),
            Vec4::new(right.z, up.z, look.z, 0.0),
            Vec4::new(x, y, z, 1.0),
        );
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn proj(&self) -> Mat4 {
        self.proj
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lens_window_sizes() {
        let camera = Camera::new(std::f32::consts::FRAC_PI_2, 2.0, 1.0, 10.0);
        assert_relative_eq!(camera.near_window_height(), 2.0, epsilon = 1e-5);
        assert_relative_eq!(camera.far_window_height(), 20.0, epsilon = 1e-4);
        assert_relative_eq!(camera.near_window_width(), 4.0, epsilon = 1e-5);
        assert_relative_eq!(camera.fov_x(), 2.0 * 2.0f32.atan(), epsilon = 1e-5);
    }

    #[test]
    fn mutators_leave_view_stale() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::ZERO, Vec3::Z, Vec3::Y);
        camera.update_view_matrix();
        let before = camera.view();
        camera.walk(5.0);
        assert_eq!(camera.view(), before);
        camera.update_view_matrix();
        assert_ne!(camera.view(), before);
    }

    #[test]
    fn view_maps_position_to_origin() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::new(3.0, 4.0, -2.0), Vec3::new(0.0, 0.0, 5.0), Vec3::Y);
        camera.update_view_matrix();
        let p = camera.view().transform_point3(camera.position());
        assert_relative_eq!(p.length(), 0.0, epsilon = 1e-5);
        let ahead = camera.view().transform_point3(camera.position() + camera.look());
        assert_relative_eq!(ahead.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn pitch_and_rotate_y_keep_basis_orthonormal() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::ZERO, Vec3::new(1.0, 0.2, 1.0), Vec3::Y);
        camera.pitch(0.3);
        camera.rotate_y(-1.1);
        camera.update_view_matrix();
        assert_relative_eq!(camera.right().dot(camera.up()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.up().dot(camera.look()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.look().length(), 1.0, epsilon = 1e-5);
    }
}
