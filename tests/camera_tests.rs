// tests/camera_tests.rs
use approx::assert_relative_eq;
use glam::Vec3;
use snowscape::engine_lib::Camera;

fn lens() -> Camera {
    Camera::new(std::f32::consts::FRAC_PI_4, 1280.0 / 960.0, 0.1, 1000.0)
}

#[test]
fn look_at_origin_from_behind() {
    let mut camera = lens();
    camera.look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO, Vec3::Y);
    camera.update_view_matrix();

    assert_relative_eq!(camera.look().z, 1.0, epsilon = 1e-6);
    assert_relative_eq!(camera.right().x, 1.0, epsilon = 1e-6);
    assert_relative_eq!(camera.up().y, 1.0, epsilon = 1e-6);

    let target_in_view = camera.view().transform_point3(Vec3::ZERO);
    assert_relative_eq!(target_in_view.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(target_in_view.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(target_in_view.z, 10.0, epsilon = 1e-5);

    // In front of the camera and inside the depth range.
    let clip = camera.view_proj() * Vec3::ZERO.extend(1.0);
    let depth = clip.z / clip.w;
    assert!(depth > 0.0 && depth < 1.0, "depth {depth}");
}

#[test]
fn turn_faces_the_spherical_direction() {
    let mut camera = lens();
    camera.set_position(Vec3::new(12.0, 10.0, -12.0));
    camera.turn(-std::f32::consts::FRAC_PI_4, -std::f32::consts::FRAC_PI_4);
    camera.update_view_matrix();

    let look = camera.look();
    assert_relative_eq!(look.x, -0.5, epsilon = 1e-5);
    assert_relative_eq!(look.y, -std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-5);
    assert_relative_eq!(look.z, 0.5, epsilon = 1e-5);
    assert_relative_eq!(camera.right().y, 0.0, epsilon = 1e-6);
}

#[test]
fn turn_is_idempotent() {
    let mut camera = lens();
    camera.set_position(Vec3::new(12.0, 10.0, -12.0));
    camera.turn(-0.4, 2.2);
    camera.update_view_matrix();
    let (look, right, up) = (camera.look(), camera.right(), camera.up());

    for _ in 0..2 {
        camera.turn(-0.4, 2.2);
        camera.update_view_matrix();
        for (now, first) in [(camera.look(), look), (camera.right(), right), (camera.up(), up)] {
            assert_relative_eq!(now.x, first.x, epsilon = 1e-6);
            assert_relative_eq!(now.y, first.y, epsilon = 1e-6);
            assert_relative_eq!(now.z, first.z, epsilon = 1e-6);
        }
    }
}

#[test]
fn walking_and_strafing_keep_an_orthonormal_basis() {
    let mut camera = lens();
    camera.turn(0.3, 1.2);
    for i in 0..200 {
        camera.walk(0.05);
        camera.strafe(-0.05);
        camera.pitch(0.01 * (i % 3) as f32);
        camera.rotate_y(0.02);
        camera.update_view_matrix();
    }

    let (r, u, l) = (camera.right(), camera.up(), camera.look());
    assert_relative_eq!(r.length(), 1.0, epsilon = 1e-4);
    assert_relative_eq!(u.length(), 1.0, epsilon = 1e-4);
    assert_relative_eq!(l.length(), 1.0, epsilon = 1e-4);
    assert_relative_eq!(r.dot(u), 0.0, epsilon = 1e-4);
    assert_relative_eq!(r.dot(l), 0.0, epsilon = 1e-4);
    assert_relative_eq!(u.dot(l), 0.0, epsilon = 1e-4);
}

#[test]
fn camera_at_origin_has_no_view_translation() {
    let mut camera = Camera::new(std::f32::consts::FRAC_PI_4, 1.0, 0.1, 1000.0);
    camera.look_at(Vec3::ZERO, Vec3::Z, Vec3::Y);
    camera.update_view_matrix();

    assert_eq!(camera.look(), Vec3::Z);
    assert_eq!(camera.right(), Vec3::X);
    assert_eq!(camera.up(), Vec3::Y);
    assert_eq!(camera.view().w_axis.truncate(), Vec3::ZERO);
}
