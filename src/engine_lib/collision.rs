// src/engine_lib/collision.rs
//! Corner-classification box probe used to detect the camera riding a platform.

use glam::{Mat4, Vec3};

pub type BoxCorners = [Vec3; 8];

/// Corners of the axis-aligned box `center ± half_extents`.
///
/// Order: (-,-,-), (+,-,-), (-,+,-), (-,-,+), (+,+,-), (+,-,+), (-,+,+), (+,+,+).
pub fn box_corners(center: Vec3, half_extents: Vec3) -> BoxCorners {
    let h = half_extents;
    [
        center + Vec3::new(-h.x, -h.y, -h.z),
        center + Vec3::new(h.x, -h.y, -h.z),
        center + Vec3::new(-h.x, h.y, -h.z),
        center + Vec3::new(-h.x, -h.y, h.z),
        center + Vec3::new(h.x, h.y, -h.z),
        center + Vec3::new(h.x, -h.y, h.z),
        center + Vec3::new(-h.x, h.y, h.z),
        center + Vec3::new(h.x, h.y, h.z),
    ]
}

/// Inclusive containment of `point` in the axis-aligned bounds of `corners`.
pub fn is_in_box(point: Vec3, corners: &BoxCorners) -> bool {
    let (min, max) = corners
        .iter()
        .skip(1)
        .fold((corners[0], corners[0]), |(min, max), c| (min.min(*c), max.max(*c)));
    point.cmpge(min).all() && point.cmple(max).all()
}

/// True when any corner of the probe box, mapped into the platform's unrotated
/// frame through `box_rotation`'s inverse, lies inside `box_corners`.
///
/// This is not a full separating-axis test: a probe can straddle the platform
/// with every corner outside and still report false.
pub fn is_intersect_obb(
    probe_center: Vec3,
    probe_half_extents: Vec3,
    box_rotation: Mat4,
    box_corners_local: &BoxCorners,
) -> bool {
    let to_local = box_rotation.inverse();
    box_corners(probe_center, probe_half_extents)
        .iter()
        .map(|corner| to_local.transform_point3(*corner))
        .any(|corner| is_in_box(corner, box_corners_local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_order() {
        let c = box_corners(Vec3::ZERO, Vec3::ONE);
        assert_eq!(c[0], Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(c[4], Vec3::new(1.0, 1.0, -1.0));
        assert_eq!(c[7], Vec3::ONE);
    }

    #[test]
    fn bounds_are_inclusive() {
        let c = box_corners(Vec3::ZERO, Vec3::ONE);
        assert!(is_in_box(Vec3::new(1.0, -1.0, 0.5), &c));
        assert!(!is_in_box(Vec3::new(1.0001, 0.0, 0.0), &c));
    }

    #[test]
    fn centered_small_probe_hits() {
        let platform = box_corners(Vec3::new(8.0, 1.725, 0.0), Vec3::ONE);
        assert!(is_intersect_obb(
            Vec3::new(8.0, 1.725, 0.0),
            Vec3::splat(0.25),
            Mat4::IDENTITY,
            &platform
        ));
    }

    #[test]
    fn distant_probe_misses_on_every_axis() {
        let center = Vec3::new(8.0, 1.725, 0.0);
        let platform = box_corners(center, Vec3::ONE);
        for offset in [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X] {
            assert!(!is_intersect_obb(
                center + offset * 100.0,
                Vec3::ONE,
                Mat4::IDENTITY,
                &platform
            ));
        }
    }

    #[test]
    fn rotation_moves_the_platform_away() {
        // Platform local frame sits at +X; rotating it half a turn carries it to -X.
        let platform = box_corners(Vec3::new(8.0, 0.0, 0.0), Vec3::ONE);
        let half_turn = Mat4::from_rotation_y(std::f32::consts::PI);
        let probe = Vec3::new(-8.0, 0.0, 0.0);
        assert!(is_intersect_obb(probe, Vec3::splat(0.1), half_turn, &platform));
        assert!(!is_intersect_obb(probe, Vec3::splat(0.1), Mat4::IDENTITY, &platform));
    }

    #[test]
    fn straddling_probe_with_no_corner_inside_misses() {
        let platform = box_corners(Vec3::ZERO, Vec3::new(0.5, 0.5, 0.5));
        assert!(!is_intersect_obb(Vec3::ZERO, Vec3::splat(2.0), Mat4::IDENTITY, &platform));
    }
}
