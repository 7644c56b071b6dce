// src/engine_lib/primitives.rs
//! Unit mesh generators for the shapes the scene is assembled from.
//!
//! Generated triangles are wound so that the right-handed cross product of their
//! edges points into the shape. The clockwise-front pipelines expect the opposite,
//! so callers run [`reverse_indices`] before upload.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::rendering_lib::vertex::MeshVertex;

pub const DEFAULT_SPHERE_TESSELLATION: u32 = 16;
pub const DEFAULT_ROUND_TESSELLATION: u32 = 32;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn reversed(mut self) -> Self {
        reverse_indices(&mut self.indices);
        self
    }

    fn push(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        self.vertices.push(MeshVertex::new(position, normal, uv));
        self.vertices.len() as u32 - 1
    }
}

/// Reverses the whole index list, which flips the winding of every triangle.
pub fn reverse_indices(indices: &mut [u32]) {
    indices.reverse();
}

/// Axis-aligned cube with four vertices per face.
pub fn cube(size: f32) -> MeshData {
    const FACE_NORMALS: [Vec3; 6] = [
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
    ];
    let half = size * 0.5;
    let mut mesh = MeshData::default();

    for (i, normal) in FACE_NORMALS.iter().copied().enumerate() {
        let basis = if i >= 4 { Vec3::Z } else { Vec3::Y };
        let side1 = normal.cross(basis);
        let side2 = normal.cross(side1);

        let base = mesh.vertices.len() as u32;
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        mesh.push((normal - side1 - side2) * half, normal, Vec2::new(1.0, 0.0));
        mesh.push((normal - side1 + side2) * half, normal, Vec2::new(1.0, 1.0));
        mesh.push((normal + side1 + side2) * half, normal, Vec2::new(0.0, 1.0));
        mesh.push((normal + side1 - side2) * half, normal, Vec2::new(0.0, 0.0));
    }
    mesh
}

/// UV sphere; `tessellation` is the number of latitude bands (minimum 3).
pub fn sphere(diameter: f32, tessellation: u32) -> MeshData {
    let vertical = tessellation.max(3);
    let horizontal = vertical * 2;
    let radius = diameter * 0.5;
    let mut mesh = MeshData::default();

    for i in 0..=vertical {
        let v = 1.0 - i as f32 / vertical as f32;
        let latitude = i as f32 * PI / vertical as f32 - PI * 0.5;
        let (dy, dxz) = latitude.sin_cos();

        for j in 0..=horizontal {
            let u = j as f32 / horizontal as f32;
            let (dx, dz) = (u * TAU).sin_cos();
            let normal = Vec3::new(dx * dxz, dy, dz * dxz);
            mesh.push(normal * radius, normal, Vec2::new(1.0 - u, v));
        }
    }

    let stride = horizontal + 1;
    for i in 0..vertical {
        for j in 0..horizontal {
            let a = i * stride + j;
            let up = a + stride;
            mesh.indices.extend_from_slice(&[a, up, a + 1, a + 1, up, up + 1]);
        }
    }
    mesh
}

fn ring_point(i: u32, tessellation: u32) -> (f32, f32) {
    (i as f32 * TAU / tessellation as f32).sin_cos()
}

/// Flat disc at height `y` facing `+Y` when `up`, `-Y` otherwise.
fn cap(mesh: &mut MeshData, radius: f32, y: f32, tessellation: u32, up: bool) {
    let normal = if up { Vec3::Y } else { -Vec3::Y };
    let center = mesh.push(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5));
    let first = mesh.vertices.len() as u32;
    for i in 0..=tessellation {
        let (dx, dz) = ring_point(i, tessellation);
        let uv = Vec2::new(dx * 0.5 + 0.5, dz * 0.5 + 0.5);
        mesh.push(Vec3::new(dx * radius, y, dz * radius), normal, uv);
    }
    for i in 0..tessellation {
        let (p, q) = (first + i, first + i + 1);
        if up {
            mesh.indices.extend_from_slice(&[center, q, p]);
        } else {
            mesh.indices.extend_from_slice(&[center, p, q]);
        }
    }
}

/// Closed cylinder centred on the origin along Y.
pub fn cylinder(height: f32, diameter: f32, tessellation: u32) -> MeshData {
    let tessellation = tessellation.max(3);
    let radius = diameter * 0.5;
    let half_height = height * 0.5;
    let mut mesh = MeshData::default();

    for i in 0..=tessellation {
        let (dx, dz) = ring_point(i, tessellation);
        let normal = Vec3::new(dx, 0.0, dz);
        let u = i as f32 / tessellation as f32;
        mesh.push(normal * radius + Vec3::Y * half_height, normal, Vec2::new(u, 0.0));
        mesh.push(normal * radius - Vec3::Y * half_height, normal, Vec2::new(u, 1.0));
    }
    for i in 0..tessellation {
        let top = i * 2;
        mesh.indices
            .extend_from_slice(&[top, top + 2, top + 1, top + 1, top + 2, top + 3]);
    }

    cap(&mut mesh, radius, half_height, tessellation, true);
    cap(&mut mesh, radius, -half_height, tessellation, false);
    mesh
}

/// Cone centred on the origin with its apex at `+height/2`.
pub fn cone(diameter: f32, height: f32, tessellation: u32) -> MeshData {
    let tessellation = tessellation.max(3);
    let radius = diameter * 0.5;
    let half_height = height * 0.5;
    let apex = Vec3::new(0.0, half_height, 0.0);
    let mut mesh = MeshData::default();

    for i in 0..=tessellation {
        let (dx, dz) = ring_point(i, tessellation);
        let normal = Vec3::new(dx * height, radius, dz * height).normalize();
        let u = i as f32 / tessellation as f32;
        mesh.push(apex, normal, Vec2::new(u, 0.0));
        mesh.push(
            Vec3::new(dx * radius, -half_height, dz * radius),
            normal,
            Vec2::new(u, 1.0),
        );
    }
    for i in 0..tessellation {
        let tip = i * 2;
        let base = tip + 1;
        mesh.indices.extend_from_slice(&[tip, base + 2, base]);
    }

    cap(&mut mesh, radius, -half_height, tessellation, false);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts triangles whose right-handed face normal points away from the origin.
    fn outward_triangles(mesh: &MeshData) -> usize {
        mesh.indices
            .chunks_exact(3)
            .filter(|tri| {
                let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[tri[k] as usize].position());
                let n = (b - a).cross(c - a);
                n.length_squared() > 1e-12 && n.dot((a + b + c) / 3.0) > 0.0
            })
            .count()
    }

    fn non_degenerate(mesh: &MeshData) -> usize {
        mesh.indices
            .chunks_exact(3)
            .filter(|tri| {
                let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[tri[k] as usize].position());
                (b - a).cross(c - a).length_squared() > 1e-12
            })
            .count()
    }

    #[test]
    fn cube_layout() {
        let mesh = cube(1.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(&mesh.indices[..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices[0].position, [0.5, 0.5, 0.5]);
        assert_eq!(mesh.vertices[0].tex_coord, [1.0, 0.0]);
    }

    #[test]
    fn generated_winding_faces_inward_until_reversed() {
        for mesh in [cube(1.0), sphere(1.0, 8), cylinder(1.0, 1.0, 12), cone(1.0, 1.0, 12)] {
            assert_eq!(outward_triangles(&mesh), 0);
            let solid = non_degenerate(&mesh);
            assert_eq!(outward_triangles(&mesh.reversed()), solid);
        }
    }

    #[test]
    fn reverse_twice_is_identity() {
        let original = sphere(1.0, 5).indices;
        let mut indices = original.clone();
        reverse_indices(&mut indices);
        assert_ne!(indices, original);
        reverse_indices(&mut indices);
        assert_eq!(indices, original);
    }

    #[test]
    fn sphere_vertices_on_radius() {
        let mesh = sphere(2.0, DEFAULT_SPHERE_TESSELLATION);
        for v in &mesh.vertices {
            assert!((v.position().length() - 1.0).abs() < 1e-5);
        }
    }
}
