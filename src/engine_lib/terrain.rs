// src/engine_lib/terrain.rs

use glam::{Vec2, Vec3};

use crate::engine_lib::primitives::MeshData;
use crate::error::{Result, SceneError};
use crate::rendering_lib::vertex::MeshVertex;

pub const HEIGHTMAP_SIDE: usize = 256;
pub const HEIGHTMAP_SAMPLES: usize = HEIGHTMAP_SIDE * HEIGHTMAP_SIDE;

/// Converts a raw 16-bit sample to a height in terrain units.
pub fn sample_to_height(sample: u16) -> f32 {
    sample as f32 / 65536.0 * 256.0 * 0.05 - 2.445
}

/// Square height grid spanning `terrain_dim` terrain units per side.
#[derive(Debug, Clone)]
pub struct Heightfield {
    heights: Vec<f32>,
    side: usize,
    terrain_dim: f32,
}

impl Heightfield {
    /// `samples` holds `HEIGHTMAP_SAMPLES` row-major values (row = z); any
    /// other count is rejected.
    pub fn from_samples(name: &str, samples: &[u16], terrain_dim: f32) -> Result<Self> {
        if samples.len() != HEIGHTMAP_SAMPLES {
            return Err(SceneError::Heightmap {
                name: name.to_string(),
                expected: HEIGHTMAP_SAMPLES,
                found: samples.len(),
            });
        }
        Ok(Self {
            heights: samples.iter().copied().map(sample_to_height).collect(),
            side: HEIGHTMAP_SIDE,
            terrain_dim,
        })
    }

    /// Grid samples per terrain unit.
    fn samples_per_unit(&self) -> f32 {
        self.side as f32 / self.terrain_dim
    }

    pub fn sample(&self, gx: usize, gz: usize) -> f32 {
        self.heights[gx + gz * self.side]
    }

    /// Bilinear height at terrain-space `(x, z)`. Anything outside
    /// `[0, terrain_dim - 2]` on either axis reads as 0.
    pub fn get_height(&self, x: f32, z: f32) -> f32 {
        let limit = self.terrain_dim - 2.0;
        if !(0.0..=limit).contains(&x) || !(0.0..=limit).contains(&z) {
            return 0.0;
        }

        let gx = x * self.samples_per_unit();
        let gz = z * self.samples_per_unit();
        let (x0, z0) = (gx.floor() as usize, gz.floor() as usize);
        let (u, v) = (gx - x0 as f32, gz - z0 as f32);

        let near = self.sample(x0, z0) * (1.0 - u) + self.sample(x0 + 1, z0) * u;
        let far = self.sample(x0, z0 + 1) * (1.0 - u) + self.sample(x0 + 1, z0 + 1) * u;
        near * (1.0 - v) + far * v
    }

    /// Grid mesh over the interior samples, skipping the one-sample border.
    /// Triangles face +Y and are not meant to be reversed.
    pub fn build_mesh(&self) -> MeshData {
        let side = self.side;
        let inner = side - 2;
        let scale = 1.0 / self.samples_per_unit();
        let inv_side = 1.0 / side as f32;

        let mut vertices = Vec::with_capacity(inner * inner);
        for z in 1..side - 1 {
            for x in 1..side - 1 {
                let (fx, fz) = (x as f32, z as f32);
                vertices.push(MeshVertex::new(
                    Vec3::new(fx * scale, self.sample(x, z), fz * scale),
                    Vec3::Y,
                    Vec2::new(fx * inv_side, fz * inv_side),
                ));
            }
        }

        let index = |x: usize, z: usize| (x + z * inner) as u32;
        let mut indices = Vec::with_capacity((inner - 1) * (inner - 1) * 6);
        for z in 1..side - 2 {
            for x in 1..side - 2 {
                indices.extend_from_slice(&[
                    index(x - 1, z - 1),
                    index(x - 1, z),
                    index(x, z - 1),
                    index(x - 1, z),
                    index(x, z),
                    index(x, z - 1),
                ]);
            }
        }

        MeshData { vertices, indices }
    }
}
