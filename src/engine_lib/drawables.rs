// src/engine_lib/drawables.rs
//! Builders for the fixed set of composite drawables the scene uses.

use std::collections::HashMap;
use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::engine_lib::primitives::{self, MeshData, DEFAULT_ROUND_TESSELLATION, DEFAULT_SPHERE_TESSELLATION};
use crate::engine_lib::scene_types::{CompositeDrawable, DrawableKind, DrawableModel};
use crate::engine_lib::terrain::{Heightfield, HEIGHTMAP_SAMPLES};
use crate::error::Result;
use crate::media::AssetSource;
use crate::rendering_lib::backend::{GpuBackend, TextureHandle};

/// Device and media access shared by every builder during one setup.
pub struct BuildContext<'a> {
    pub backend: &'a mut dyn GpuBackend,
    pub assets: &'a dyn AssetSource,
    textures: HashMap<(String, bool), TextureHandle>,
}

impl<'a> BuildContext<'a> {
    pub fn new(backend: &'a mut dyn GpuBackend, assets: &'a dyn AssetSource) -> Self {
        Self {
            backend,
            assets,
            textures: HashMap::new(),
        }
    }

    /// Each file is uploaded once per context.
    pub fn texture(&mut self, name: &str, srgb: bool) -> Result<TextureHandle> {
        if let Some(handle) = self.textures.get(&(name.to_string(), srgb)) {
            return Ok(*handle);
        }
        let image = self.assets.load_image(name)?;
        let handle = self.backend.upload_texture(name, &image, srgb)?;
        log::debug!("Uploaded texture {name} ({}x{})", image.width, image.height);
        self.textures.insert((name.to_string(), srgb), handle);
        Ok(handle)
    }

    pub fn add_part(&mut self, composite: &mut CompositeDrawable, part: PartSpec<'_>) -> Result<()> {
        let mesh = self
            .backend
            .upload_mesh(part.name, &part.mesh.vertices, &part.mesh.indices)?;
        let texture = part.texture.map(|name| self.texture(name, true)).transpose()?;
        let normal_map = part.normal_map.map(|name| self.texture(name, false)).transpose()?;
        let material = if texture.is_some() || normal_map.is_some() {
            Some(self.backend.create_material(texture, normal_map)?)
        } else {
            None
        };

        composite.parts.push(DrawableModel {
            name: part.name.to_string(),
            mesh,
            index_count: part.mesh.indices.len() as u32,
            material,
            has_normal_map: normal_map.is_some(),
            model: part.model,
            color: part.color,
        });
        Ok(())
    }
}

pub struct PartSpec<'a> {
    pub name: &'a str,
    pub mesh: MeshData,
    pub model: Mat4,
    pub color: Vec4,
    pub texture: Option<&'a str>,
    pub normal_map: Option<&'a str>,
}

/// Something that turns itself into GPU-resident parts, once per device.
pub trait Buildable {
    fn create(&self, ctx: &mut BuildContext<'_>) -> Result<CompositeDrawable>;
}

/// Scale, then rotate, then translate.
pub fn srt(scale: Vec3, rotation: Quat, translation: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

fn rgba(r: f32, g: f32, b: f32) -> Vec4 {
    Vec4::new(r, g, b, 1.0)
}

#[derive(Debug, Clone)]
pub struct TerrainBuilder {
    pub heightmap: String,
    pub texture: String,
    pub normal_map: String,
    pub terrain_dim: f32,
    pub model_scale: f32,
}

impl Default for TerrainBuilder {
    fn default() -> Self {
        Self {
            heightmap: "terrainHM.r16".into(),
            texture: "terrainTex.jpg".into(),
            normal_map: "terrainNormalMap.jpg".into(),
            terrain_dim: 16.0,
            model_scale: 10.0,
        }
    }
}

impl Buildable for TerrainBuilder {
    fn create(&self, ctx: &mut BuildContext<'_>) -> Result<CompositeDrawable> {
        let samples = ctx.assets.load_heightmap(&self.heightmap, HEIGHTMAP_SAMPLES)?;
        log::info!("Building terrain from {}", self.heightmap);
        let heightfield = Heightfield::from_samples(&self.heightmap, &samples, self.terrain_dim)?;

        let mut composite = CompositeDrawable::new(DrawableKind::Terrain);
        ctx.add_part(
            &mut composite,
            PartSpec {
                name: "terrain",
                mesh: heightfield.build_mesh(),
                model: Mat4::from_scale(Vec3::splat(self.model_scale)),
                color: rgba(0.9, 0.9, 0.9),
                texture: Some(&self.texture),
                normal_map: Some(&self.normal_map),
            },
        )?;
        composite.heightfield = Some(heightfield);
        Ok(composite)
    }
}

/// Atlas coordinates for the 24 cube vertices, four per face in cube order.
pub fn skybox_tex_coords() -> [Vec2; 24] {
    let e = 0.001f32 as f64;
    let third = |k: f64| k / 3.0;
    let uv = |u: f64, v: f64| Vec2::new(u as f32, v as f32);
    [
        uv(0.5, third(1.0) + e),
        uv(0.5, third(2.0)),
        uv(0.25, third(2.0)),
        uv(0.25, third(1.0) + e),
        uv(1.0, third(1.0) + e),
        uv(1.0, third(2.0)),
        uv(0.75, third(2.0)),
        uv(0.75, third(1.0) + e),
        uv(0.75, third(1.0) + e),
        uv(0.75, third(2.0)),
        uv(0.5, third(2.0)),
        uv(0.5, third(1.0) + e),
        uv(0.25, third(1.0) + e),
        uv(0.25, third(2.0)),
        uv(0.0, third(2.0)),
        uv(0.0, third(1.0) + e),
        uv(0.25 + e, third(1.0)),
        uv(0.25 + e, 0.0),
        uv(0.5 - e, 0.0),
        uv(0.5 - e, third(1.0)),
        uv(0.5, third(2.0)),
        uv(0.5, 1.0),
        uv(0.25, 1.0),
        uv(0.25, third(2.0)),
    ]
}

#[derive(Debug, Clone)]
pub struct SkyboxBuilder {
    pub texture: String,
}

impl Default for SkyboxBuilder {
    fn default() -> Self {
        Self {
            texture: "skybox.jpg".into(),
        }
    }
}

impl Buildable for SkyboxBuilder {
    fn create(&self, ctx: &mut BuildContext<'_>) -> Result<CompositeDrawable> {
        // Seen from inside and drawn without culling, so the winding stays as generated.
        let mut mesh = primitives::cube(1.0);
        for (vertex, uv) in mesh.vertices.iter_mut().zip(skybox_tex_coords()) {
            vertex.tex_coord = uv.to_array();
        }

        let mut composite = CompositeDrawable::new(DrawableKind::Skybox);
        ctx.add_part(
            &mut composite,
            PartSpec {
                name: "skybox",
                mesh,
                model: Mat4::IDENTITY,
                color: rgba(0.7, 0.7, 0.2),
                texture: Some(&self.texture),
                normal_map: None,
            },
        )?;
        Ok(composite)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SnowManBuilder;

impl Buildable for SnowManBuilder {
    fn create(&self, ctx: &mut BuildContext<'_>) -> Result<CompositeDrawable> {
        let sphere = primitives::sphere(1.0, DEFAULT_SPHERE_TESSELLATION).reversed();
        let low_sphere = primitives::sphere(1.0, 5).reversed();
        let cone = primitives::cone(1.0, 1.0, DEFAULT_ROUND_TESSELLATION).reversed();
        let cylinder = primitives::cylinder(1.0, 1.0, DEFAULT_ROUND_TESSELLATION).reversed();

        let skin = rgba(0.9, 0.7, 0.4);
        let coal = rgba(0.1, 0.1, 0.1);
        let twig = rgba(0.2, 0.2, 0.2);
        let hat = rgba(0.2, 0.3, 0.4);
        let none = Quat::IDENTITY;

        let parts = [
            ("head", &sphere, Vec3::splat(0.6), none, Vec3::new(0.0, 1.25, 0.0), skin, "snowManTex.jpg"),
            ("body", &sphere, Vec3::new(1.0, 1.1, 1.0), none, Vec3::new(0.0, 0.55, 0.0), skin, "snowManTex.jpg"),
            ("left_eye", &sphere, Vec3::splat(0.1), none, Vec3::new(-0.11, 1.37, -0.23), coal, "eye.jpg"),
            ("right_eye", &sphere, Vec3::splat(0.1), none, Vec3::new(0.11, 1.37, -0.23), coal, "eye.jpg"),
            (
                "nose",
                &cone,
                Vec3::new(0.2, 0.4, 0.2),
                Quat::from_rotation_x(-PI * 0.5),
                Vec3::new(0.0, 1.25, -0.29),
                rgba(0.85, 0.2, 0.2),
                "red.jpg",
            ),
            (
                "left_arm",
                &cylinder,
                Vec3::new(0.075, 0.85, 0.075),
                Quat::from_rotation_z(PI * 0.35),
                Vec3::new(-0.35, 0.85, 0.0),
                twig,
                "blackTree.jpg",
            ),
            (
                "right_arm",
                &cylinder,
                Vec3::new(0.075, 0.85, 0.075),
                Quat::from_rotation_z(-PI * 0.35),
                Vec3::new(0.35, 0.85, 0.0),
                twig,
                "blackTree.jpg",
            ),
            ("left_hand", &low_sphere, Vec3::splat(0.15), none, Vec3::new(-0.775, 1.055, 0.0), twig, "red.jpg"),
            ("right_hand", &low_sphere, Vec3::splat(0.15), none, Vec3::new(0.775, 1.065, 0.0), twig, "red.jpg"),
            ("hat_crown", &cylinder, Vec3::new(0.4, 0.15, 0.4), none, Vec3::new(0.0, 1.575, 0.0), hat, "blackleather.jpg"),
            ("hat_brim", &cylinder, Vec3::new(0.5, 0.04, 0.5), none, Vec3::new(0.0, 1.5, 0.0), hat, "blackleather.jpg"),
        ];

        let mut composite = CompositeDrawable::new(DrawableKind::SnowMan);
        for (name, mesh, scale, rotation, translation, color, texture) in parts {
            ctx.add_part(
                &mut composite,
                PartSpec {
                    name,
                    mesh: mesh.clone(),
                    model: srt(scale, rotation, translation),
                    color,
                    texture: Some(texture),
                    normal_map: None,
                },
            )?;
        }
        Ok(composite)
    }
}

#[derive(Debug, Clone)]
pub struct CrateBoxBuilder {
    pub texture: String,
}

impl Default for CrateBoxBuilder {
    fn default() -> Self {
        Self {
            texture: "box.jpg".into(),
        }
    }
}

impl Buildable for CrateBoxBuilder {
    fn create(&self, ctx: &mut BuildContext<'_>) -> Result<CompositeDrawable> {
        let mut composite = CompositeDrawable::new(DrawableKind::CrateBox);
        ctx.add_part(
            &mut composite,
            PartSpec {
                name: "box",
                mesh: primitives::cube(1.0).reversed(),
                model: Mat4::IDENTITY,
                color: rgba(0.7, 0.7, 0.2),
                texture: Some(&self.texture),
                normal_map: None,
            },
        )?;
        Ok(composite)
    }
}

/// Builds any of the known drawable kinds with default media names.
pub fn build(kind: DrawableKind, ctx: &mut BuildContext<'_>) -> Result<CompositeDrawable> {
    let composite = match kind {
        DrawableKind::Terrain => TerrainBuilder::default().create(ctx),
        DrawableKind::Skybox => SkyboxBuilder::default().create(ctx),
        DrawableKind::SnowMan => SnowManBuilder.create(ctx),
        DrawableKind::CrateBox => CrateBoxBuilder::default().create(ctx),
    }?;
    log::debug!("Built {:?} from {} parts", composite.kind, composite.parts.len());
    Ok(composite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{LoadedImage, MemoryAssets};
    use crate::rendering_lib::backend::RecordingBackend;

    #[test]
    fn snowman_has_eleven_textured_parts() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut ctx = BuildContext::new(&mut backend, &assets);
        let snowman = SnowManBuilder.create(&mut ctx).unwrap();
        drop(ctx);

        assert_eq!(snowman.parts.len(), 11);
        assert!(snowman.parts.iter().all(|p| p.material.is_some()));
        // Five distinct texture files, each uploaded once.
        assert_eq!(backend.textures.len(), 5);
    }

    #[test]
    fn part_transform_scales_before_translating() {
        let m = srt(Vec3::splat(0.6), Quat::IDENTITY, Vec3::new(0.0, 1.25, 0.0));
        let top = m.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert!((top.y - 1.55).abs() < 1e-6);
    }

    #[test]
    fn skybox_keeps_cube_winding_and_atlas() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut ctx = BuildContext::new(&mut backend, &assets);
        let skybox = SkyboxBuilder::default().create(&mut ctx).unwrap();
        drop(ctx);

        let uploaded = backend.mesh(skybox.parts[0].mesh).unwrap();
        assert_eq!(uploaded.indices, primitives::cube(1.0).indices);
        assert_eq!(uploaded.vertices[0].tex_coord, [0.5, (1.0f64 / 3.0 + 0.001f32 as f64) as f32]);
        assert_eq!(uploaded.vertices[18].tex_coord, [(0.5 - 0.001f32 as f64) as f32, 0.0]);
        assert_eq!(uploaded.vertices[21].tex_coord, [0.5, 1.0]);
    }

    #[test]
    fn crate_box_is_reversed() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut ctx = BuildContext::new(&mut backend, &assets);
        let crate_box = CrateBoxBuilder::default().create(&mut ctx).unwrap();
        drop(ctx);

        let uploaded = backend.mesh(crate_box.parts[0].mesh).unwrap();
        assert_eq!(&uploaded.indices[..3], &[23, 22, 20]);
    }

    const SCENE_IMAGES: [&str; 9] = [
        "skybox.jpg",
        "terrainTex.jpg",
        "terrainNormalMap.jpg",
        "snowManTex.jpg",
        "eye.jpg",
        "red.jpg",
        "blackTree.jpg",
        "blackleather.jpg",
        "box.jpg",
    ];

    #[test]
    fn every_kind_builds_from_complete_strict_media() {
        let mut assets = SCENE_IMAGES
            .iter()
            .fold(MemoryAssets::new(), |assets, name| {
                assets.with_image(name, LoadedImage::solid(2, 2, [90, 90, 90, 255]))
            })
            .with_heightmap("terrainHM.r16", vec![0; HEIGHTMAP_SAMPLES]);
        assets.strict = true;

        let mut backend = RecordingBackend::new();
        let mut ctx = BuildContext::new(&mut backend, &assets);
        for kind in [DrawableKind::Skybox, DrawableKind::Terrain, DrawableKind::SnowMan, DrawableKind::CrateBox] {
            let composite = build(kind, &mut ctx).unwrap();
            assert_eq!(composite.kind, kind);
            assert_eq!(composite.heightfield.is_some(), kind == DrawableKind::Terrain);
        }
        drop(ctx);
        assert_eq!(backend.textures.len(), SCENE_IMAGES.len());
    }

    #[test]
    fn short_heightmap_fails_terrain() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new().with_heightmap("terrainHM.r16", vec![0; 10]);
        let mut ctx = BuildContext::new(&mut backend, &assets);
        assert!(matches!(
            TerrainBuilder::default().create(&mut ctx),
            Err(crate::error::SceneError::Heightmap { found: 10, .. })
        ));
    }

    #[test]
    fn terrain_owns_heightfield_and_normal_map() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new().with_heightmap("terrainHM.r16", vec![32768; HEIGHTMAP_SAMPLES]);
        let mut ctx = BuildContext::new(&mut backend, &assets);
        let terrain = TerrainBuilder::default().create(&mut ctx).unwrap();
        drop(ctx);

        assert!(terrain.parts[0].has_normal_map);
        let expected = crate::engine_lib::terrain::sample_to_height(32768);
        assert_eq!(terrain.get_height(1.0, 1.0), expected);
        assert_eq!(terrain.get_height(-96.0, -96.0), 0.0);
        assert_eq!(backend.materials[0], (Some(TextureHandle(0)), Some(TextureHandle(1))));
    }
}
