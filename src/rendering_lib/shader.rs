// src/rendering_lib/shader.rs

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::{Result, SceneError};
use crate::media::AssetSource;

pub const STANDARD: &str = "standard";
pub const SKYBOX: &str = "skybox";
pub const TERRAIN: &str = "terrain";
pub const SHADOW: &str = "shadow";

/// Per-draw uniforms shared by every module. Matches `frame_plan::MatrixBlock`.
const COMMON_WGSL: &str = r#"
struct Matrices {
    world: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    inv_trans_world: mat4x4<f32>,
    light_view: mat4x4<f32>,
    light_projection: mat4x4<f32>,
}

struct CameraData {
    cam_pos: vec4<f32>,
}

struct ColorData {
    color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> matrices: Matrices;
@group(0) @binding(1) var<uniform> camera_data: CameraData;
@group(0) @binding(2) var<uniform> tint: ColorData;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
}
"#;

const LIT_WGSL: &str = r#"
@group(1) @binding(0) var diffuse_tex: texture_2d<f32>;
@group(1) @binding(1) var diffuse_sampler: sampler;
@group(1) @binding(2) var normal_tex: texture_2d<f32>;
@group(2) @binding(0) var shadow_map: texture_2d<f32>;
@group(2) @binding(1) var shadow_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
    @location(3) light_clip: vec4<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = matrices.world * vec4<f32>(in.position, 1.0);
    out.clip_position = matrices.projection * matrices.view * world;
    out.world_pos = world.xyz;
    out.normal = normalize((matrices.inv_trans_world * vec4<f32>(in.normal, 0.0)).xyz);
    out.tex_coord = in.tex_coord;
    out.light_clip = matrices.light_projection * matrices.light_view * world;
    return out;
}

// The light looks along the third row of its view matrix.
fn to_light() -> vec3<f32> {
    let look = vec3<f32>(matrices.light_view[0].z, matrices.light_view[1].z, matrices.light_view[2].z);
    return -normalize(look);
}

fn shadow_factor(light_clip: vec4<f32>, n_dot_l: f32) -> f32 {
    let ndc = light_clip.xyz / light_clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    let stored = textureSampleLevel(shadow_map, shadow_sampler, clamp(uv, vec2<f32>(0.0), vec2<f32>(1.0)), 0.0).r;
    if (any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0)) || ndc.z > 1.0 || stored <= 0.0) {
        return 1.0;
    }
    let bias = max(0.005 * (1.0 - n_dot_l), 0.001);
    if (ndc.z - bias > stored) {
        return 0.35;
    }
    return 1.0;
}

fn shade(albedo: vec4<f32>, normal: vec3<f32>, world_pos: vec3<f32>, light_clip: vec4<f32>) -> vec4<f32> {
    let l = to_light();
    let n_dot_l = max(dot(normal, l), 0.0);
    let v = normalize(camera_data.cam_pos.xyz - world_pos);
    let h = normalize(l + v);
    let specular = pow(max(dot(normal, h), 0.0), 32.0) * 0.2;
    let lit = 0.3 + (n_dot_l + specular) * shadow_factor(light_clip, n_dot_l);
    return vec4<f32>(albedo.rgb * tint.color.rgb * lit, albedo.a * tint.color.a);
}
"#;

const STANDARD_FS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(diffuse_tex, diffuse_sampler, in.tex_coord);
    return shade(albedo, normalize(in.normal), in.world_pos, in.light_clip);
}
"#;

const TERRAIN_FS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(diffuse_tex, diffuse_sampler, in.tex_coord);
    let packed = textureSample(normal_tex, diffuse_sampler, in.tex_coord).xyz * 2.0 - 1.0;
    // Terrain tangent frame: tangent +X, bitangent +Z, normal +Y.
    let local = vec3<f32>(packed.x, packed.z, packed.y);
    let normal = normalize((matrices.inv_trans_world * vec4<f32>(local, 0.0)).xyz);
    return shade(albedo, normal, in.world_pos, in.light_clip);
}
"#;

const SKYBOX_WGSL: &str = r#"
@group(1) @binding(0) var diffuse_tex: texture_2d<f32>;
@group(1) @binding(1) var diffuse_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coord: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let rotation_only = mat4x4<f32>(
        matrices.view[0],
        matrices.view[1],
        matrices.view[2],
        vec4<f32>(0.0, 0.0, 0.0, 1.0),
    );
    let clip = matrices.projection * rotation_only * matrices.world * vec4<f32>(in.position, 1.0);
    out.clip_position = clip.xyww;
    out.tex_coord = in.tex_coord;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(diffuse_tex, diffuse_sampler, in.tex_coord);
}
"#;

const SHADOW_WGSL: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) depth: f32,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let clip = matrices.light_projection * matrices.light_view * matrices.world * vec4<f32>(in.position, 1.0);
    out.clip_position = clip;
    out.depth = clip.z / clip.w;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.depth, 0.0, 0.0, 1.0);
}
"#;

pub fn embedded_source(name: &str) -> Option<String> {
    let body: &[&str] = match name {
        STANDARD => &[LIT_WGSL, STANDARD_FS],
        TERRAIN => &[LIT_WGSL, TERRAIN_FS],
        SKYBOX => &[SKYBOX_WGSL],
        SHADOW => &[SHADOW_WGSL],
        _ => return None,
    };
    let mut source = String::from(COMMON_WGSL);
    body.iter().for_each(|part| source.push_str(part));
    Some(source)
}

/// WGSL modules by logical name. A `<name>.wgsl` media file replaces the
/// built-in module of the same name.
#[derive(Debug, Clone, Default)]
pub struct ShaderLibrary {
    overrides: HashMap<String, String>,
}

impl ShaderLibrary {
    pub fn embedded() -> Self {
        Self::default()
    }

    pub fn load(assets: &dyn AssetSource) -> Result<Self> {
        let mut library = Self::default();
        for name in [STANDARD, SKYBOX, TERRAIN, SHADOW] {
            if let Some(source) = assets.load_text(&format!("{name}.wgsl"))? {
                log::info!("Using {name}.wgsl from media");
                library.overrides.insert(name.to_string(), source);
            }
        }
        Ok(library)
    }

    pub fn source(&self, name: &str) -> Result<Cow<'_, str>> {
        if let Some(source) = self.overrides.get(name) {
            return Ok(Cow::Borrowed(source.as_str()));
        }
        embedded_source(name)
            .map(Cow::Owned)
            .ok_or_else(|| SceneError::ShaderNotFound(name.to_string()))
    }
}
