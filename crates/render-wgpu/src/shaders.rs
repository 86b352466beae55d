//! WGSL shader sources, embedded as constants.

/// Matcap shading for instanced meshes.
///
/// The normal is carried into view space and its xy components index the
/// matcap texture directly, so all lighting is baked into the image. The
/// 0.495 scale keeps the lookup just inside the texture border, and v is
/// flipped because texture space puts v=0 at the top while view space puts
/// +y up.
pub const MATCAP_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

struct Material {
    tint: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> material: Material;
@group(1) @binding(1)
var matcap_texture: texture_2d<f32>;
@group(1) @binding(2)
var matcap_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );

    let world_position = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = camera.view_proj * world_position;
    out.view_normal = (camera.view * vec4<f32>(world_normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.view_normal);
    let uv = vec2<f32>(n.x, -n.y) * 0.495 + vec2<f32>(0.5, 0.5);
    let sampled = textureSample(matcap_texture, matcap_sampler, uv);
    return vec4<f32>(sampled.rgb * material.tint.rgb, material.tint.a);
}
"#;
