//! GPU resources and the per-frame draw path.
//!
//! Everything static is uploaded once at construction: the two meshes, the
//! donut instance buffer, all eight matcap textures, and one bind group per
//! (material, matcap) pair. Per frame only three small uniform buffers are
//! rewritten, so switching a matcap in the panel is just picking a different
//! prebuilt bind group.

use glam::Mat4;
use marquee_assets::{MatcapSet, MatcapSlot, MATCAP_COUNT};
use marquee_common::Transform;
use marquee_geometry::MeshData;
use marquee_scene::{MatcapMaterial, Materials, Scene};
use tracing::{info, warn};
use wgpu::util::DeviceExt;

use crate::camera::OrbitCamera;
use crate::shaders::MATCAP_SHADER;
use crate::texture;

/// Sample count for the multisampled color and depth targets.
pub const MSAA_SAMPLES: u32 = 4;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.016,
    g: 0.016,
    b: 0.02,
    a: 1.0,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
}

impl CameraUniform {
    fn from_camera(camera: &OrbitCamera) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
    tint: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Model matrix columns, one set per drawn instance.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
}

impl InstanceData {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    fn from_transform(transform: &Transform) -> Self {
        let m = transform.matrix().to_cols_array_2d();
        Self {
            model_0: m[0],
            model_1: m[1],
            model_2: m[2],
            model_3: m[3],
        }
    }

    fn identity() -> Self {
        let m = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            model_0: m[0],
            model_1: m[1],
            model_2: m[2],
            model_3: m[3],
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertices = interleave(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// One tint buffer plus a prebuilt bind group for every matcap slot.
struct MaterialBinding {
    buffer: wgpu::Buffer,
    bind_groups: Vec<wgpu::BindGroup>,
}

impl MaterialBinding {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        views: &[wgpu::TextureView],
        sampler: &wgpu::Sampler,
        label: &str,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-tint")),
            contents: bytemuck::bytes_of(&MaterialUniform { tint: [1.0; 4] }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_groups = MatcapSlot::all()
            .map(|slot| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("{label}-{slot}")),
                    layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&views[slot.index()]),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(sampler),
                        },
                    ],
                })
            })
            .collect();
        Self {
            buffer,
            bind_groups,
        }
    }
}

/// Owns every GPU object needed to draw the scene.
pub struct MatcapRenderer {
    fill_pipeline: wgpu::RenderPipeline,
    wire_pipeline: Option<wgpu::RenderPipeline>,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    text_material: MaterialBinding,
    donut_material: MaterialBinding,
    text_mesh: GpuMesh,
    donut_mesh: GpuMesh,
    text_instances: wgpu::Buffer,
    donut_instances: wgpu::Buffer,
    donut_count: u32,
    msaa_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl MatcapRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &Scene,
        matcaps: &MatcapSet,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("matcap-shader"),
            source: wgpu::ShaderSource::Wgsl(MATCAP_SHADER.into()),
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("matcap-pipeline-layout"),
            bind_group_layouts: &[&camera_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let fill_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::PolygonMode::Fill,
            Some(wgpu::Face::Back),
            "matcap-fill-pipeline",
        );

        let wire_pipeline = if device.features().contains(wgpu::Features::POLYGON_MODE_LINE) {
            Some(create_pipeline(
                device,
                &pipeline_layout,
                &shader,
                surface_format,
                wgpu::PolygonMode::Line,
                None,
                "matcap-wire-pipeline",
            ))
        } else {
            warn!("adapter lacks POLYGON_MODE_LINE; wireframe toggles will draw solid");
            None
        };

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera-uniform"),
            contents: bytemuck::bytes_of(&CameraUniform {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                view: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera-bind-group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let sampler = texture::matcap_sampler(device);
        let views: Vec<wgpu::TextureView> = MatcapSlot::all()
            .map(|slot| texture::upload_rgba(device, queue, matcaps.texture(slot), &slot.name()))
            .collect();
        debug_assert_eq!(views.len(), MATCAP_COUNT);

        let text_material = MaterialBinding::new(device, &material_layout, &views, &sampler, "text");
        let donut_material =
            MaterialBinding::new(device, &material_layout, &views, &sampler, "donut");

        let text_mesh = GpuMesh::upload(device, &scene.text_mesh, "text");
        let donut_mesh = GpuMesh::upload(device, &scene.donut_mesh, "donut");

        let text_instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("text-instance"),
            contents: bytemuck::bytes_of(&InstanceData::identity()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // The field never changes after construction, so the instance buffer
        // is written exactly once and carries no COPY_DST usage.
        let donut_data: Vec<InstanceData> = scene
            .donuts
            .iter()
            .map(InstanceData::from_transform)
            .collect();
        let donut_instances = if donut_data.is_empty() {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("donut-instances"),
                contents: bytemuck::bytes_of(&InstanceData::identity()),
                usage: wgpu::BufferUsages::VERTEX,
            })
        } else {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("donut-instances"),
                contents: bytemuck::cast_slice(&donut_data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        let msaa_view = create_msaa_target(device, surface_format, width, height);
        let depth_view = create_depth_texture(device, width, height);

        info!(
            text_indices = text_mesh.index_count,
            donut_indices = donut_mesh.index_count,
            donut_instances = donut_data.len(),
            wireframe = wire_pipeline.is_some(),
            "renderer ready"
        );

        Self {
            fill_pipeline,
            wire_pipeline,
            camera_buffer,
            camera_bind_group,
            text_material,
            donut_material,
            text_mesh,
            donut_mesh,
            text_instances,
            donut_instances,
            donut_count: donut_data.len() as u32,
            msaa_view,
            depth_view,
            surface_format,
        }
    }

    /// Recreate the render targets for a new surface size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.msaa_view = create_msaa_target(device, self.surface_format, width, height);
        self.depth_view = create_depth_texture(device, width, height);
    }

    /// Draw one frame into `surface_view`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
        camera: &OrbitCamera,
        materials: &Materials,
    ) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(camera)),
        );
        queue.write_buffer(
            &self.text_material.buffer,
            0,
            bytemuck::bytes_of(&MaterialUniform {
                tint: materials.text.color.to_linear(),
            }),
        );
        queue.write_buffer(
            &self.donut_material.buffer,
            0,
            bytemuck::bytes_of(&MaterialUniform {
                tint: materials.donut.color.to_linear(),
            }),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene-encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.msaa_view,
                    resolve_target: Some(surface_view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.camera_bind_group, &[]);

            pass.set_pipeline(self.pipeline_for(&materials.text));
            pass.set_bind_group(1, &self.text_material.bind_groups[materials.text.matcap.index()], &[]);
            pass.set_vertex_buffer(0, self.text_mesh.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, self.text_instances.slice(..));
            pass.set_index_buffer(self.text_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.text_mesh.index_count, 0, 0..1);

            if self.donut_count > 0 {
                pass.set_pipeline(self.pipeline_for(&materials.donut));
                pass.set_bind_group(
                    1,
                    &self.donut_material.bind_groups[materials.donut.matcap.index()],
                    &[],
                );
                pass.set_vertex_buffer(0, self.donut_mesh.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.donut_instances.slice(..));
                pass.set_index_buffer(
                    self.donut_mesh.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..self.donut_mesh.index_count, 0, 0..self.donut_count);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// True when wireframe toggles can actually change rasterization.
    pub fn wireframe_available(&self) -> bool {
        self.wire_pipeline.is_some()
    }

    fn pipeline_for(&self, material: &MatcapMaterial) -> &wgpu::RenderPipeline {
        if material.wireframe {
            self.wire_pipeline.as_ref().unwrap_or(&self.fill_pipeline)
        } else {
            &self.fill_pipeline
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    polygon_mode: wgpu::PolygonMode,
    cull_mode: Option<wgpu::Face>,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout(), InstanceData::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            unclipped_depth: false,
            polygon_mode,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: MSAA_SAMPLES,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

fn interleave(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(p, n)| Vertex {
            position: p.to_array(),
            normal: n.to_array(),
        })
        .collect()
}

fn create_msaa_target(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa-color"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: MSAA_SAMPLES,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth-texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: MSAA_SAMPLES,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn uniform_layouts_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 128);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 16);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<InstanceData>(), 64);
    }

    #[test]
    fn instance_data_carries_matrix_columns() {
        let transform = Transform {
            position: Vec3::new(1.0, -2.0, 3.0),
            rotation: Quat::from_rotation_y(0.7),
            scale: Vec3::splat(0.5),
        };
        let instance = InstanceData::from_transform(&transform);
        let rebuilt = Mat4::from_cols_array_2d(&[
            instance.model_0,
            instance.model_1,
            instance.model_2,
            instance.model_3,
        ]);
        assert!(rebuilt.abs_diff_eq(transform.matrix(), 1e-6));
    }

    #[test]
    fn identity_instance_is_identity() {
        let instance = InstanceData::identity();
        let rebuilt = Mat4::from_cols_array_2d(&[
            instance.model_0,
            instance.model_1,
            instance.model_2,
            instance.model_3,
        ]);
        assert_eq!(rebuilt, Mat4::IDENTITY);
    }

    #[test]
    fn interleave_pairs_positions_with_normals() {
        let mesh = MeshData {
            positions: vec![Vec3::X, Vec3::Y],
            normals: vec![Vec3::Z, Vec3::X],
            indices: vec![],
        };
        let vertices = interleave(&mesh);
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[1].position, [0.0, 1.0, 0.0]);
        assert_eq!(vertices[1].normal, [1.0, 0.0, 0.0]);
    }
}
