// This file is part of Nitrogen.
//
// Nitrogen is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Nitrogen is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Nitrogen.  If not, see <http://www.gnu.org/licenses/>.
use crate::{
    atlas::GpuStage,
    clipmap::{mesh::ClipmapMesh, vertex::ClipmapVertex},
    config::TerrainConfig,
};
use anyhow::Result;
use catalog::Catalog;
use gpu::{Gpu, UploadTracker};
use nalgebra::Matrix4;
use shader_shared::{ClipmapBinding, Group};
use static_assertions::{assert_eq_align, assert_eq_size};
use std::{mem, sync::Arc};
use zerocopy::{AsBytes, FromBytes};

/// The dynamic, per-frame uniform block described by the render loop: camera position,
/// MVP, the atlas addressing constants the vertex shader needs to turn world XZ into an
/// atlas UV, and the world extent the full-world mesh spans.
#[repr(C)]
#[derive(AsBytes, FromBytes, Debug, Copy, Clone)]
pub struct ClipmapUniforms {
    camera_world_position: [f32; 3],
    meters_per_texel: f32,
    model_view_projection: [f32; 16],
    min_height: f32,
    max_height: f32,
    stencil_radius: f32,
    blur_radius: f32,
    sun_direction: [f32; 3],
    _pad0: f32,
    wrap_offset: [f32; 2],
    world_min: [f32; 2],
    world_max: [f32; 2],
    atlas_side: f32,
    _pad1: [f32; 3],
}
assert_eq_size!(ClipmapUniforms, [f32; 4 + 16 + 4 + 4 + 2 + 2 + 2 + 4]);
assert_eq_align!(ClipmapUniforms, [f32; 4]);

impl ClipmapUniforms {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        camera_world_position: [f32; 3],
        model_view_projection: &Matrix4<f32>,
        config: &TerrainConfig,
        wrap_offset_tiles: (u32, u32),
        sun_direction: [f32; 3],
    ) -> Self {
        let k = config.atlas_tiles_per_side() as f32;
        let t = config.tile_size as f32 * config.meters_per_texel;
        let mut mvp = [0f32; 16];
        mvp.copy_from_slice(model_view_projection.as_slice());
        Self {
            camera_world_position,
            meters_per_texel: config.meters_per_texel,
            model_view_projection: mvp,
            min_height: config.min_elevation,
            max_height: config.max_elevation,
            stencil_radius: t * (config.prefetch_radius as f32),
            blur_radius: t * (2.0 * config.prefetch_radius as f32),
            sun_direction,
            _pad0: 0.0,
            wrap_offset: [wrap_offset_tiles.0 as f32 / k, wrap_offset_tiles.1 as f32 / k],
            world_min: config.world_min,
            world_max: config.world_max,
            atlas_side: config.heightmap_resolution as f32,
            _pad1: [0.0; 3],
        }
    }
}

/// Builds the nested-ring mesh once, holds the low-res full-world quad, and records the
/// two-draw sequence every frame: full-world fill, then the clipmap proper.
pub struct ClipmapDrawer {
    clipmap_vertex_buffer: wgpu::Buffer,
    clipmap_index_buffer: wgpu::Buffer,
    clipmap_index_count: u32,
    full_vertex_buffer: wgpu::Buffer,
    full_index_buffer: wgpu::Buffer,
    full_index_count: u32,
    uniform_buffer: Arc<wgpu::Buffer>,
    uniforms: ClipmapUniforms,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    full_pipeline: wgpu::RenderPipeline,
    clipmap_pipeline: wgpu::RenderPipeline,
    clipmap_wireframe_pipeline: wgpu::RenderPipeline,
}

impl ClipmapDrawer {
    pub fn new(
        gpu: &Gpu,
        catalog: &Catalog,
        config: &TerrainConfig,
        globals_bind_group_layout: &wgpu::BindGroupLayout,
        stage: &GpuStage,
    ) -> Result<Self> {
        let device = gpu.device();

        let mesh = ClipmapMesh::build(config.mesh_levels, config.mesh_base_lod_extent_texels);
        let clipmap_vertex_buffer = Self::upload_vertices(gpu, "terrain-clipmap-vertices", &mesh.vertices);
        let clipmap_index_buffer = Self::upload_indices(gpu, "terrain-clipmap-indices", &mesh.indices);
        let clipmap_index_count = mesh.indices.len() as u32;

        let full = Self::build_full_world_quad(config);
        let full_vertex_buffer = Self::upload_vertices(gpu, "terrain-clipmap-full-vertices", &full.vertices);
        let full_index_buffer = Self::upload_indices(gpu, "terrain-clipmap-full-indices", &full.indices);
        let full_index_count = full.indices.len() as u32;

        let uniforms = ClipmapUniforms::new(
            [0.0, 0.0, 0.0],
            &Matrix4::identity(),
            config,
            (0, 0),
            [0.0, -1.0, 0.0],
        );
        let uniform_buffer = Arc::new(gpu.push_data(
            "terrain-clipmap-uniform",
            &uniforms,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        ));

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain-clipmap-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: ClipmapBinding::LinearClampSampler.index(),
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: ClipmapBinding::ActiveHeightmap.index(),
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: ClipmapBinding::Noise.index(),
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: ClipmapBinding::DiffuseGrass.index(),
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: ClipmapBinding::LinearWrapSampler.index(),
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: ClipmapBinding::FullWorldHeightmap.index(),
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 6,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = Self::make_bind_group(device, &bind_group_layout, stage, &uniform_buffer, 0);

        let clipmap_shader_src = catalog.read_name_sync("terrain_clipmap.vert.spirv")?;
        let clipmap_frag_src = catalog.read_name_sync("terrain_clipmap.frag.spirv")?;
        let full_shader_src = catalog.read_name_sync("terrain_full.vert.spirv")?;
        let full_frag_src = catalog.read_name_sync("terrain_full.frag.spirv")?;
        let wireframe_frag_src = catalog.read_name_sync("terrain_clipmap_wireframe.frag.spirv")?;

        let clipmap_vert_module = gpu.create_shader_module("terrain-clipmap.vert", &clipmap_shader_src)?;
        let clipmap_frag_module = gpu.create_shader_module("terrain-clipmap.frag", &clipmap_frag_src)?;
        let full_vert_module = gpu.create_shader_module("terrain-full.vert", &full_shader_src)?;
        let full_frag_module = gpu.create_shader_module("terrain-full.frag", &full_frag_src)?;
        let wireframe_module = gpu.create_shader_module("terrain-clipmap-wireframe.frag", &wireframe_frag_src)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain-clipmap-pipeline-layout"),
            bind_group_layouts: &[globals_bind_group_layout, &bind_group_layout],
            push_constant_ranges: &[],
        });

        let primitive = wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        };
        let depth_stencil = Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Greater,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });
        let multisample = wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        };

        let full_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("terrain-full-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &full_vert_module,
                entry_point: "main",
                buffers: &[ClipmapVertex::descriptor()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &full_frag_module,
                entry_point: "main",
                targets: &[wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba32Float,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                }],
            }),
            primitive,
            depth_stencil: depth_stencil.clone(),
            multisample,
            multiview: None,
        });

        let clipmap_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("terrain-clipmap-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &clipmap_vert_module,
                entry_point: "main",
                buffers: &[ClipmapVertex::descriptor()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &clipmap_frag_module,
                entry_point: "main",
                targets: &[wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba32Float,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                }],
            }),
            primitive,
            depth_stencil: depth_stencil.clone(),
            multisample,
            multiview: None,
        });

        let clipmap_wireframe_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("terrain-clipmap-wireframe-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &clipmap_vert_module,
                entry_point: "main",
                buffers: &[ClipmapVertex::descriptor()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &wireframe_module,
                entry_point: "main",
                targets: &[wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba32Float,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                }],
            }),
            primitive: wgpu::PrimitiveState {
                polygon_mode: wgpu::PolygonMode::Line,
                ..primitive
            },
            depth_stencil,
            multisample,
            multiview: None,
        });

        Ok(Self {
            clipmap_vertex_buffer,
            clipmap_index_buffer,
            clipmap_index_count,
            full_vertex_buffer,
            full_index_buffer,
            full_index_count,
            uniform_buffer,
            uniforms,
            bind_group_layout,
            bind_group,
            full_pipeline,
            clipmap_pipeline,
            clipmap_wireframe_pipeline,
        })
    }

    fn upload_vertices(gpu: &Gpu, label: &'static str, vertices: &[ClipmapVertex]) -> wgpu::Buffer {
        gpu.push_slice(label, vertices, wgpu::BufferUsages::VERTEX)
    }

    fn upload_indices(gpu: &Gpu, label: &'static str, indices: &[u32]) -> wgpu::Buffer {
        gpu.push_slice(label, indices, wgpu::BufferUsages::INDEX)
    }

    fn build_full_world_quad(config: &TerrainConfig) -> FullWorldMesh {
        let [x0, z0] = config.world_min;
        let [x1, z1] = config.world_max;
        let vertices = vec![
            ClipmapVertex::new(x0, 0.0, z0),
            ClipmapVertex::new(x1, 0.0, z0),
            ClipmapVertex::new(x1, 0.0, z1),
            ClipmapVertex::new(x0, 0.0, z1),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        FullWorldMesh { vertices, indices }
    }

    fn make_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stage: &GpuStage,
        uniform_buffer: &wgpu::Buffer,
        mip: u32,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain-clipmap-bind-group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: ClipmapBinding::LinearClampSampler.index(),
                    resource: wgpu::BindingResource::Sampler(stage.sampler_linear_clamp()),
                },
                wgpu::BindGroupEntry {
                    binding: ClipmapBinding::ActiveHeightmap.index(),
                    resource: wgpu::BindingResource::TextureView(stage.active_view(mip)),
                },
                wgpu::BindGroupEntry {
                    binding: ClipmapBinding::Noise.index(),
                    resource: wgpu::BindingResource::TextureView(stage.full_world_view()),
                },
                wgpu::BindGroupEntry {
                    binding: ClipmapBinding::DiffuseGrass.index(),
                    resource: wgpu::BindingResource::TextureView(stage.full_world_view()),
                },
                wgpu::BindGroupEntry {
                    binding: ClipmapBinding::LinearWrapSampler.index(),
                    resource: wgpu::BindingResource::Sampler(stage.sampler_linear_wrap()),
                },
                wgpu::BindGroupEntry {
                    binding: ClipmapBinding::FullWorldHeightmap.index(),
                    resource: wgpu::BindingResource::TextureView(stage.full_world_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Re-derives the clipmap bind group against this frame's active atlas texture. The
    /// atlas triple-buffers, so the view it points at changes every frame.
    pub fn rebind_active_atlas(&mut self, gpu: &Gpu, stage: &GpuStage) {
        self.bind_group = Self::make_bind_group(
            gpu.device(),
            &self.bind_group_layout,
            stage,
            &self.uniform_buffer,
            0,
        );
    }

    pub fn update_uniforms(&mut self, gpu: &Gpu, tracker: &UploadTracker, uniforms: ClipmapUniforms) {
        self.uniforms = uniforms;
        gpu.upload_slice_to(
            "terrain-clipmap-uniform-upload",
            std::slice::from_ref(&self.uniforms),
            self.uniform_buffer.clone(),
            tracker,
        );
    }

    /// Full-world fill first (covers the world outside the clipmap's footprint), then the
    /// nested-ring clipmap proper, indexed, over the same bind group.
    pub fn draw<'a>(
        &'a self,
        mut rpass: wgpu::RenderPass<'a>,
        globals_bind_group: &'a wgpu::BindGroup,
        wireframe: bool,
    ) -> wgpu::RenderPass<'a> {
        rpass.set_pipeline(&self.full_pipeline);
        rpass.set_bind_group(Group::Globals.index(), globals_bind_group, &[]);
        rpass.set_bind_group(Group::TerrainClipmap.index(), &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.full_vertex_buffer.slice(..));
        rpass.set_index_buffer(self.full_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.full_index_count, 0, 0..1);

        rpass.set_pipeline(if wireframe {
            &self.clipmap_wireframe_pipeline
        } else {
            &self.clipmap_pipeline
        });
        rpass.set_bind_group(Group::Globals.index(), globals_bind_group, &[]);
        rpass.set_bind_group(Group::TerrainClipmap.index(), &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.clipmap_vertex_buffer.slice(..));
        rpass.set_index_buffer(self.clipmap_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.clipmap_index_count, 0, 0..1);

        rpass
    }
}

struct FullWorldMesh {
    vertices: Vec<ClipmapVertex>,
    indices: Vec<u32>,
}

#[allow(dead_code)]
fn assert_mem_layout() {
    assert_eq!(mem::size_of::<ClipmapUniforms>() % 16, 0);
}
