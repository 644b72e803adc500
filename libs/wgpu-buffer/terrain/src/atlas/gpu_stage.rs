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
use crate::atlas::packer::AtlasSlot;
use crate::config::TerrainConfig;
use anyhow::Result;
use catalog::Catalog;
use gpu::Gpu;

const FRAMES_IN_FLIGHT: usize = 3;
const PREPROCESS_WORKGROUP: u32 = 8;

/// GPU-side resources for one terrain atlas: the raw upload target, the post-processed
/// (normals + height) texture with its mip chain, the triple-buffered texture the render
/// loop actually samples, and the low-resolution full-world texture.
pub struct GpuStage {
    h: u32,
    mip_count: u32,
    raw: wgpu::Texture,
    raw_view: wgpu::TextureView,
    processed: wgpu::Texture,
    processed_views: Vec<wgpu::TextureView>,
    active: [wgpu::Texture; FRAMES_IN_FLIGHT],
    active_views: Vec<Vec<wgpu::TextureView>>,
    full_world: wgpu::Texture,
    full_world_view: wgpu::TextureView,
    mip_scratch: wgpu::Texture,
    preprocess_pipeline: wgpu::ComputePipeline,
    mip_pipeline: wgpu::ComputePipeline,
    preprocess_bind_group_layout: wgpu::BindGroupLayout,
    mip_bind_group_layout: wgpu::BindGroupLayout,
    sampler_linear_clamp: wgpu::Sampler,
    sampler_linear_wrap: wgpu::Sampler,
    frame_index: usize,
}

const PROCESSED_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
const RAW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R16Uint;

impl GpuStage {
    pub fn new(gpu: &Gpu, config: &TerrainConfig, catalog: &Catalog) -> Result<Self> {
        let h = config.heightmap_resolution;
        let mip_count = (h as f32).log2().floor() as u32 + 1;
        let device = gpu.device();

        let raw = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("terrain-atlas-raw"),
            size: wgpu::Extent3d {
                width: h,
                height: h,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: RAW_FORMAT,
            usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
        });
        let raw_view = raw.create_view(&wgpu::TextureViewDescriptor::default());

        let processed = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("terrain-atlas-processed"),
            size: wgpu::Extent3d {
                width: h,
                height: h,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PROCESSED_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
        });
        let processed_views = (0..mip_count)
            .map(|m| {
                processed.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("terrain-atlas-processed-mip-view"),
                    base_mip_level: m,
                    mip_level_count: Some(1),
                    ..wgpu::TextureViewDescriptor::default()
                })
            })
            .collect();

        // One image the mip-build compute pass writes into before it is blit-copied into
        // `processed[m]`; the target mip cannot be simultaneously read and written.
        let mip_scratch = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("terrain-atlas-mip-scratch"),
            size: wgpu::Extent3d {
                width: h,
                height: h,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PROCESSED_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        });

        let active: [wgpu::Texture; FRAMES_IN_FLIGHT] = std::array::from_fn(|_| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("terrain-atlas-active"),
                size: wgpu::Extent3d {
                    width: h,
                    height: h,
                    depth_or_array_layers: 1,
                },
                mip_level_count: mip_count,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: PROCESSED_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            })
        });
        let active_views = active
            .iter()
            .map(|tex| {
                (0..mip_count)
                    .map(|m| {
                        tex.create_view(&wgpu::TextureViewDescriptor {
                            label: Some("terrain-atlas-active-mip-view"),
                            base_mip_level: m,
                            mip_level_count: Some(1),
                            ..wgpu::TextureViewDescriptor::default()
                        })
                    })
                    .collect()
            })
            .collect();

        let full_world = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("terrain-atlas-full-world"),
            size: wgpu::Extent3d {
                width: h,
                height: h,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PROCESSED_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
        });
        let full_world_view = full_world.create_view(&wgpu::TextureViewDescriptor::default());

        let preprocess_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("terrain-preprocess-bind-group-layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Uint,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::StorageTexture {
                            access: wgpu::StorageTextureAccess::WriteOnly,
                            format: PROCESSED_FORMAT,
                            view_dimension: wgpu::TextureViewDimension::D2,
                        },
                        count: None,
                    },
                ],
            });

        let mip_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain-mip-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: PROCESSED_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let preprocess_shader = catalog.read_name_sync("terrain_preprocess.comp.spirv")?;
        let mip_shader = catalog.read_name_sync("terrain_mip_build.comp.spirv")?;
        let preprocess_module = gpu.create_shader_module("terrain-preprocess", &preprocess_shader)?;
        let mip_module = gpu.create_shader_module("terrain-mip-build", &mip_shader)?;

        let preprocess_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain-preprocess-pipeline-layout"),
            bind_group_layouts: &[&preprocess_bind_group_layout],
            push_constant_ranges: &[],
        });
        let preprocess_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("terrain-preprocess-pipeline"),
            layout: Some(&preprocess_pipeline_layout),
            module: &preprocess_module,
            entry_point: "main",
        });

        let mip_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain-mip-build-pipeline-layout"),
            bind_group_layouts: &[&mip_bind_group_layout],
            push_constant_ranges: &[],
        });
        let mip_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("terrain-mip-build-pipeline"),
            layout: Some(&mip_pipeline_layout),
            module: &mip_module,
            entry_point: "main",
        });

        let sampler_linear_clamp = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("terrain-sampler-linear-clamp"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..wgpu::SamplerDescriptor::default()
        });
        let sampler_linear_wrap = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("terrain-sampler-linear-wrap"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..wgpu::SamplerDescriptor::default()
        });

        Ok(Self {
            h,
            mip_count,
            raw,
            raw_view,
            processed,
            processed_views,
            active,
            active_views,
            full_world,
            full_world_view,
            mip_scratch,
            preprocess_pipeline,
            mip_pipeline,
            preprocess_bind_group_layout,
            mip_bind_group_layout,
            sampler_linear_clamp,
            sampler_linear_wrap,
            frame_index: 0,
        })
    }

    /// Stage 1: buffer->texture copies from staging into `raw`, one per tile whose flags
    /// say `Uploaded` but not `Processed`. Barriers are implicit in wgpu's automatic
    /// resource tracking; we still separate the encoder scope to document the ordering.
    pub fn record_raw_upload(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        uploads: &[(AtlasSlot, wgpu::Buffer)],
        tile_size: u32,
    ) {
        for (slot, staging_buffer) in uploads {
            let (ox, oy) = slot.offset_px(tile_size);
            encoder.copy_buffer_to_texture(
                wgpu::ImageCopyBuffer {
                    buffer: staging_buffer,
                    layout: wgpu::ImageDataLayout {
                        offset: 0,
                        bytes_per_row: std::num::NonZeroU32::new(tile_size * 2),
                        rows_per_image: std::num::NonZeroU32::new(tile_size),
                    },
                },
                wgpu::ImageCopyTexture {
                    texture: &self.raw,
                    mip_level: 0,
                    origin: wgpu::Origin3d { x: ox, y: oy, z: 0 },
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::Extent3d {
                    width: tile_size,
                    height: tile_size,
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    /// Stage 2: decode raw height and compute normals with toroidal neighbor wrap. Dispatched
    /// over the whole atlas (`h/8` workgroups per side) rather than one tile's worth, since
    /// any number of non-adjacent slots may have gone `Uploaded` this frame and the pipeline
    /// carries no per-slot offset to aim a smaller dispatch at just those texels; re-deriving
    /// normals for texels whose raw bytes did not change this frame is redundant but harmless.
    pub fn record_heightfield_preprocess(&self, encoder: &mut wgpu::CommandEncoder, device: &wgpu::Device) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain-preprocess-bind-group"),
            layout: &self.preprocess_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.raw_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&self.processed_views[0]),
                },
            ],
        });
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("terrain-preprocess-pass"),
        });
        cpass.set_pipeline(&self.preprocess_pipeline);
        cpass.set_bind_group(0, &bind_group, &[]);
        let side = (self.h / PREPROCESS_WORKGROUP).max(1);
        cpass.dispatch(side, side, 1);
    }

    /// Stage 3: for each mip `1..mipCount`, compute from `mip - 1` into the scratch target,
    /// then blit-copy the scratch into `processed[mip]`.
    pub fn record_mip_chain(&self, encoder: &mut wgpu::CommandEncoder, device: &wgpu::Device) {
        let scratch_view = self.mip_scratch.create_view(&wgpu::TextureViewDescriptor::default());
        for m in 1..self.mip_count {
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("terrain-mip-bind-group"),
                layout: &self.mip_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&self.processed_views[(m - 1) as usize]),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler_linear_clamp),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&scratch_view),
                    },
                ],
            });
            {
                let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("terrain-mip-build-pass"),
                });
                cpass.set_pipeline(&self.mip_pipeline);
                cpass.set_bind_group(0, &bind_group, &[]);
                let side = self.h >> m;
                cpass.dispatch((side / 8).max(1), (side / 8).max(1), 1);
            }
            encoder.copy_texture_to_texture(
                wgpu::ImageCopyTexture {
                    texture: &self.mip_scratch,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::ImageCopyTexture {
                    texture: &self.processed,
                    mip_level: m,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::Extent3d {
                    width: (self.h >> m).max(1),
                    height: (self.h >> m).max(1),
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    /// Stage 4: copy every mip of `processed` into the frame-in-flight active texture the
    /// render pass will sample this frame.
    pub fn record_active_swap(&self, encoder: &mut wgpu::CommandEncoder) {
        let target = &self.active[self.frame_index];
        for m in 0..self.mip_count {
            let side = (self.h >> m).max(1);
            encoder.copy_texture_to_texture(
                wgpu::ImageCopyTexture {
                    texture: &self.processed,
                    mip_level: m,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::ImageCopyTexture {
                    texture: target,
                    mip_level: m,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::Extent3d {
                    width: side,
                    height: side,
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    pub fn advance_frame(&mut self) {
        self.frame_index = (self.frame_index + 1) % FRAMES_IN_FLIGHT;
    }

    pub fn active_view(&self, mip: u32) -> &wgpu::TextureView {
        &self.active_views[self.frame_index][mip as usize]
    }

    pub fn full_world_view(&self) -> &wgpu::TextureView {
        &self.full_world_view
    }

    pub fn full_world_texture(&self) -> &wgpu::Texture {
        &self.full_world
    }

    pub fn sampler_linear_clamp(&self) -> &wgpu::Sampler {
        &self.sampler_linear_clamp
    }

    pub fn sampler_linear_wrap(&self) -> &wgpu::Sampler {
        &self.sampler_linear_wrap
    }

    pub fn mip_count(&self) -> u32 {
        self.mip_count
    }
}
