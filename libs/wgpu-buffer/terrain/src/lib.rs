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
mod atlas;
mod clipmap;
mod config;
mod error;
mod preprocess;
mod stream;

pub use crate::{
    atlas::{AtlasPacker, AtlasSlot, GpuStage},
    clipmap::{ClipmapDrawer, ClipmapMesh, ClipmapUniforms, ClipmapVertex},
    config::{TerrainConfig, TerrainFlags},
    error::{PreprocessError, TileFault},
    preprocess::{run_preprocess, run_preprocess_to_writer, PreprocessOptions, PreprocessOutput},
    stream::{Tile, TileCacheWriter, TileDirection, TileFlags, TileStreamManager},
};

use crate::stream::tile_cache::payload_file_name;
use absolute_unit::Meters;
use anyhow::Result;
use bevy_ecs::prelude::*;
use camera::ScreenCamera;
use catalog::Catalog;
use gpu::{Gpu, UploadTracker};
use nalgebra::Matrix4;
use nitrous::{inject_nitrous_resource, method, NitrousResource};
use runtime::{Extension, FrameStage, Runtime};
use std::{fmt, sync::Arc};
use window::DisplayConfig;
use zerocopy::{AsBytes, FromBytes};

/// Name under which this crate's single streamed heightfield source is cached; the crate
/// only ever drives one streamed heightfield per `TerrainBuffer`.
const HEIGHTMAP_SOURCE: &str = "heightmap";

#[derive(Clone, Debug, Eq, PartialEq, Hash, SystemLabel)]
pub enum TerrainRenderStep {
    UpdateTileSelection,
    EncodeAtlasStaging,
    DrawClipmap,
    AdvanceFrame,
}

/// Minimal per-frame globals a clipmap-only render pass needs at bind group 0. The full
/// application-wide parameters buffer the camera, sun, and atmosphere systems share is out
/// of scope here; this just satisfies `Group::Globals` with the camera data the vertex
/// shader needs before it even reaches `ClipmapUniforms`.
#[repr(C)]
#[derive(AsBytes, FromBytes, Debug, Copy, Clone)]
struct GlobalsUniforms {
    view_projection: [f32; 16],
    camera_position: [f32; 3],
    _pad: f32,
}

struct GlobalsBuffer {
    buffer: Arc<wgpu::Buffer>,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalsBuffer {
    fn new(gpu: &Gpu) -> Self {
        let device = gpu.device();
        let uniforms = GlobalsUniforms {
            view_projection: {
                let mut m = [0f32; 16];
                m.copy_from_slice(Matrix4::<f32>::identity().as_slice());
                m
            },
            camera_position: [0.0, 0.0, 0.0],
            _pad: 0.0,
        };
        let buffer = Arc::new(gpu.push_data(
            "terrain-globals-uniform",
            &uniforms,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        ));
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain-globals-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain-globals-bind-group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    fn update(&self, gpu: &Gpu, tracker: &UploadTracker, view_projection: &Matrix4<f32>, camera_position: [f32; 3]) {
        let mut vp = [0f32; 16];
        vp.copy_from_slice(view_projection.as_slice());
        let uniforms = GlobalsUniforms {
            view_projection: vp,
            camera_position,
            _pad: 0.0,
        };
        gpu.upload_slice_to(
            "terrain-globals-uniform-upload",
            std::slice::from_ref(&uniforms),
            self.buffer.clone(),
            tracker,
        );
    }
}

/// The streamed CDLOD geometry-clipmap terrain: tile selection and upload on the CPU side,
/// the atlas staging pipeline and nested-ring draw on the GPU side.
#[derive(NitrousResource)]
pub struct TerrainBuffer {
    config: TerrainConfig,
    tile_stream: TileStreamManager,
    atlas: GpuStage,
    drawer: ClipmapDrawer,
    globals: GlobalsBuffer,
    color_target: (wgpu::Texture, wgpu::TextureView),
    depth_target: (wgpu::Texture, wgpu::TextureView),
    toggle_pin_camera: bool,
    pinned_camera: Option<ScreenCamera>,
}

impl fmt::Debug for TerrainBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TerrainBuffer")
    }
}

impl Drop for TerrainBuffer {
    fn drop(&mut self) {
        self.tile_stream.shutdown();
    }
}

impl Extension for TerrainBuffer {
    fn init(runtime: &mut Runtime) -> Result<()> {
        let config = *runtime.resource::<TerrainConfig>();
        let catalog = runtime.resource::<Arc<Catalog>>().clone();
        let gpu = runtime.resource::<Gpu>();

        let mut terrain = TerrainBuffer::new(config, gpu, &catalog)?;
        terrain.tile_stream.spawn_worker(catalog);

        runtime.insert_module("terrain", terrain);

        runtime
            .frame_stage_mut(FrameStage::HandleDisplayChange)
            .add_system(Self::sys_handle_display_config_change);

        runtime.frame_stage_mut(FrameStage::SimStateChange).add_system(
            Self::sys_update_tile_selection.label(TerrainRenderStep::UpdateTileSelection),
        );

        runtime.frame_stage_mut(FrameStage::Render).add_system(
            Self::sys_encode_atlas_staging.label(TerrainRenderStep::EncodeAtlasStaging),
        );
        runtime.frame_stage_mut(FrameStage::Render).add_system(
            Self::sys_draw_clipmap
                .label(TerrainRenderStep::DrawClipmap)
                .after(TerrainRenderStep::EncodeAtlasStaging),
        );
        runtime.frame_stage_mut(FrameStage::Render).add_system(
            Self::sys_advance_frame
                .label(TerrainRenderStep::AdvanceFrame)
                .after(TerrainRenderStep::DrawClipmap),
        );

        Ok(())
    }
}

#[inject_nitrous_resource]
impl TerrainBuffer {
    const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
    const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(config: TerrainConfig, gpu: &Gpu, catalog: &Catalog) -> Result<Self> {
        let tile_stream = TileStreamManager::new(&config, |i, j| {
            Some(payload_file_name(HEIGHTMAP_SOURCE, config.tile_size, i, j))
        });

        let atlas = GpuStage::new(gpu, &config, catalog)?;
        let globals = GlobalsBuffer::new(gpu);
        let drawer = ClipmapDrawer::new(gpu, catalog, &config, &globals.bind_group_layout, &atlas)?;

        let color_target = Self::make_color_target(gpu);
        let depth_target = Self::make_depth_target(gpu);

        Ok(Self {
            config,
            tile_stream,
            atlas,
            drawer,
            globals,
            color_target,
            depth_target,
            toggle_pin_camera: false,
            pinned_camera: None,
        })
    }

    fn make_color_target(gpu: &Gpu) -> (wgpu::Texture, wgpu::TextureView) {
        let size = gpu.render_extent();
        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("terrain-clipmap-color-target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn make_depth_target(gpu: &Gpu) -> (wgpu::Texture, wgpu::TextureView) {
        let size = gpu.render_extent();
        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("terrain-clipmap-depth-target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    #[method]
    fn toggle_pin_camera(&mut self, pressed: bool) {
        if pressed {
            self.toggle_pin_camera = true;
        }
    }

    pub fn sys_handle_display_config_change(
        updated_config: Res<Option<DisplayConfig>>,
        gpu: Res<Gpu>,
        mut terrain: ResMut<TerrainBuffer>,
    ) {
        if updated_config.is_some() {
            terrain.color_target = Self::make_color_target(&gpu);
            terrain.depth_target = Self::make_depth_target(&gpu);
        }
    }

    /// Flat XZ camera position, approximating the geocentric camera as a point in the
    /// terrain's local Cartesian world. Good enough for a non-spherical heightfield whose
    /// `world_min`/`world_max` are themselves flat Cartesian extents.
    fn camera_world_xz(camera: &ScreenCamera) -> [f32; 2] {
        let p = camera.position::<Meters>().point64();
        [p.x as f32, p.z as f32]
    }

    fn sys_update_tile_selection(camera: Res<ScreenCamera>, mut terrain: ResMut<TerrainBuffer>) {
        let xz = Self::camera_world_xz(&camera);
        terrain.tile_stream.select(xz);
    }

    fn sys_encode_atlas_staging(
        mut terrain: ResMut<TerrainBuffer>,
        gpu: Res<Gpu>,
        maybe_encoder: ResMut<Option<wgpu::CommandEncoder>>,
    ) {
        if let Some(encoder) = maybe_encoder.into_inner() {
            terrain.encode_atlas_staging(&gpu, encoder);
        }
    }

    fn encode_atlas_staging(&mut self, gpu: &Gpu, encoder: &mut wgpu::CommandEncoder) {
        let packer = AtlasPacker::new(self.tile_stream.atlas_side());
        let wrap_offset = self.tile_stream.wrap_offset();
        let tile_size = self.config.tile_size;

        let uploads: Vec<(AtlasSlot, wgpu::Buffer)> = self
            .tile_stream
            .take_pending_raw_uploads()
            .into_iter()
            .map(|(_idx, col_row, bytes)| {
                let slot = packer.slot_for(wrap_offset, col_row);
                let buffer = gpu.push_slice("terrain-atlas-raw-upload", &bytes, wgpu::BufferUsages::COPY_SRC);
                (slot, buffer)
            })
            .collect();

        if !uploads.is_empty() {
            self.atlas.record_raw_upload(encoder, &uploads, tile_size);
            self.atlas.record_heightfield_preprocess(encoder, gpu.device());
        }

        if self.tile_stream.has_pending_mip_rebuild() {
            self.atlas.record_mip_chain(encoder, gpu.device());
            self.tile_stream.mark_intermediate_processed();
        }

        self.atlas.record_active_swap(encoder);
    }

    fn sys_draw_clipmap(
        mut terrain: ResMut<TerrainBuffer>,
        camera: Res<ScreenCamera>,
        gpu: Res<Gpu>,
        tracker: Res<UploadTracker>,
        maybe_encoder: ResMut<Option<wgpu::CommandEncoder>>,
    ) {
        if let Some(encoder) = maybe_encoder.into_inner() {
            terrain.draw_clipmap(&camera, &gpu, &tracker, encoder);
        }
    }

    fn draw_clipmap(
        &mut self,
        camera: &ScreenCamera,
        gpu: &Gpu,
        tracker: &UploadTracker,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        let camera_position = {
            let xz = Self::camera_world_xz(camera);
            [xz[0], 0.0, xz[1]]
        };
        let view_projection: Matrix4<f32> =
            nalgebra::convert(camera.perspective::<Meters>().as_matrix() * camera.view::<Meters>().to_homogeneous());

        self.globals.update(gpu, tracker, &view_projection, camera_position);

        let uniforms = ClipmapUniforms::new(
            camera_position,
            &view_projection,
            &self.config,
            self.tile_stream.wrap_offset(),
            [0.3, -0.8, 0.5],
        );
        self.drawer.update_uniforms(gpu, tracker, uniforms);
        self.drawer.rebind_active_atlas(gpu, &self.atlas);

        let wireframe = self.config.flags.contains(TerrainFlags::WIREFRAME);

        let rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("terrain-clipmap-render-pass"),
            color_attachments: &[wgpu::RenderPassColorAttachment {
                view: &self.color_target.1,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: true,
                },
            }],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_target.1,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0f32),
                    store: true,
                }),
                stencil_ops: None,
            }),
        });
        let _rpass = self.drawer.draw(rpass, &self.globals.bind_group, wireframe);
    }

    fn sys_advance_frame(mut terrain: ResMut<TerrainBuffer>) {
        terrain.atlas.advance_frame();
    }

    pub fn color_target_view(&self) -> &wgpu::TextureView {
        &self.color_target.1
    }

    pub fn depth_target_view(&self) -> &wgpu::TextureView {
        &self.depth_target.1
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }
}
