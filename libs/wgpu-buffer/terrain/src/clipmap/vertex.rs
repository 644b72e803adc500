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
use static_assertions::{assert_eq_align, assert_eq_size};
use std::mem;
use zerocopy::{AsBytes, FromBytes};

/// One nested-ring mesh vertex: `(x, L, z)` in mesh-local units, where `L` (the Y
/// component) is not a height but the ring's LOD/mip index. The vertex shader samples
/// the active heightmap atlas for the real displacement and reads `L` to pick a mip.
#[repr(C)]
#[derive(AsBytes, FromBytes, Debug, Copy, Clone, PartialEq)]
pub struct ClipmapVertex {
    position: [f32; 3],
}
assert_eq_size!(ClipmapVertex, [f32; 3]);
assert_eq_align!(ClipmapVertex, [f32; 4]);

impl ClipmapVertex {
    pub fn new(x: f32, level: f32, z: f32) -> Self {
        Self {
            position: [x, level, z],
        }
    }

    pub fn x(&self) -> f32 {
        self.position[0]
    }

    pub fn level(&self) -> f32 {
        self.position[1]
    }

    pub fn z(&self) -> f32 {
        self.position[2]
    }

    pub fn mem_size() -> usize {
        mem::size_of::<Self>()
    }

    pub fn descriptor() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            }],
        }
    }
}
