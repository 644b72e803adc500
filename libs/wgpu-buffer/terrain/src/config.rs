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
use bitflags::bitflags;

bitflags! {
    pub struct TerrainFlags: u32 {
        const WIREFRAME           = 0x0000_0001;
        const TILE_STREAMING      = 0x0000_0002;
        const SHOW_ORIGIN         = 0x0000_0004;
        const SHOW_BOUNDARY       = 0x0000_0008;
        const SHOW_GRID           = 0x0000_0010;
        const CACHE_TILES         = 0x0000_0020;
        const DEBUG_TOOLS         = 0x0000_0040;
        const HIGH_RES            = 0x0000_0080;
        const LOW_RES             = 0x0000_0100;
    }
}

impl Default for TerrainFlags {
    fn default() -> Self {
        Self::TILE_STREAMING | Self::CACHE_TILES | Self::HIGH_RES | Self::LOW_RES
    }
}

/// Initialization-time configuration for the terrain core. Mirrors the fields the
/// original source's init struct required; all are mandatory except where noted.
#[derive(Debug, Clone, Copy)]
pub struct TerrainConfig {
    pub meters_per_texel: f32,
    pub min_elevation: f32,
    pub max_elevation: f32,
    pub world_min: [f32; 2],
    pub world_max: [f32; 2],
    pub heightmap_resolution: u32,
    pub tile_size: u32,
    pub prefetch_radius: u32,
    pub mesh_levels: u32,
    pub mesh_base_lod_extent_texels: u32,
    pub flags: TerrainFlags,
}

impl TerrainConfig {
    /// Number of atlas tiles per side, `K = heightmapResolution / tileSize`.
    pub fn atlas_tiles_per_side(&self) -> u32 {
        self.heightmap_resolution / self.tile_size
    }

    /// Active window side in tiles, `2R = K`, the whole atlas side the toroidal packer
    /// addresses. `prefetch_radius` governs chunk-pool recycle distance only, not this.
    pub fn window_side_tiles(&self) -> u32 {
        self.atlas_tiles_per_side()
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            meters_per_texel: 1.0,
            min_elevation: -500.0,
            max_elevation: 9000.0,
            world_min: [-1024.0, -1024.0],
            world_max: [1024.0, 1024.0],
            heightmap_resolution: 2048,
            tile_size: 256,
            prefetch_radius: 2,
            mesh_levels: 8,
            mesh_base_lod_extent_texels: 64,
            flags: TerrainFlags::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_atlas_tiles_per_side() {
        let cfg = TerrainConfig {
            heightmap_resolution: 1024,
            tile_size: 256,
            ..TerrainConfig::default()
        };
        assert_eq!(cfg.atlas_tiles_per_side(), 4);
    }

    #[test]
    fn test_window_side_tiles() {
        let cfg = TerrainConfig {
            prefetch_radius: 2,
            ..TerrainConfig::default()
        };
        assert_eq!(cfg.window_side_tiles(), cfg.atlas_tiles_per_side());
        assert_eq!(cfg.window_side_tiles(), 8);
    }
}
