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

/// A texel-space slot in the `K x K` atlas grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasSlot {
    pub slot_x: u32,
    pub slot_y: u32,
}

impl AtlasSlot {
    pub fn offset_px(&self, tile_size: u32) -> (u32, u32) {
        (self.slot_x * tile_size, self.slot_y * tile_size)
    }
}

/// Pure toroidal tile-to-slot addressing: `(X0 + i) mod K, (Y0 + j) mod K`, where `(i, j)`
/// is the tile's column/row offset from the active window's top-left corner.
pub struct AtlasPacker {
    k: u32,
}

impl AtlasPacker {
    pub fn new(k: u32) -> Self {
        Self { k }
    }

    pub fn slot_for(&self, wrap_offset: (u32, u32), window_col_row: (u32, u32)) -> AtlasSlot {
        AtlasSlot {
            slot_x: (wrap_offset.0 + window_col_row.0) % self.k,
            slot_y: (wrap_offset.1 + window_col_row.1) % self.k,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_zero_offset_identity() {
        let packer = AtlasPacker::new(4);
        assert_eq!(packer.slot_for((0, 0), (2, 1)), AtlasSlot { slot_x: 2, slot_y: 1 });
    }

    #[test]
    fn test_wraps_around_k() {
        let packer = AtlasPacker::new(4);
        assert_eq!(packer.slot_for((3, 0), (2, 0)), AtlasSlot { slot_x: 1, slot_y: 0 });
    }

    #[test]
    fn test_offset_px_scales_by_tile_size() {
        let slot = AtlasSlot { slot_x: 2, slot_y: 3 };
        assert_eq!(slot.offset_px(256), (512, 768));
    }
}
