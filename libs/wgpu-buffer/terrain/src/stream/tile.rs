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
    /// Transitions are non-exclusive: a tile can be `Uploaded`, `Active`, and `Processed`
    /// all at once, so this stays a bitset rather than a single-variant state enum.
    pub struct TileFlags: u8 {
        const ACTIVE                 = 0b0000_0001;
        const QUEUED                 = 0b0000_0010;
        const UPLOADED                = 0b0000_0100;
        const PROCESSED              = 0b0000_1000;
        const PROCESSED_INTERMEDIATE = 0b0001_0000;
    }
}

impl Default for TileFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// One cell of the global world-space tile grid. Created once at startup, one per grid
/// cell, and never destroyed afterward; only `flags` and `chunk_index` mutate.
#[derive(Debug, Clone)]
pub struct Tile {
    pub world_origin: [f32; 2],
    pub coords: (i32, i32),
    pub source_name: Option<String>,
    pub min_height: f32,
    pub max_height: f32,
    pub flags: TileFlags,
    pub chunk_index: Option<u32>,
    /// Exists only for uniform indexing; never read from disk.
    pub empty: bool,
}

impl Tile {
    pub fn new(world_origin: [f32; 2], coords: (i32, i32), source_name: Option<String>) -> Self {
        Self {
            world_origin,
            coords,
            source_name,
            min_height: 0.0,
            max_height: 0.0,
            flags: TileFlags::empty(),
            chunk_index: None,
            empty: true,
        }
    }

    pub fn is_queued_or_uploaded(&self) -> bool {
        self.flags
            .intersects(TileFlags::QUEUED | TileFlags::UPLOADED)
    }

    /// Clear the processed flags so the preprocess compute pass re-reads this tile's
    /// (possibly just-updated) neighbors next frame.
    pub fn mark_dirty(&mut self) {
        self.flags
            .remove(TileFlags::PROCESSED | TileFlags::PROCESSED_INTERMEDIATE);
    }

    /// Chebyshev distance, in tiles, from this tile to the given window center.
    pub fn chebyshev_distance(&self, center: (i32, i32)) -> i32 {
        (self.coords.0 - center.0)
            .abs()
            .max((self.coords.1 - center.1).abs())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mark_dirty_clears_processed_only() {
        let mut tile = Tile::new([0.0, 0.0], (0, 0), None);
        tile.flags = TileFlags::ACTIVE | TileFlags::PROCESSED | TileFlags::UPLOADED;
        tile.mark_dirty();
        assert!(tile.flags.contains(TileFlags::ACTIVE));
        assert!(tile.flags.contains(TileFlags::UPLOADED));
        assert!(!tile.flags.contains(TileFlags::PROCESSED));
    }

    #[test]
    fn test_chebyshev_distance() {
        let tile = Tile::new([0.0, 0.0], (3, -2), None);
        assert_eq!(tile.chebyshev_distance((0, 0)), 3);
        assert_eq!(tile.chebyshev_distance((3, -5)), 3);
    }
}
