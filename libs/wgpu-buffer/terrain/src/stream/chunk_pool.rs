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
use crate::stream::tile::{Tile, TileFlags};

/// A fixed-capacity free list of staging-ring chunk indices. Total capacity is
/// `max_active + max_prefetched`, allocated once at startup; chunks cycle between tile
/// ownership and this list, never created or destroyed afterward.
pub struct ChunkPool {
    free: Vec<u32>,
    capacity: u32,
}

impl ChunkPool {
    pub fn new(capacity: u32) -> Self {
        Self {
            free: (0..capacity).rev().collect(),
            capacity,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Return a free chunk index, recycling chunks from inactive, non-queued tiles outside
    /// the active window if the pool is empty. `None` means the request should be deferred.
    pub fn acquire(&mut self, tiles: &mut [Tile], window_center: (i32, i32), prefetch_radius: i32) -> Option<u32> {
        if self.free.is_empty() {
            self.recycle(tiles, window_center, prefetch_radius);
        }
        self.free.pop()
    }

    /// Scan for chunks owned by tiles that are inactive, not queued, and outside the
    /// prefetch radius, and return their chunks to the free list.
    fn recycle(&mut self, tiles: &mut [Tile], window_center: (i32, i32), prefetch_radius: i32) {
        for tile in tiles.iter_mut() {
            let Some(chunk_index) = tile.chunk_index else {
                continue;
            };
            let inactive = !tile.flags.contains(TileFlags::ACTIVE);
            let not_queued = !tile.flags.contains(TileFlags::QUEUED);
            let far = tile.chebyshev_distance(window_center) > prefetch_radius;
            if inactive && not_queued && far {
                tile.chunk_index = None;
                tile.flags.remove(TileFlags::UPLOADED);
                self.free.push(chunk_index);
            }
        }
    }

    pub fn release(&mut self, chunk_index: u32) {
        debug_assert!(chunk_index < self.capacity);
        self.free.push(chunk_index);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tile_at(coords: (i32, i32)) -> Tile {
        Tile::new([0.0, 0.0], coords, None)
    }

    #[test]
    fn test_acquire_drains_free_list() {
        let mut pool = ChunkPool::new(2);
        let mut tiles = vec![];
        assert_eq!(pool.acquire(&mut tiles, (0, 0), 2), Some(1));
        assert_eq!(pool.acquire(&mut tiles, (0, 0), 2), Some(0));
        assert_eq!(pool.acquire(&mut tiles, (0, 0), 2), None);
    }

    #[test]
    fn test_recycle_far_inactive_tile() {
        let mut pool = ChunkPool::new(1);
        let chunk = pool.acquire(&mut [], (0, 0), 2).unwrap();
        let mut far_tile = tile_at((10, 10));
        far_tile.chunk_index = Some(chunk);
        let mut tiles = vec![far_tile];
        assert_eq!(pool.acquire(&mut tiles, (0, 0), 2), Some(chunk));
        assert_eq!(tiles[0].chunk_index, None);
    }

    #[test]
    fn test_recycle_skips_active_tile() {
        let mut pool = ChunkPool::new(1);
        let chunk = pool.acquire(&mut [], (0, 0), 2).unwrap();
        let mut far_tile = tile_at((10, 10));
        far_tile.chunk_index = Some(chunk);
        far_tile.flags = TileFlags::ACTIVE;
        let mut tiles = vec![far_tile];
        assert_eq!(pool.acquire(&mut tiles, (0, 0), 2), None);
    }
}
