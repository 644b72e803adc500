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
use crate::config::TerrainConfig;
use crate::stream::chunk_pool::ChunkPool;
use crate::stream::prefetch_queue::PrefetchQueue;
use crate::stream::staging::StagingRingBuffer;
use crate::stream::tile::{Tile, TileFlags};
use crate::stream::tile_cache::TileCacheReader;
use bitflags::bitflags;
use catalog::Catalog;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

bitflags! {
    /// Which side(s) of the active window's perimeter moved this frame; gates which edge
    /// actually needs a prefetch re-scan instead of rewalking the whole window.
    pub struct TileDirection: u8 {
        const EAST  = 0b0001;
        const WEST  = 0b0010;
        const NORTH = 0b0100;
        const SOUTH = 0b1000;
    }
}

impl Default for TileDirection {
    fn default() -> Self {
        Self::empty()
    }
}

struct Inner {
    tiles: Mutex<Vec<Tile>>,
    chunk_pool: Mutex<ChunkPool>,
    prefetch_queue: PrefetchQueue,
    staging: StagingRingBuffer,
    grid_w: i32,
    grid_h: i32,
    grid_origin: (i32, i32),
    tile_size: u32,
    meters_per_texel: f32,
    worker_running: AtomicBool,
}

/// Drives tile selection from camera position, owns the chunk pool and prefetch queue, and
/// hosts the single background worker thread that turns queued indices into uploaded
/// sample bytes. Shared with the worker through one `Arc`, matching the "one mutex, one
/// condition variable, two atomic counters" resource model.
pub struct TileStreamManager {
    inner: Arc<Inner>,
    k: u32,
    /// Half-extent of the active window, `K/2`, covering the whole atlas the toroidal
    /// packer addresses. Distinct from `prefetch_radius`, which only sizes the chunk-pool
    /// recycle distance.
    window_radius: i32,
    prefetch_radius: i32,
    wrap_offset: (u32, u32),
    window_center: Option<(i32, i32)>,
    direction: TileDirection,
    worker: Option<JoinHandle<()>>,
}

impl TileStreamManager {
    /// Build the tile grid covering `config.world_min..config.world_max`, one tile entry
    /// per cell, all dormant. `source_name_at` names each cell's cache payload file, or
    /// `None` for a logically-present-but-empty tile.
    pub fn new(config: &TerrainConfig, source_name_at: impl Fn(i32, i32) -> Option<String>) -> Self {
        let tile_world_size = config.tile_size as f32 * config.meters_per_texel;
        let grid_w = ((config.world_max[0] - config.world_min[0]) / tile_world_size).ceil() as i32;
        let grid_h = ((config.world_max[1] - config.world_min[1]) / tile_world_size).ceil() as i32;
        let grid_origin = (
            (config.world_min[0] / tile_world_size).floor() as i32,
            (config.world_min[1] / tile_world_size).floor() as i32,
        );

        let mut tiles = Vec::with_capacity((grid_w * grid_h).max(0) as usize);
        for j in 0..grid_h {
            for i in 0..grid_w {
                let coords = (grid_origin.0 + i, grid_origin.1 + j);
                let origin = [
                    coords.0 as f32 * tile_world_size,
                    coords.1 as f32 * tile_world_size,
                ];
                let name = source_name_at(i, j);
                let mut tile = Tile::new(origin, coords, name.clone());
                tile.empty = name.is_none();
                tiles.push(tile);
            }
        }

        let k = config.atlas_tiles_per_side();
        let window_side = config.window_side_tiles();
        let capacity = 4 * config.prefetch_radius * k + 4 * config.prefetch_radius * config.prefetch_radius;
        let chunk_capacity = window_side * window_side + capacity;

        Self {
            inner: Arc::new(Inner {
                tiles: Mutex::new(tiles),
                chunk_pool: Mutex::new(ChunkPool::new(chunk_capacity)),
                prefetch_queue: PrefetchQueue::new(capacity as usize),
                staging: StagingRingBuffer::new(chunk_capacity, config.tile_size),
                grid_w,
                grid_h,
                grid_origin,
                tile_size: config.tile_size,
                meters_per_texel: config.meters_per_texel,
                worker_running: AtomicBool::new(false),
            }),
            k,
            window_radius: (k / 2) as i32,
            prefetch_radius: config.prefetch_radius as i32,
            wrap_offset: (0, 0),
            window_center: None,
            direction: TileDirection::default(),
            worker: None,
        }
    }

    pub fn wrap_offset(&self) -> (u32, u32) {
        self.wrap_offset
    }

    pub fn current_direction(&self) -> TileDirection {
        self.direction
    }

    pub fn atlas_side(&self) -> u32 {
        self.k
    }

    /// Spawn the single background reader thread. The worker owns no GPU resources and
    /// never touches them; it only moves cache bytes into staging slabs.
    pub fn spawn_worker(&mut self, catalog: Arc<Catalog>) {
        if self.inner.worker_running.swap(true, Ordering::AcqRel) {
            return;
        }
        log::info!("starting terrain tile streaming worker");
        let inner = self.inner.clone();
        self.worker = Some(std::thread::spawn(move || {
            while let Some(tile_index) = inner.prefetch_queue.wait_for_work() {
                Self::service_one(&inner, &catalog, tile_index as usize);
            }
            log::info!("terrain tile streaming worker exiting");
        }));
    }

    fn service_one(inner: &Inner, catalog: &Catalog, tile_index: usize) {
        let (source_name, chunk_index) = {
            let tiles = inner.tiles.lock();
            let tile = &tiles[tile_index];
            (tile.source_name.clone(), tile.chunk_index)
        };
        let Some(chunk_index) = chunk_index else {
            // Logic error per source: a tile was queued without an owning chunk. Nothing
            // safe to do but drop the request; the tile stays Queued and selection retries.
            return;
        };

        let reader = TileCacheReader::new(catalog);
        let bytes = match &source_name {
            Some(name) => reader.read_payload(name, inner.tile_size),
            None => vec![0u8; (inner.tile_size * inner.tile_size * 2) as usize],
        };
        inner.staging.write_slab(chunk_index, &bytes);

        let mut tiles = inner.tiles.lock();
        // A recycled chunk's tile may have had `Queued` cleared out from under it while the
        // read was in flight; discard the result rather than resurrecting a dead request.
        if !tiles[tile_index].flags.contains(TileFlags::QUEUED) {
            return;
        }
        tiles[tile_index].flags.remove(TileFlags::QUEUED);
        tiles[tile_index].flags.insert(TileFlags::UPLOADED);
        let coords = tiles[tile_index].coords;
        Self::mark_neighbors_dirty(&mut tiles, inner.grid_w, inner.grid_h, inner.grid_origin, coords);
    }

    fn mark_neighbors_dirty(tiles: &mut [Tile], grid_w: i32, grid_h: i32, grid_origin: (i32, i32), coords: (i32, i32)) {
        for dz in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let (nx, nz) = (coords.0 + dx, coords.1 + dz);
                let (lx, lz) = (nx - grid_origin.0, nz - grid_origin.1);
                if lx < 0 || lz < 0 || lx >= grid_w || lz >= grid_h {
                    continue;
                }
                let idx = (lz * grid_w + lx) as usize;
                tiles[idx].mark_dirty();
            }
        }
    }

    /// Shut the worker down: sets the running flag false, zeroes pending, broadcasts, and
    /// joins. Any read already in flight is allowed to complete.
    pub fn shutdown(&mut self) {
        self.inner.prefetch_queue.shutdown();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    fn tile_index_at(&self, coords: (i32, i32)) -> Option<usize> {
        let local = (coords.0 - self.inner.grid_origin.0, coords.1 - self.inner.grid_origin.1);
        if local.0 < 0 || local.1 < 0 || local.0 >= self.inner.grid_w || local.1 >= self.inner.grid_h {
            return None;
        }
        Some((local.1 * self.inner.grid_w + local.0) as usize)
    }

    /// Round a world-space XZ position to its containing tile's grid coordinates.
    pub fn camera_tile(&self, camera_world_xz: [f32; 2]) -> (i32, i32) {
        let tile_world_size = self.inner.tile_size as f32 * self.inner.meters_per_texel;
        let fx = camera_world_xz[0] / tile_world_size;
        let fz = camera_world_xz[1] / tile_world_size;
        (fx.round() as i32, fz.round() as i32)
    }

    /// Per-frame selection: update the active window around the camera's tile, diffing
    /// against the previous window so only newly entered tiles are pushed to prefetch
    /// (scenario: moving one tile east only prefetches the new eastern column).
    pub fn select(&mut self, camera_world_xz: [f32; 2]) {
        let cx_cz = self.camera_tile(camera_world_xz);
        let prev = self.window_center;
        self.window_center = Some(cx_cz);

        let r = self.window_radius;
        let new_window: Vec<(i32, i32)> = Self::window_coords(cx_cz, r);

        self.direction = TileDirection::default();
        if let Some(prev_center) = prev {
            let dx = cx_cz.0 - prev_center.0;
            let dz = cx_cz.1 - prev_center.1;
            if dx > 0 {
                self.direction.insert(TileDirection::EAST);
            } else if dx < 0 {
                self.direction.insert(TileDirection::WEST);
            }
            if dz > 0 {
                self.direction.insert(TileDirection::NORTH);
            } else if dz < 0 {
                self.direction.insert(TileDirection::SOUTH);
            }
            self.wrap_offset.0 = (self.wrap_offset.0 as i32 + dx).rem_euclid(self.k as i32) as u32;
            self.wrap_offset.1 = (self.wrap_offset.1 as i32 + dz).rem_euclid(self.k as i32) as u32;

            let old_window = Self::window_coords(prev_center, r);
            for coords in &old_window {
                if !new_window.contains(coords) {
                    if let Some(idx) = self.tile_index_at(*coords) {
                        self.inner.tiles.lock()[idx].flags.remove(TileFlags::ACTIVE);
                    }
                }
            }
        }

        for coords in &new_window {
            let Some(idx) = self.tile_index_at(*coords) else {
                continue;
            };
            self.activate_tile(idx, cx_cz);
        }

        self.inner.prefetch_queue.promote_overflow();
    }

    fn window_coords(center: (i32, i32), r: i32) -> Vec<(i32, i32)> {
        let mut out = Vec::with_capacity((4 * r * r) as usize);
        for dz in -r..r {
            for dx in -r..r {
                out.push((center.0 + dx, center.1 + dz));
            }
        }
        out
    }

    fn activate_tile(&self, tile_index: usize, window_center: (i32, i32)) {
        let mut tiles = self.inner.tiles.lock();
        tiles[tile_index].flags.insert(TileFlags::ACTIVE);
        if tiles[tile_index].flags.contains(TileFlags::UPLOADED) {
            return;
        }
        if tiles[tile_index].chunk_index.is_none() {
            let mut pool = self.inner.chunk_pool.lock();
            if let Some(chunk_index) = pool.acquire(&mut tiles, window_center, self.prefetch_radius) {
                tiles[tile_index].chunk_index = Some(chunk_index);
            } else {
                // Resource exhaustion: defer. Selection will retry next frame.
                return;
            }
        }
        if tiles[tile_index].flags.contains(TileFlags::QUEUED) {
            return;
        }
        tiles[tile_index].flags.insert(TileFlags::QUEUED);
        drop(tiles);
        self.inner.prefetch_queue.push(tile_index as u32);
    }

    /// Tiles that have sample bytes staged but haven't been blitted into the raw atlas
    /// texture yet, paired with their window-relative `(col, row)` for `AtlasPacker` and
    /// their staging bytes. Marks each returned tile `PROCESSED_INTERMEDIATE` so it is not
    /// handed back out next frame while the GPU catches up.
    pub fn take_pending_raw_uploads(&self) -> Vec<(usize, (u32, u32), Vec<u8>)> {
        let Some(center) = self.window_center else {
            return Vec::new();
        };
        let r = self.window_radius;
        let mut tiles = self.inner.tiles.lock();
        let mut out = Vec::new();
        for coords in Self::window_coords(center, r) {
            let Some(idx) = self.tile_index_at(coords) else {
                continue;
            };
            let tile = &tiles[idx];
            if !tile.flags.contains(TileFlags::UPLOADED) || tile.flags.contains(TileFlags::PROCESSED_INTERMEDIATE) {
                continue;
            }
            let Some(chunk_index) = tile.chunk_index else {
                continue;
            };
            let col = (coords.0 - (center.0 - r)) as u32;
            let row = (coords.1 - (center.1 - r)) as u32;
            let bytes = self.inner.staging.read_slab(chunk_index);
            out.push((idx, (col, row), bytes));
        }
        for (idx, _, _) in &out {
            tiles[*idx].flags.insert(TileFlags::PROCESSED_INTERMEDIATE);
        }
        out
    }

    /// Promote every tile whose raw bytes are in the atlas but whose mip chain hasn't been
    /// rebuilt yet to fully `Processed`. Call after recording the mip-chain build.
    pub fn mark_intermediate_processed(&self) {
        let mut tiles = self.inner.tiles.lock();
        for tile in tiles.iter_mut() {
            if tile.flags.contains(TileFlags::PROCESSED_INTERMEDIATE) {
                tile.flags.insert(TileFlags::PROCESSED);
            }
        }
    }

    /// Whether any tile is waiting on this frame's mip-chain rebuild.
    pub fn has_pending_mip_rebuild(&self) -> bool {
        let tiles = self.inner.tiles.lock();
        tiles
            .iter()
            .any(|t| t.flags.contains(TileFlags::PROCESSED_INTERMEDIATE) && !t.flags.contains(TileFlags::PROCESSED))
    }

    pub fn is_active(&self, coords: (i32, i32)) -> bool {
        self.tile_index_at(coords)
            .map(|idx| self.inner.tiles.lock()[idx].flags.contains(TileFlags::ACTIVE))
            .unwrap_or(false)
    }

    pub fn pending_prefetch(&self) -> usize {
        self.inner.prefetch_queue.pending()
    }

    pub fn overflow_len(&self) -> usize {
        self.inner.prefetch_queue.overflow_len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_config() -> TerrainConfig {
        TerrainConfig {
            meters_per_texel: 1.0,
            world_min: [-1024.0, -1024.0],
            world_max: [1024.0, 1024.0],
            heightmap_resolution: 1024,
            tile_size: 256,
            prefetch_radius: 2,
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn test_initial_window_centers_on_origin() {
        let mut mgr = TileStreamManager::new(&test_config(), |_, _| None);
        mgr.select([0.0, 0.0]);
        assert_eq!(mgr.wrap_offset(), (0, 0));
        assert!(mgr.is_active((0, 0)));
        assert!(mgr.is_active((-2, -2)));
        assert!(!mgr.is_active((2, 2)));
    }

    #[test]
    fn test_moving_east_advances_wrap_offset() {
        let mut mgr = TileStreamManager::new(&test_config(), |_, _| None);
        mgr.select([0.0, 0.0]);
        mgr.select([256.0, 0.0]);
        assert_eq!(mgr.wrap_offset().0, 1);
        assert!(mgr.current_direction().contains(TileDirection::EAST));
    }

    #[test]
    fn test_tile_leaving_window_becomes_inactive() {
        let mut mgr = TileStreamManager::new(&test_config(), |_, _| None);
        mgr.select([0.0, 0.0]);
        assert!(mgr.is_active((-2, 0)));
        mgr.select([256.0 * 3.0, 0.0]);
        assert!(!mgr.is_active((-2, 0)));
    }
}
