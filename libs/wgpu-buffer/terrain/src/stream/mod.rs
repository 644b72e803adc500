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
//! Runtime tile streaming: `PrefetchQueue` <-> `ChunkPool` <-> `TileCacheReader` ->
//! `StagingRingBuffer`, driven by per-frame camera-based selection.
pub mod chunk_pool;
pub mod manager;
pub mod prefetch_queue;
pub mod staging;
pub mod tile;
pub mod tile_cache;

pub use manager::{TileDirection, TileStreamManager};
pub use tile::{Tile, TileFlags};
pub use tile_cache::TileCacheWriter;
