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
use parking_lot::Mutex;

/// One tile-sized slab of host-visible sample bytes. The worker writes to a chunk's own
/// slab while the main thread only reads slabs whose owning tile has `Uploaded` set;
/// because slabs are disjoint, the per-slab mutex sees essentially no contention and
/// exists only to give the write a release barrier the main thread's read can acquire.
pub struct StagingRingBuffer {
    slab_bytes: usize,
    slabs: Vec<Mutex<Vec<u8>>>,
}

impl StagingRingBuffer {
    /// Allocate `chunk_count` slabs of `tile_size * tile_size * sizeof(u16)` bytes each,
    /// sized at startup to hold every chunk simultaneously.
    pub fn new(chunk_count: u32, tile_size: u32) -> Self {
        let slab_bytes = (tile_size * tile_size * 2) as usize;
        let slabs = (0..chunk_count)
            .map(|_| Mutex::new(vec![0u8; slab_bytes]))
            .collect();
        Self { slab_bytes, slabs }
    }

    pub fn slab_bytes(&self) -> usize {
        self.slab_bytes
    }

    /// Worker-side write: copies `data` into the chunk's slab, truncating or zero-padding
    /// to the slab size if the source payload was short (an empty tile, e.g.).
    pub fn write_slab(&self, chunk_index: u32, data: &[u8]) {
        let mut slab = self.slabs[chunk_index as usize].lock();
        let n = data.len().min(slab.len());
        slab[..n].copy_from_slice(&data[..n]);
        for b in &mut slab[n..] {
            *b = 0;
        }
    }

    /// Main-thread-side read, valid only once the owning tile's `Uploaded` flag is observed.
    pub fn read_slab(&self, chunk_index: u32) -> Vec<u8> {
        self.slabs[chunk_index as usize].lock().clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_write_then_read_round_trips() {
        let ring = StagingRingBuffer::new(2, 4);
        ring.write_slab(1, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32]);
        let back = ring.read_slab(1);
        assert_eq!(back.len(), ring.slab_bytes());
    }

    #[test]
    fn test_short_payload_zero_pads() {
        let ring = StagingRingBuffer::new(1, 2);
        ring.write_slab(0, &[9, 9]);
        let back = ring.read_slab(0);
        assert_eq!(back, vec![9, 9, 0, 0, 0, 0, 0, 0]);
    }
}
