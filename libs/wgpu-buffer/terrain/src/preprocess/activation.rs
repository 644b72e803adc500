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
use crate::preprocess::heightmap::Heightmap;

/// Walks the quadtree implicit in a heightmap's sample grid, bubbling each node's
/// descendant activation levels up through edge midpoints to the node center.
///
/// `pl__propagate_activation_level` is invoked twice per level in the source with
/// identical arguments; we preserve that rather than "fix" it, since the second call is
/// an idempotent fixed-point pass (see the module-level property test below).
pub struct ActivationPropagator;

impl ActivationPropagator {
    pub fn run(heightmap: &mut Heightmap) {
        let half = ((heightmap.side - 1) / 2) as i64;
        let cx = half;
        let cz = half;
        for _ in 0..2 {
            Self::propagate_node(heightmap, cx, cz, half);
        }
    }

    fn propagate_node(heightmap: &mut Heightmap, cx: i64, cz: i64, half: i64) {
        if half < 1 {
            return;
        }
        let child_half = half / 2;
        if child_half >= 1 {
            // Descend first so that grandchildren have already bubbled into our children.
            for &sx in &[-1i64, 1] {
                for &sz in &[-1i64, 1] {
                    Self::propagate_node(heightmap, cx + sx * child_half, cz + sz * child_half, child_half);
                }
            }

            for &sx in &[-1i64, 1] {
                for &sz in &[-1i64, 1] {
                    let child_level = heightmap
                        .at(
                            (cx + sx * child_half) as usize,
                            (cz + sz * child_half) as usize,
                        )
                        .activation;
                    Self::raise(heightmap, cx + sx * half, cz, child_level);
                    Self::raise(heightmap, cx, cz + sz * half, child_level);
                }
            }
        }

        let mut center_level = heightmap.at(cx as usize, cz as usize).activation;
        for &(ex, ez) in &[(-half, 0i64), (half, 0), (0, -half), (0, half)] {
            if Self::in_bounds(heightmap, cx + ex, cz + ez) {
                center_level = center_level.max(heightmap.at((cx + ex) as usize, (cz + ez) as usize).activation);
            }
        }
        heightmap.at_mut(cx as usize, cz as usize).activation = center_level;
    }

    fn raise(heightmap: &mut Heightmap, x: i64, z: i64, level: i32) {
        if !Self::in_bounds(heightmap, x, z) {
            return;
        }
        let sample = heightmap.at_mut(x as usize, z as usize);
        sample.activation = sample.activation.max(level);
    }

    fn in_bounds(heightmap: &Heightmap, x: i64, z: i64) -> bool {
        x >= 0 && z >= 0 && (x as usize) < heightmap.side && (z as usize) < heightmap.side
    }
}

/// `node_index(x, z)` for a full quadtree of the given `depth`, nw/ne/sw/se breadth-first
/// rank. These bit identities must be preserved verbatim: the chunk file's `nodeLabel`
/// depends on them.
pub fn node_index(x: u32, z: u32, depth: u32) -> u32 {
    let mut index = 1u32;
    for bit in (0..depth).rev() {
        let xb = (x >> bit) & 1;
        let zb = (z >> bit) & 1;
        // nw, ne, sw, se ordering: quadrant = (z bit) * 2 + (x bit).
        index = (index << 2) + 1 + (zb << 1) + xb;
    }
    index
}

/// Total number of nodes in a full quadtree of the given `depth`, matching the chunk
/// file's `chunkCount = 0x55555555 & ((1<<(depth*2)) - 1)` formula.
pub fn chunk_count(depth: u32) -> u32 {
    0x5555_5555u32 & ((1u32 << (depth * 2)) - 1)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_center_peak_propagates_to_root() {
        let mut hm = Heightmap::zeroed(9, 1.0);
        let mid = hm.side / 2;
        hm.set_peak(mid, mid, 1000.0);
        crate::preprocess::error_compute::ErrorComputer::new(100.0, false).run(&mut hm);
        ActivationPropagator::run(&mut hm);
        assert!(hm.at(mid, mid).activation >= 3);
    }

    #[test]
    fn test_all_zero_heightmap_stays_never_active() {
        let mut hm = Heightmap::zeroed(9, 1.0);
        crate::preprocess::error_compute::ErrorComputer::new(1.0, false).run(&mut hm);
        ActivationPropagator::run(&mut hm);
        for z in 0..hm.side {
            for x in 0..hm.side {
                assert_eq!(hm.at(x, z).activation, -1);
            }
        }
    }

    #[test]
    fn test_node_index_root_is_one() {
        assert_eq!(node_index(0, 0, 0), 1);
    }

    #[test]
    fn test_chunk_count_depth_three() {
        assert_eq!(chunk_count(3), 21);
    }
}
