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
use crate::preprocess::{activation::node_index, heightmap::Heightmap};
use fxhash::FxHashMap;
use std::collections::HashSet;

type GridPoint = (u32, u32);

#[derive(Debug, Clone, Copy)]
struct TriangleGeom {
    id: u32,
    apex: GridPoint,
    left: GridPoint,
    right: GridPoint,
    level: u32,
}

/// One quadtree node's simplified mesh, ready for §6 serialization.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub node_label: i32,
    pub level: i32,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// A minimal weld-by-distance mesh sink. Not the full production mesh builder (explicitly
/// an external collaborator); good enough to dedup BTT triangle corners that several
/// leaves share.
struct WeldingSink {
    weld_radius: f32,
    positions: Vec<[f32; 3]>,
    lookup: FxHashMap<(i32, i32, i32), u32>,
    indices: Vec<u32>,
}

impl WeldingSink {
    fn new(weld_radius: f32) -> Self {
        Self {
            weld_radius,
            positions: Vec::new(),
            lookup: FxHashMap::default(),
            indices: Vec::new(),
        }
    }

    fn quantize(&self, p: [f32; 3]) -> (i32, i32, i32) {
        let s = 1.0 / self.weld_radius;
        (
            (p[0] * s).round() as i32,
            (p[1] * s).round() as i32,
            (p[2] * s).round() as i32,
        )
    }

    fn push_vertex(&mut self, p: [f32; 3]) -> u32 {
        let key = self.quantize(p);
        if let Some(&idx) = self.lookup.get(&key) {
            return idx;
        }
        let idx = self.positions.len() as u32;
        self.positions.push(p);
        self.lookup.insert(key, idx);
        idx
    }

    fn add_triangle(&mut self, a: [f32; 3], b: [f32; 3], c: [f32; 3]) {
        let ia = self.push_vertex(a);
        let ib = self.push_vertex(b);
        let ic = self.push_vertex(c);
        self.indices.extend_from_slice(&[ia, ib, ic]);
    }
}

pub struct ChunkMesher {
    tree_depth: u32,
}

impl ChunkMesher {
    pub fn new(tree_depth: u32) -> Self {
        Self { tree_depth }
    }

    /// Mesh the whole quadtree, nw, ne, sw, se recursion order, producing one `Chunk` per
    /// node in breadth-first order.
    pub fn run(&self, heightmap: &Heightmap) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let full_side = heightmap.side as u32 - 1;
        self.mesh_node(heightmap, 0, 0, full_side, self.tree_depth - 1, &mut chunks);
        chunks.sort_by_key(|c| c.node_label);
        chunks
    }

    #[allow(clippy::too_many_arguments)]
    fn mesh_node(
        &self,
        heightmap: &Heightmap,
        x0: u32,
        z0: u32,
        side: u32,
        level: u32,
        out: &mut Vec<Chunk>,
    ) {
        let half = side / 2;
        // nw, ne, sw, se.
        if level > 0 {
            self.mesh_node(heightmap, x0, z0, half, level - 1, out);
            self.mesh_node(heightmap, x0 + half, z0, half, level - 1, out);
            self.mesh_node(heightmap, x0, z0 + half, half, level - 1, out);
            self.mesh_node(heightmap, x0 + half, z0 + half, half, level - 1, out);
        }

        let depth_in_tree = self.tree_depth - 1 - level;
        let (qx, qz) = quadrant_coords(x0, z0, side, depth_in_tree);
        let label = node_index(qx, qz, depth_in_tree) as i32;
        out.push(self.mesh_single_node(heightmap, x0, z0, side, level, label));
    }

    fn mesh_single_node(
        &self,
        heightmap: &Heightmap,
        x0: u32,
        z0: u32,
        side: u32,
        node_level: u32,
        node_label: i32,
    ) -> Chunk {
        let log_size = (side as f32).log2().round() as u32;
        let finest_level = 2 * log_size + node_level;

        // Force-activate the four corners at this node's own level so boundaries are
        // always retained regardless of what the interior decides to merge away.
        let corners = [
            (x0, z0),
            (x0 + side, z0),
            (x0, z0 + side),
            (x0 + side, z0 + side),
        ];
        let mut forced = FxHashMap::default();
        for c in corners {
            let actual = heightmap.at(c.0 as usize, c.1 as usize).activation;
            forced.insert(c, actual.max(node_level as i32));
        }
        let activation_of = |p: GridPoint| -> i32 {
            forced
                .get(&p)
                .copied()
                .unwrap_or_else(|| heightmap.at(p.0 as usize, p.1 as usize).activation)
        };

        let mut geoms: FxHashMap<u32, TriangleGeom> = FxHashMap::default();
        let root_a = TriangleGeom {
            id: 2,
            apex: (x0, z0),
            left: (x0 + side, z0),
            right: (x0, z0 + side),
            level: node_level,
        };
        let root_b = TriangleGeom {
            id: 3,
            apex: (x0 + side, z0 + side),
            left: (x0, z0 + side),
            right: (x0 + side, z0),
            level: node_level,
        };
        let mut present: HashSet<u32> = HashSet::new();
        Self::split_fully(root_a, finest_level, &mut geoms, &mut present);
        Self::split_fully(root_b, finest_level, &mut geoms, &mut present);

        // Bottom-up diamond merge: cur walks from one below the finest split level down
        // to the node's own level.
        for cur in (node_level..finest_level).rev() {
            let candidates: Vec<u32> = geoms
                .values()
                .filter(|g| {
                    g.level == cur && present.contains(&(2 * g.id)) && present.contains(&(2 * g.id + 1))
                })
                .map(|g| g.id)
                .collect();

            let mut edge_map: FxHashMap<(u64, u64), Vec<u32>> = FxHashMap::default();
            for &id in &candidates {
                let g = geoms[&id];
                edge_map.entry(edge_key(g.left, g.right)).or_default().push(id);
            }

            let mut merged_this_pass: HashSet<u32> = HashSet::new();
            let mut sorted = candidates.clone();
            sorted.sort_unstable();
            for id in sorted {
                if merged_this_pass.contains(&id) {
                    continue;
                }
                let g = geoms[&id];
                // Open question in the source: only the primary midpoint's activation is
                // checked here, never the mate's.
                let base_mid = ((g.left.0 + g.right.0) / 2, (g.left.1 + g.right.1) / 2);
                if activation_of(base_mid) >= node_level as i32 {
                    continue;
                }
                let key = edge_key(g.left, g.right);
                if let Some(mate_id) = edge_map
                    .get(&key)
                    .and_then(|ids| ids.iter().copied().find(|&m| m != id && m > id))
                {
                    present.remove(&(2 * id));
                    present.remove(&(2 * id + 1));
                    present.remove(&(2 * mate_id));
                    present.remove(&(2 * mate_id + 1));
                    present.insert(id);
                    present.insert(mate_id);
                    merged_this_pass.insert(id);
                    merged_this_pass.insert(mate_id);
                }
            }
        }

        let weld_radius = 0.001;
        let mut sink = WeldingSink::new(weld_radius);
        for &id in &present {
            let g = geoms[&id];
            let a = world_of(heightmap, g.apex);
            let l = world_of(heightmap, g.left);
            let r = world_of(heightmap, g.right);
            sink.add_triangle(a, l, r);
        }

        let (bbox_min, bbox_max) = aabb_of(&sink.positions);
        Chunk {
            node_label,
            level: node_level as i32,
            bbox_min,
            bbox_max,
            vertices: sink.positions,
            indices: sink.indices,
        }
    }

    fn split_fully(
        g: TriangleGeom,
        finest_level: u32,
        geoms: &mut FxHashMap<u32, TriangleGeom>,
        present: &mut HashSet<u32>,
    ) {
        geoms.insert(g.id, g);
        if g.level >= finest_level {
            present.insert(g.id);
            return;
        }
        let b = (
            (g.left.0 + g.right.0) / 2,
            (g.left.1 + g.right.1) / 2,
        );
        let child_a = TriangleGeom {
            id: 2 * g.id,
            apex: b,
            left: g.apex,
            right: g.right,
            level: g.level + 1,
        };
        let child_b = TriangleGeom {
            id: 2 * g.id + 1,
            apex: b,
            left: g.left,
            right: g.apex,
            level: g.level + 1,
        };
        Self::split_fully(child_a, finest_level, geoms, present);
        Self::split_fully(child_b, finest_level, geoms, present);
    }
}

fn quadrant_coords(x0: u32, z0: u32, side: u32, depth: u32) -> (u32, u32) {
    if depth == 0 {
        return (0, 0);
    }
    (x0 / side.max(1), z0 / side.max(1))
}

fn edge_key(a: GridPoint, b: GridPoint) -> (u64, u64) {
    let pa = (a.0 as u64) | ((a.1 as u64) << 32);
    let pb = (b.0 as u64) | ((b.1 as u64) << 32);
    if pa < pb {
        (pa, pb)
    } else {
        (pb, pa)
    }
}

fn world_of(heightmap: &Heightmap, p: GridPoint) -> [f32; 3] {
    let w = heightmap.at(p.0 as usize, p.1 as usize).world;
    [w.x as f32, w.y as f32, w.z as f32]
}

fn aabb_of(positions: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    if positions.is_empty() {
        return ([0.0; 3], [0.0; 3]);
    }
    let mut lo = positions[0];
    let mut hi = positions[0];
    for p in positions {
        for i in 0..3 {
            lo[i] = lo[i].min(p[i]);
            hi[i] = hi[i].max(p[i]);
        }
    }
    (lo, hi)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::preprocess::{activation::ActivationPropagator, error_compute::ErrorComputer};

    #[test]
    fn test_flat_heightmap_produces_degenerate_chunks() {
        let mut hm = Heightmap::zeroed(9, 1.0);
        ErrorComputer::new(1.0, false).run(&mut hm);
        ActivationPropagator::run(&mut hm);
        let chunks = ChunkMesher::new(3).run(&hm);
        assert_eq!(chunks.len(), 21);
        for c in &chunks {
            // Every vertex on a perfectly flat field welds down to a single point,
            // so the triangle list collapses to nothing.
            assert!(c.vertices.len() <= 4);
        }
    }

    #[test]
    fn test_chunk_count_matches_depth() {
        let mut hm = Heightmap::zeroed(9, 1.0);
        ErrorComputer::new(1.0, false).run(&mut hm);
        ActivationPropagator::run(&mut hm);
        assert_eq!(ChunkMesher::new(3).run(&hm).len(), 21);
    }
}
