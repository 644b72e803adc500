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
use crate::clipmap::vertex::ClipmapVertex;
use fxhash::FxHashMap;

const PAD: i32 = 1;

/// A weld-by-distance vertex sink, the same trick the offline chunk mesher uses to dedup
/// corners several cells share, here quantizing `(x, L, z)` together so that two rings at
/// different LODs never accidentally collapse onto one vertex.
struct Welder {
    inv_weld_radius: f32,
    positions: Vec<ClipmapVertex>,
    lookup: FxHashMap<(i32, i32, i32), u32>,
    indices: Vec<u32>,
}

impl Welder {
    fn new(weld_radius: f32) -> Self {
        Self {
            inv_weld_radius: 1.0 / weld_radius,
            positions: Vec::new(),
            lookup: FxHashMap::default(),
            indices: Vec::new(),
        }
    }

    fn quantize(&self, v: &ClipmapVertex) -> (i32, i32, i32) {
        (
            (v.x() * self.inv_weld_radius).round() as i32,
            (v.level() * self.inv_weld_radius).round() as i32,
            (v.z() * self.inv_weld_radius).round() as i32,
        )
    }

    fn push_vertex(&mut self, v: ClipmapVertex) -> u32 {
        let key = self.quantize(&v);
        if let Some(&idx) = self.lookup.get(&key) {
            return idx;
        }
        let idx = self.positions.len() as u32;
        self.positions.push(v);
        self.lookup.insert(key, idx);
        idx
    }

    fn add_triangle(&mut self, a: ClipmapVertex, b: ClipmapVertex, c: ClipmapVertex) {
        let ia = self.push_vertex(a);
        let ib = self.push_vertex(b);
        let ic = self.push_vertex(c);
        self.indices.extend_from_slice(&[ia, ib, ic]);
    }
}

/// The nested-rings mesh, built once at startup and drawn every frame with a fresh
/// per-frame uniform block supplying camera position and wrap offset.
#[derive(Debug, Clone)]
pub struct ClipmapMesh {
    pub vertices: Vec<ClipmapVertex>,
    pub indices: Vec<u32>,
}

impl ClipmapMesh {
    /// `mesh_levels` rings, `level` in `0..mesh_levels`, stepping by `2^level` across
    /// `[-radius, +radius]` where `radius = step * (g + pad)`, `g = base_lod_extent / 2`.
    /// A cell is only emitted once it clears the hole the next-finer level already covers:
    /// `max(|cx|, |cz|) >= g * prevStep`, where `(cx, cz)` is the cell's center.
    pub fn build(mesh_levels: u32, base_lod_extent_texels: u32) -> Self {
        let g = base_lod_extent_texels as f32 / 2.0;
        let mut welder = Welder::new(1e-3);
        let mut prev_step = 0.0f32;

        for level in 0..mesh_levels {
            let step = (1u32 << level) as f32;
            let half_cells = (g + PAD as f32).round() as i32;

            for i in -half_cells..half_cells {
                for j in -half_cells..half_cells {
                    let cx = (i as f32 + 0.5) * step;
                    let cz = (j as f32 + 0.5) * step;
                    if cx.abs().max(cz.abs()) < g * prev_step {
                        continue;
                    }
                    let is_outer = i == -half_cells || i == half_cells - 1 || j == -half_cells || j == half_cells - 1;
                    Self::emit_cell(&mut welder, cx, cz, step, level as f32, is_outer);
                }
            }
            prev_step = step;
        }

        Self {
            vertices: welder.positions,
            indices: welder.indices,
        }
    }

    /// The canonical 8-triangle fan around a cell's center: four corners, four edge
    /// midpoints, fanned out of the center. The outermost strip of each ring instead gets
    /// the plain two-triangle quad so it stitches cleanly to the next, coarser ring, which
    /// has no matching midpoints.
    fn emit_cell(welder: &mut Welder, cx: f32, cz: f32, step: f32, level: f32, is_outer: bool) {
        let half = step / 2.0;
        let v = |x: f32, z: f32| ClipmapVertex::new(x, level, z);

        let nw = v(cx - half, cz - half);
        let ne = v(cx + half, cz - half);
        let se = v(cx + half, cz + half);
        let sw = v(cx - half, cz + half);

        if is_outer {
            welder.add_triangle(nw, ne, se);
            welder.add_triangle(nw, se, sw);
            return;
        }

        let n = v(cx, cz - half);
        let e = v(cx + half, cz);
        let s = v(cx, cz + half);
        let w = v(cx - half, cz);
        let center = v(cx, cz);

        let ring = [n, ne, e, se, s, sw, w, nw];
        for k in 0..ring.len() {
            let a = ring[k];
            let b = ring[(k + 1) % ring.len()];
            welder.add_triangle(center, a, b);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_single_level_produces_fans() {
        let mesh = ClipmapMesh::build(1, 4);
        assert!(!mesh.vertices.is_empty());
        assert!(!mesh.indices.is_empty());
        assert_eq!(mesh.indices.len() % 3, 0);
    }

    #[test]
    fn test_higher_levels_carve_a_hole() {
        let mesh = ClipmapMesh::build(2, 4);
        // Level 1 must not emit a cell at the origin; that area belongs to level 0.
        let near_origin = mesh
            .vertices
            .iter()
            .filter(|v| v.level() == 1.0 && v.x().abs() < 2.0 && v.z().abs() < 2.0)
            .count();
        assert_eq!(near_origin, 0);
    }

    #[test]
    fn test_vertex_count_grows_with_levels() {
        let one = ClipmapMesh::build(1, 4);
        let two = ClipmapMesh::build(2, 4);
        assert!(two.vertices.len() > one.vertices.len());
    }

    #[test]
    fn test_shared_corners_are_welded() {
        let mesh = ClipmapMesh::build(1, 4);
        let count = mesh.vertices.len();
        let mut dedup = mesh.vertices.clone();
        dedup.dedup();
        dedup.sort_by(|a, b| {
            (a.x(), a.level(), a.z())
                .partial_cmp(&(b.x(), b.level(), b.z()))
                .unwrap()
        });
        dedup.dedup();
        assert_eq!(count, dedup.len());
    }
}
