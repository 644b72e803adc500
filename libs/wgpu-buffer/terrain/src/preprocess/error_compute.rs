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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GridPoint {
    x: usize,
    z: usize,
}

/// Lindstrom-Koller binary-triangle-tree error update. Walks the two right triangles
/// tiling the heightfield square, bisecting at the hypotenuse midpoint and recording the
/// vertical (or 3D) error of the coarse approximation against the true sample.
pub struct ErrorComputer {
    max_base_error: f32,
    use_3d_error: bool,
}

impl ErrorComputer {
    pub fn new(max_base_error: f32, use_3d_error: bool) -> Self {
        Self {
            max_base_error,
            use_3d_error,
        }
    }

    pub fn run(&self, heightmap: &mut Heightmap) {
        let last = heightmap.side - 1;
        let apex1 = GridPoint { x: 0, z: 0 };
        let left1 = GridPoint { x: last, z: 0 };
        let right1 = GridPoint { x: 0, z: last };
        self.update(heightmap, apex1, left1, right1);

        let apex2 = GridPoint { x: last, z: last };
        let left2 = GridPoint { x: 0, z: last };
        let right2 = GridPoint { x: last, z: 0 };
        self.update(heightmap, apex2, left2, right2);
    }

    fn update(&self, heightmap: &mut Heightmap, a: GridPoint, l: GridPoint, r: GridPoint) {
        let dx = (l.x as isize - r.x as isize).unsigned_abs();
        let dz = (l.z as isize - r.z as isize).unsigned_abs();
        if dx <= 1 && dz <= 1 {
            return;
        }

        let b = GridPoint {
            x: (l.x + r.x) / 2,
            z: (l.z + r.z) / 2,
        };

        let error = if self.use_3d_error {
            let b_len = heightmap.at(b.x, b.z).world.norm();
            let l_len = heightmap.at(l.x, l.z).world.norm();
            let r_len = heightmap.at(r.x, r.z).world.norm();
            (b_len - (l_len + r_len) / 2.0) as f32
        } else {
            let b_h = heightmap.at(b.x, b.z).height;
            let l_h = heightmap.at(l.x, l.z).height;
            let r_h = heightmap.at(r.x, r.z).height;
            b_h - (l_h + r_h) / 2.0
        };

        let sample = heightmap.at_mut(b.x, b.z);
        sample.error = error;
        if error.abs() >= self.max_base_error {
            let level = ((error.abs() / self.max_base_error).log2() + 0.5).floor() as i32;
            sample.activation = sample.activation.max(level);
        }

        self.update(heightmap, b, a, r);
        self.update(heightmap, b, l, a);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_flat_heightmap_has_no_error() {
        let mut hm = Heightmap::zeroed(3, 1.0);
        ErrorComputer::new(1.0, false).run(&mut hm);
        for z in 0..hm.side {
            for x in 0..hm.side {
                let s = hm.at(x, z);
                assert_eq!(s.error, 0.0);
                assert_eq!(s.activation, -1);
            }
        }
    }

    #[test]
    fn test_center_peak_activation_level() {
        let mut hm = Heightmap::zeroed(9, 1.0);
        let mid = hm.side / 2;
        hm.set_peak(mid, mid, 1000.0);
        ErrorComputer::new(100.0, false).run(&mut hm);
        assert_eq!(hm.at(mid, mid).activation, 3);
    }

    #[test]
    fn test_idempotent_on_rerun() {
        let mut hm = Heightmap::zeroed(9, 1.0);
        let mid = hm.side / 2;
        hm.set_peak(mid, mid, 1000.0);
        let computer = ErrorComputer::new(100.0, false);
        computer.run(&mut hm);
        let first: Vec<(f32, i32)> = (0..hm.side * hm.side)
            .map(|i| {
                let s = hm.at(i % hm.side, i / hm.side);
                (s.error, s.activation)
            })
            .collect();
        computer.run(&mut hm);
        let second: Vec<(f32, i32)> = (0..hm.side * hm.side)
            .map(|i| {
                let s = hm.at(i % hm.side, i / hm.side);
                (s.error, s.activation)
            })
            .collect();
        assert_eq!(first, second);
    }
}
