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
use crate::error::PreprocessError;
use nalgebra::Vector3;
use std::path::Path;

/// One grid vertex of the offline heightfield. `error` and `activation` are filled in by
/// the later `error_compute`/`activation` passes; `load` only populates height and world
/// position.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub height: f32,
    pub world: Vector3<f64>,
    pub error: f32,
    pub activation: i32,
}

impl Sample {
    fn new(height: f32, world: Vector3<f64>) -> Self {
        Self {
            height,
            world,
            error: 0.0,
            activation: -1,
        }
    }
}

/// An optional ellipsoid to project samples onto, for `use3dErrorCalc`.
#[derive(Debug, Clone, Copy)]
pub struct Ellipsoid {
    pub center: Vector3<f64>,
    pub radius: f64,
}

/// A square grid of `side = 2^level + 1` samples, padded from the source image with zeros.
#[derive(Debug, Clone)]
pub struct Heightmap {
    pub side: usize,
    pub level: u32,
    pub meters_per_pixel: f64,
    pub ellipsoid: Option<Ellipsoid>,
    samples: Vec<Sample>,
}

impl Heightmap {
    /// Smallest `L` such that `2^L + 1 >= min_side`.
    fn level_for(min_side: u32) -> u32 {
        let mut level = 0;
        while (1u32 << level) + 1 < min_side {
            level += 1;
        }
        level
    }

    pub fn load(
        path: &Path,
        meters_per_pixel: f64,
        min_height: f32,
        max_height: f32,
        ellipsoid: Option<Ellipsoid>,
    ) -> Result<Self, PreprocessError> {
        if !path.exists() {
            return Err(PreprocessError::NotFound(path.to_owned()));
        }
        let img = image::open(path).map_err(|_| PreprocessError::NotFound(path.to_owned()))?;
        let gray = img.to_luma16();
        let (w, h) = (gray.width(), gray.height());
        let level = Self::level_for(w.max(h));
        let side = (1usize << level) + 1;

        let mut samples = Vec::with_capacity(side * side);
        let range = max_height - min_height;
        for z in 0..side {
            for x in 0..side {
                let raw = if x < w as usize && z < h as usize {
                    gray.get_pixel(x as u32, z as u32).0[0]
                } else {
                    0
                };
                let height = min_height + range * (raw as f32 / 65535.0);
                let wx = x as f64 * meters_per_pixel;
                let wz = z as f64 * meters_per_pixel;
                let world = match ellipsoid {
                    Some(e) => {
                        let dir = Vector3::new(wx, height as f64, wz).normalize();
                        e.center + dir * (e.radius + height as f64)
                    }
                    None => Vector3::new(wx, height as f64, wz),
                };
                samples.push(Sample::new(height, world));
            }
        }

        Ok(Self {
            side,
            level,
            meters_per_pixel,
            ellipsoid,
            samples,
        })
    }

    /// Build an all-zero heightmap of the given `side` directly, for tests that do not
    /// want to round-trip through an image file.
    pub fn zeroed(level: u32, meters_per_pixel: f64) -> Self {
        let side = (1usize << level) + 1;
        let samples = (0..side * side)
            .map(|i| {
                let x = (i % side) as f64 * meters_per_pixel;
                let z = (i / side) as f64 * meters_per_pixel;
                Sample::new(0.0, Vector3::new(x, 0.0, z))
            })
            .collect();
        Self {
            side,
            level,
            meters_per_pixel,
            ellipsoid: None,
            samples,
        }
    }

    #[inline]
    pub fn at(&self, x: usize, z: usize) -> &Sample {
        &self.samples[z * self.side + x]
    }

    #[inline]
    pub fn at_mut(&mut self, x: usize, z: usize) -> &mut Sample {
        &mut self.samples[z * self.side + x]
    }

    pub fn set_peak(&mut self, x: usize, z: usize, height: f32) {
        let s = self.at_mut(x, z);
        s.height = height;
        s.world.y = height as f64;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(Heightmap::level_for(513), 9);
        assert_eq!(Heightmap::level_for(512), 9);
        assert_eq!(Heightmap::level_for(257), 8);
    }

    #[test]
    fn test_zeroed_shape() {
        let hm = Heightmap::zeroed(9, 1.0);
        assert_eq!(hm.side, 513);
        assert_eq!(hm.at(0, 0).height, 0.0);
    }
}
