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
use crate::error::TileFault;
use anyhow::{Context, Result};
use catalog::Catalog;
use std::fs;
use std::path::Path;

const CACHE_VERSION: u32 = 1;

/// Alignment metadata for one source heightmap's tiling. Cache is invalidated whenever a
/// freshly computed value disagrees with what is on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetadata {
    pub version: u32,
    pub x_alignment: u32,
    pub y_alignment: u32,
}

impl CacheMetadata {
    pub fn new(x_alignment: u32, y_alignment: u32) -> Self {
        Self {
            version: CACHE_VERSION,
            x_alignment,
            y_alignment,
        }
    }

    pub fn to_bytes(self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..8].copy_from_slice(&self.x_alignment.to_le_bytes());
        out[8..12].copy_from_slice(&self.y_alignment.to_le_bytes());
        out
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, TileFault> {
        if data.len() < 12 {
            return Err(TileFault::FormatMismatch);
        }
        let version = u32::from_le_bytes(data[0..4].try_into().unwrap());
        if version != CACHE_VERSION {
            return Err(TileFault::FormatMismatch);
        }
        Ok(Self {
            version,
            x_alignment: u32::from_le_bytes(data[4..8].try_into().unwrap()),
            y_alignment: u32::from_le_bytes(data[8..12].try_into().unwrap()),
        })
    }

    /// Whether this metadata still matches a freshly computed alignment for the same
    /// source image; a mismatch means the cache must be invalidated and regenerated.
    pub fn matches(&self, x_alignment: u32, y_alignment: u32) -> bool {
        self.version == CACHE_VERSION && self.x_alignment == x_alignment && self.y_alignment == y_alignment
    }
}

pub fn metadata_file_name(source: &str) -> String {
    format!("{source}.tilemeta")
}

pub fn payload_file_name(source: &str, tile_size: u32, i: i32, j: i32) -> String {
    format!("tile_{source}_{tile_size}_{i}_{j}.tile")
}

/// Runtime-side reader: fetches one tile's raw sample payload from the catalog. A missing
/// file is not an error; it is an empty tile, per the `NotFound` runtime-path policy.
pub struct TileCacheReader<'a> {
    catalog: &'a Catalog,
}

impl<'a> TileCacheReader<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Read `tile_size * tile_size * sizeof(u16)` bytes for the named tile, or a zeroed
    /// buffer of the same size if the payload file does not exist.
    pub fn read_payload(&self, name: &str, tile_size: u32) -> Vec<u8> {
        let expected_len = (tile_size * tile_size * 2) as usize;
        match self.catalog.read_name_sync(name) {
            Ok(bytes) => bytes.into_owned(),
            Err(err) => {
                log::warn!("falling back to a flat tile, {} did not load: {}", name, err);
                vec![0u8; expected_len]
            }
        }
    }

    pub fn read_metadata(&self, source: &str) -> Result<CacheMetadata, TileFault> {
        let name = metadata_file_name(source);
        let bytes = self
            .catalog
            .read_name_sync(&name)
            .map_err(|_| TileFault::NotFound)?;
        CacheMetadata::from_bytes(&bytes)
    }
}

/// Offline re-tiling: turns one arbitrarily-sized source heightmap, placed at a
/// world-space origin, into the per-tile cache files a `TileCacheReader` later serves.
/// Writes straight to the filesystem rather than through `Catalog`, matching the
/// write side of the chunk-file pipeline (`catalog` is read-only).
pub struct TileCacheWriter;

impl TileCacheWriter {
    /// `alignmentOffset = (originXZ - worldMin) mod tileSize`, in texels: how far the
    /// source image's first pixel sits past the nearest coarser tile boundary.
    pub fn alignment_offset(origin_xz: [f32; 2], world_min: [f32; 2], tile_size: u32) -> (u32, u32) {
        let dx = (origin_xz[0] - world_min[0]).rem_euclid(tile_size as f32);
        let dz = (origin_xz[1] - world_min[1]).rem_euclid(tile_size as f32);
        (dx.round() as u32, dz.round() as u32)
    }

    /// Re-tile `path` into `out_dir`. Skips regeneration (returning `0`) when the
    /// directory already holds metadata matching the freshly computed alignment; the
    /// cache is only ever invalidated by a mismatch, never by a timestamp check.
    ///
    /// Steps, per the offline re-tiling flow: compute alignment, bail out early on a
    /// cache hit, otherwise scale the source to 16-bit, tile into
    /// `ceil((imageSize + alignment) / tileSize)` cells each way with zero-padding
    /// outside the source bounds, and write one payload per tile plus one metadata file.
    pub fn retile(
        path: &Path,
        source: &str,
        origin_xz: [f32; 2],
        world_min: [f32; 2],
        tile_size: u32,
        out_dir: &Path,
    ) -> Result<usize> {
        let (x_alignment, y_alignment) = Self::alignment_offset(origin_xz, world_min, tile_size);

        let meta_path = out_dir.join(metadata_file_name(source));
        if let Ok(existing) = fs::read(&meta_path) {
            if let Ok(meta) = CacheMetadata::from_bytes(&existing) {
                if meta.matches(x_alignment, y_alignment) {
                    return Ok(0);
                }
            }
        }

        let img = image::open(path)
            .with_context(|| format!("loading heightmap source {}", path.display()))?;
        // `to_luma16` already does the 8-bit `x(65535/255)` / float `x65535` scaling.
        let gray = img.to_luma16();
        let (image_w, image_h) = (gray.width(), gray.height());

        let tiles_x = ((image_w + x_alignment) as f32 / tile_size as f32).ceil() as u32;
        let tiles_z = ((image_h + y_alignment) as f32 / tile_size as f32).ceil() as u32;

        fs::create_dir_all(out_dir)
            .with_context(|| format!("creating tile cache directory {}", out_dir.display()))?;

        let mut written = 0usize;
        for j in 0..tiles_z {
            for i in 0..tiles_x {
                let mut payload = vec![0u8; (tile_size * tile_size * 2) as usize];
                for ty in 0..tile_size {
                    let sy = j * tile_size + ty;
                    if sy < y_alignment {
                        continue;
                    }
                    let src_y = sy - y_alignment;
                    if src_y >= image_h {
                        continue;
                    }
                    for tx in 0..tile_size {
                        let sx = i * tile_size + tx;
                        if sx < x_alignment {
                            continue;
                        }
                        let src_x = sx - x_alignment;
                        if src_x >= image_w {
                            continue;
                        }
                        let value = gray.get_pixel(src_x, src_y).0[0];
                        let offset = ((ty * tile_size + tx) * 2) as usize;
                        payload[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
                    }
                }
                let name = payload_file_name(source, tile_size, i as i32, j as i32);
                fs::write(out_dir.join(&name), &payload)
                    .with_context(|| format!("writing tile payload {name}"))?;
                written += 1;
            }
        }

        let meta = CacheMetadata::new(x_alignment, y_alignment);
        fs::write(&meta_path, meta.to_bytes())
            .with_context(|| format!("writing tile cache metadata {}", meta_path.display()))?;

        Ok(written)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_metadata_round_trip() {
        let meta = CacheMetadata::new(3, 7);
        let bytes = meta.to_bytes();
        let back = CacheMetadata::from_bytes(&bytes).unwrap();
        assert_eq!(meta, back);
    }

    #[test]
    fn test_metadata_version_mismatch() {
        let mut bytes = CacheMetadata::new(1, 1).to_bytes();
        bytes[0] = 2;
        assert!(matches!(
            CacheMetadata::from_bytes(&bytes),
            Err(TileFault::FormatMismatch)
        ));
    }

    #[test]
    fn test_payload_file_name_format() {
        assert_eq!(payload_file_name("srtm", 256, 3, -1), "tile_srtm_256_3_-1.tile");
    }

    #[test]
    fn test_alignment_offset_wraps_negative_origin() {
        // dx = -10 - (-1024) = 1014, 1014 mod 256 = 246; dz = 5 - (-1024) = 1029, mod 256 = 5.
        let offset = TileCacheWriter::alignment_offset([-10.0, 5.0], [-1024.0, -1024.0], 256);
        assert_eq!(offset, (246, 5));
    }

    fn scratch_dir(label: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("terrain_tile_cache_test_{label}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_retile_writes_payload_and_metadata() {
        let dir = scratch_dir("retile_basic");
        let src_path = dir.join("source.png");
        fs::create_dir_all(&dir).unwrap();

        let img = image::GrayImage::from_fn(300, 300, |x, y| image::Luma([((x + y) % 256) as u8]));
        img.save(&src_path).unwrap();

        let written = TileCacheWriter::retile(&src_path, "srtm", [0.0, 0.0], [0.0, 0.0], 256, &dir).unwrap();
        // ceil(300/256) = 2 tiles each way.
        assert_eq!(written, 4);

        let meta_bytes = fs::read(dir.join(metadata_file_name("srtm"))).unwrap();
        let meta = CacheMetadata::from_bytes(&meta_bytes).unwrap();
        assert!(meta.matches(0, 0));

        let payload = fs::read(dir.join(payload_file_name("srtm", 256, 0, 0))).unwrap();
        assert_eq!(payload.len(), 256 * 256 * 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_retile_skips_matching_cache() {
        let dir = scratch_dir("retile_skip");
        let src_path = dir.join("source.png");
        fs::create_dir_all(&dir).unwrap();
        let img = image::GrayImage::from_pixel(64, 64, image::Luma([10]));
        img.save(&src_path).unwrap();

        let first = TileCacheWriter::retile(&src_path, "flat", [0.0, 0.0], [0.0, 0.0], 256, &dir).unwrap();
        assert_eq!(first, 1);
        let second = TileCacheWriter::retile(&src_path, "flat", [0.0, 0.0], [0.0, 0.0], 256, &dir).unwrap();
        assert_eq!(second, 0);

        fs::remove_dir_all(&dir).ok();
    }
}
