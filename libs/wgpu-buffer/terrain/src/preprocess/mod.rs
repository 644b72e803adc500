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
//! Offline CDLOD preprocessing pipeline: a heightmap image becomes a chunk file through
//! four stages run in strict sequence.
//!
//! `HeightmapLoader` (here, `Heightmap::load`) -> `ErrorComputer` (LK error update) ->
//! `ActivationPropagator` (quadtree LOD bubbling) -> `ChunkMesher` -> `ChunkFileWriter`.
pub mod activation;
pub mod chunk_file;
pub mod error_compute;
pub mod heightmap;
pub mod mesher;

use crate::error::PreprocessError;
use activation::ActivationPropagator;
use chunk_file::ChunkFileWriter;
use error_compute::ErrorComputer;
use heightmap::{Ellipsoid, Heightmap};
use mesher::{Chunk, ChunkMesher};
use std::io::Write;
use std::path::Path;

/// Parameters for a single offline preprocessing run, one per source heightmap tile.
#[derive(Debug, Clone, Copy)]
pub struct PreprocessOptions {
    pub meters_per_pixel: f64,
    pub min_height: f32,
    pub max_height: f32,
    pub max_base_error: f32,
    pub use_3d_error: bool,
    pub ellipsoid: Option<Ellipsoid>,
}

/// Result of a single run: the finished chunk list plus the tree depth that produced it,
/// so the caller can hand both straight to `ChunkFileWriter::write`.
pub struct PreprocessOutput {
    pub tree_depth: u32,
    pub chunks: Vec<Chunk>,
}

/// Run the full offline pipeline against one heightmap image and return the chunk list
/// ready for serialization. Does not touch the filesystem beyond reading `src_path`.
pub fn run_preprocess(src_path: &Path, opts: &PreprocessOptions) -> Result<PreprocessOutput, PreprocessError> {
    let mut heightmap = Heightmap::load(
        src_path,
        opts.meters_per_pixel,
        opts.min_height,
        opts.max_height,
        opts.ellipsoid,
    )?;

    ErrorComputer::new(opts.max_base_error, opts.use_3d_error).run(&mut heightmap);
    ActivationPropagator::run(&mut heightmap);

    let tree_depth = heightmap.level;
    let chunks = ChunkMesher::new(tree_depth).run(&heightmap);

    Ok(PreprocessOutput { tree_depth, chunks })
}

/// Run the pipeline and serialize the result straight into `out`, for callers that only
/// want the finished chunk file.
pub fn run_preprocess_to_writer(
    src_path: &Path,
    opts: &PreprocessOptions,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let output = run_preprocess(src_path, opts)?;
    ChunkFileWriter::write(out, output.tree_depth as i32, opts.max_base_error, &output.chunks)
}
