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
use anyhow::{bail, Result};
use rayon::prelude::*;
use std::{
    fs,
    fs::File,
    io::{stdout, BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};
use structopt::StructOpt;
use terrain::{run_preprocess_to_writer, PreprocessOptions, TileCacheWriter};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "cdlod-preprocess",
    about = "Turn heightmap images into CDLOD chunk files, or re-tile them into the per-tile cache."
)]
enum Opt {
    /// Mesh heightmap images down into CDLOD chunk files (the default pipeline).
    Chunks(ChunksOpt),
    /// Re-tile a heightmap image into the per-tile cache a `TileStreamManager` streams from.
    Retile(RetileOpt),
}

#[derive(Debug, StructOpt)]
struct ChunksOpt {
    /// A single heightmap image, or a directory of them, to preprocess.
    #[structopt(short, long, parse(from_os_str))]
    input: PathBuf,

    /// The directory to write chunk files into.
    #[structopt(short, long, parse(from_os_str))]
    output_directory: PathBuf,

    /// Horizontal sample spacing of the source heightmap, in meters.
    #[structopt(long, default_value = "1.0")]
    meters_per_pixel: f64,

    /// Lowest elevation the source heightmap can encode, in meters.
    #[structopt(long, default_value = "-500")]
    min_height: f32,

    /// Highest elevation the source heightmap can encode, in meters.
    #[structopt(long, default_value = "9000")]
    max_height: f32,

    /// Maximum geometric error tolerated at the coarsest chunk LOD, in meters.
    #[structopt(long, default_value = "2.0")]
    max_base_error: f32,

    /// Use the slower 3D point-to-plane error metric instead of vertical-only error.
    #[structopt(long)]
    use_3d_error: bool,

    /// Overwrite existing chunk files.
    #[structopt(short, long)]
    force: bool,
}

#[derive(Debug, StructOpt)]
struct RetileOpt {
    /// The heightmap image to re-tile.
    #[structopt(short, long, parse(from_os_str))]
    input: PathBuf,

    /// The directory to write `.tile`/`.tilemeta` files into.
    #[structopt(short, long, parse(from_os_str))]
    output_directory: PathBuf,

    /// Name this source is cached and referenced under, e.g. `srtm`.
    #[structopt(long)]
    source: String,

    /// World-space X/Z origin of the image's (0,0) pixel.
    #[structopt(long, number_of_values = 2)]
    origin: Vec<f32>,

    /// World-space min X/Z extent of the terrain this tile belongs to.
    #[structopt(long, number_of_values = 2)]
    world_min: Vec<f32>,

    /// Tile side length in texels.
    #[structopt(long, default_value = "256")]
    tile_size: u32,
}

struct InlinePercentProgress {
    total: usize,
    current: usize,
    start_time: Instant,
}

impl InlinePercentProgress {
    pub fn new(label: &str, total: usize) -> Self {
        print!("{} 000.00%", label);
        stdout().flush().ok();
        Self {
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    pub fn poke(&mut self) {
        self.current += 1;
        let percent = (self.current as f64 / self.total as f64) * 100f64;
        print!(
            "\x1B[7D{:03}.{:02}%",
            percent.floor() as u8,
            ((percent - percent.floor()) * 100f64) as u8
        );
        stdout().flush().ok();
    }

    pub fn finish(&self) {
        println!(", completed in {:?}", self.start_time.elapsed());
    }
}

fn chunk_file_path(output_directory: &Path, src_path: &Path) -> PathBuf {
    let stem = src_path.file_stem().unwrap_or_default();
    output_directory.join(stem).with_extension("chunk")
}

fn preprocess_one(src_path: &Path, out_path: &Path, opts: &PreprocessOptions, force: bool) -> Result<()> {
    if out_path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            out_path.display()
        );
    }
    let mut out = BufWriter::new(File::create(out_path)?);
    run_preprocess_to_writer(src_path, opts, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run_chunks(opt: ChunksOpt) -> Result<()> {
    let opts = PreprocessOptions {
        meters_per_pixel: opt.meters_per_pixel,
        min_height: opt.min_height,
        max_height: opt.max_height,
        max_base_error: opt.max_base_error,
        use_3d_error: opt.use_3d_error,
        ellipsoid: None,
    };

    fs::create_dir_all(&opt.output_directory)?;

    let sources: Vec<PathBuf> = if opt.input.is_dir() {
        let mut paths = fs::read_dir(&opt.input)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect::<Vec<_>>();
        paths.sort();
        paths
    } else {
        vec![opt.input.clone()]
    };

    if sources.is_empty() {
        bail!("no source heightmaps found at {}", opt.input.display());
    }

    let mut progress = InlinePercentProgress::new("preprocessing heightmaps", sources.len());
    let failures: Vec<(PathBuf, anyhow::Error)> = sources
        .par_iter()
        .filter_map(|src_path| {
            let out_path = chunk_file_path(&opt.output_directory, src_path);
            preprocess_one(src_path, &out_path, &opts, opt.force)
                .err()
                .map(|err| (src_path.clone(), err))
        })
        .collect();
    for _ in 0..sources.len() {
        progress.poke();
    }
    progress.finish();

    for (src_path, err) in &failures {
        log::error!("failed to preprocess {}: {}", src_path.display(), err);
    }
    if !failures.is_empty() {
        bail!("{} of {} heightmaps failed to preprocess", failures.len(), sources.len());
    }

    Ok(())
}

fn run_retile(opt: RetileOpt) -> Result<()> {
    if opt.origin.len() != 2 {
        bail!("--origin takes exactly two values, X and Z");
    }
    if opt.world_min.len() != 2 {
        bail!("--world-min takes exactly two values, X and Z");
    }

    fs::create_dir_all(&opt.output_directory)?;
    let written = TileCacheWriter::retile(
        &opt.input,
        &opt.source,
        [opt.origin[0], opt.origin[1]],
        [opt.world_min[0], opt.world_min[1]],
        opt.tile_size,
        &opt.output_directory,
    )?;
    if written == 0 {
        log::info!("{} cache already up to date; nothing written", opt.source);
    } else {
        log::info!("wrote {written} tile payloads for {}", opt.source);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    match Opt::from_args() {
        Opt::Chunks(opt) => run_chunks(opt),
        Opt::Retile(opt) => run_retile(opt),
    }
}
