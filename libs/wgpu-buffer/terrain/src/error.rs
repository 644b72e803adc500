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
use std::{fmt, path::PathBuf};

/// Fatal failures of the offline preprocessing path. Preprocessing is fail-fast: any of
/// these aborts the whole run with no partial chunk file left behind.
#[derive(Debug)]
pub enum PreprocessError {
    NotFound(PathBuf),
    UnsupportedChannels(u8),
    OutOfMemory,
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(p) => write!(f, "input heightmap not found: {}", p.display()),
            Self::UnsupportedChannels(n) => write!(f, "unsupported channel count: {n}"),
            Self::OutOfMemory => write!(f, "out of memory while building chunk mesh"),
        }
    }
}

impl std::error::Error for PreprocessError {}

/// Non-fatal faults observed on the runtime streaming path. Everything here is logged and
/// the affected tile is simply left un-ready for another frame; nothing here aborts the
/// main thread. `Gpu` is the single kind that should actually be treated as unrecoverable
/// by a caller that chooses to propagate it upward.
#[derive(Debug)]
pub enum TileFault {
    NotFound,
    FormatMismatch,
    ResourceExhausted,
    Gpu(anyhow::Error),
    Logic(&'static str),
}

impl fmt::Display for TileFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "tile cache file not found; treating as empty"),
            Self::FormatMismatch => write!(f, "tile cache metadata version mismatch"),
            Self::ResourceExhausted => write!(f, "chunk pool exhausted; tile deferred"),
            Self::Gpu(e) => write!(f, "gpu error: {e}"),
            Self::Logic(msg) => write!(f, "terrain logic error: {msg}"),
        }
    }
}

impl std::error::Error for TileFault {}
