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
//! Turns the active tile set into a GPU-resident heightmap: `AtlasPacker` assigns toroidal
//! slots, `GpuStage` records the per-frame blit/compute/mip/swap sequence.
pub mod gpu_stage;
pub mod packer;

pub use gpu_stage::GpuStage;
pub use packer::{AtlasPacker, AtlasSlot};
