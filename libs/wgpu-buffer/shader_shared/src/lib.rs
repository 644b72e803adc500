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

// Our shared shader includes expect certain bind groups to be in certain spots.
// Note that these are not unique because we need to stay under 4 and thus re-use heavily.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Group {
    Globals,
    TerrainClipmap,
}

impl Group {
    pub fn index(self) -> u32 {
        match self {
            Self::Globals => 0,
            Self::TerrainClipmap => 1,
        }
    }
}

/// Binding slots within `Group::TerrainClipmap`. Conceptual numbering only, kept stable
/// because the clipmap shader addresses bindings by these slots.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ClipmapBinding {
    LinearClampSampler,
    ActiveHeightmap,
    Noise,
    DiffuseGrass,
    LinearWrapSampler,
    FullWorldHeightmap,
}

impl ClipmapBinding {
    pub fn index(self) -> u32 {
        match self {
            Self::LinearClampSampler => 0,
            Self::ActiveHeightmap => 1,
            Self::Noise => 2,
            Self::DiffuseGrass => 3,
            Self::LinearWrapSampler => 4,
            Self::FullWorldHeightmap => 5,
        }
    }
}
