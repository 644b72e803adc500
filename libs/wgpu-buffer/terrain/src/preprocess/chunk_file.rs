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
use crate::preprocess::mesher::Chunk;
use anyhow::{bail, ensure, Result};
use packed_struct::{packed_struct, zerocopy::AsBytes};
use std::io::Write;

#[packed_struct]
#[derive(Copy, Clone, Debug)]
struct ChunkFileHeader {
    tree_depth: i32,
    max_base_error: f32,
    chunk_count: u32,
}

pub struct ChunkFileWriter;

impl ChunkFileWriter {
    /// Serialize the header followed by every chunk record, in the order produced by
    /// `ChunkMesher` (which already walks nw, ne, sw, se).
    pub fn write(out: &mut impl Write, tree_depth: i32, max_base_error: f32, chunks: &[Chunk]) -> Result<()> {
        let header = ChunkFileHeader {
            tree_depth,
            max_base_error,
            chunk_count: chunks.len() as u32,
        };
        let mut buf = Vec::new();
        buf.extend_from_slice(header.as_bytes());

        for chunk in chunks {
            buf.extend_from_slice(&chunk.node_label.to_le_bytes());
            buf.extend_from_slice(&chunk.level.to_le_bytes());
            for v in chunk.bbox_min.iter().chain(chunk.bbox_max.iter()) {
                buf.extend_from_slice(&v.to_le_bytes());
            }
            buf.extend_from_slice(&(chunk.vertices.len() as u32).to_le_bytes());
            for v in &chunk.vertices {
                for c in v {
                    buf.extend_from_slice(&c.to_le_bytes());
                }
            }
            buf.extend_from_slice(&(chunk.indices.len() as u32).to_le_bytes());
            for i in &chunk.indices {
                buf.extend_from_slice(&i.to_le_bytes());
            }
        }

        out.write_all(&buf)?;
        Ok(())
    }
}

pub struct ChunkFileReader;

impl ChunkFileReader {
    pub fn read(data: &[u8]) -> Result<(i32, f32, Vec<Chunk>)> {
        ensure!(data.len() >= 12, "chunk file truncated before header");
        let mut cursor = 0usize;
        let tree_depth = read_i32(data, &mut cursor);
        let max_base_error = read_f32(data, &mut cursor);
        let chunk_count = read_u32(data, &mut cursor);

        let mut chunks = Vec::with_capacity(chunk_count as usize);
        for _ in 0..chunk_count {
            let node_label = read_i32(data, &mut cursor);
            let level = read_i32(data, &mut cursor);
            let mut bbox_min = [0f32; 3];
            let mut bbox_max = [0f32; 3];
            for v in bbox_min.iter_mut() {
                *v = read_f32(data, &mut cursor);
            }
            for v in bbox_max.iter_mut() {
                *v = read_f32(data, &mut cursor);
            }
            let vertex_count = read_u32(data, &mut cursor);
            let mut vertices = Vec::with_capacity(vertex_count as usize);
            for _ in 0..vertex_count {
                let mut p = [0f32; 3];
                for v in p.iter_mut() {
                    *v = read_f32(data, &mut cursor);
                }
                vertices.push(p);
            }
            let index_count = read_u32(data, &mut cursor);
            let mut indices = Vec::with_capacity(index_count as usize);
            for _ in 0..index_count {
                indices.push(read_u32(data, &mut cursor));
            }
            chunks.push(Chunk {
                node_label,
                level,
                bbox_min,
                bbox_max,
                vertices,
                indices,
            });
        }

        if cursor > data.len() {
            bail!("chunk file truncated mid-record");
        }

        Ok((tree_depth, max_base_error, chunks))
    }
}

fn read_i32(data: &[u8], cursor: &mut usize) -> i32 {
    let v = i32::from_le_bytes(data[*cursor..*cursor + 4].try_into().unwrap());
    *cursor += 4;
    v
}

fn read_u32(data: &[u8], cursor: &mut usize) -> u32 {
    let v = u32::from_le_bytes(data[*cursor..*cursor + 4].try_into().unwrap());
    *cursor += 4;
    v
}

fn read_f32(data: &[u8], cursor: &mut usize) -> f32 {
    let v = f32::from_le_bytes(data[*cursor..*cursor + 4].try_into().unwrap());
    *cursor += 4;
    v
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_chunks() -> Vec<Chunk> {
        vec![Chunk {
            node_label: 1,
            level: 0,
            bbox_min: [0.0, 0.0, 0.0],
            bbox_max: [1.0, 1.0, 1.0],
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            indices: vec![0, 1, 2],
        }]
    }

    #[test]
    fn test_round_trip() {
        let chunks = sample_chunks();
        let mut buf = Vec::new();
        ChunkFileWriter::write(&mut buf, 3, 1.5, &chunks).unwrap();
        let (depth, max_base_error, read_chunks) = ChunkFileReader::read(&buf).unwrap();
        assert_eq!(depth, 3);
        assert_eq!(max_base_error, 1.5);
        assert_eq!(read_chunks.len(), chunks.len());
        assert_eq!(read_chunks[0].vertices, chunks[0].vertices);
        assert_eq!(read_chunks[0].indices, chunks[0].indices);
        assert_eq!(read_chunks[0].bbox_min, chunks[0].bbox_min);
        assert_eq!(read_chunks[0].bbox_max, chunks[0].bbox_max);
    }
}
