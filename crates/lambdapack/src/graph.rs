use lambdapack_common::{Chunk, ChunkIdx};
use oxc_index::IndexVec;

#[derive(Debug, Default)]
pub struct ChunkGraph {
  pub chunk_table: IndexVec<ChunkIdx, Chunk>,
}

impl ChunkGraph {
  pub fn add_chunk(&mut self, chunk: Chunk) -> ChunkIdx {
    self.chunk_table.push(chunk)
  }
}
