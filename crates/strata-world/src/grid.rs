use hashbrown::HashMap;

use strata_blocks::BlockId;
use strata_chunk::{Chunk, ChunkNeighbors, ChunkSnapshot};
use strata_geom::coords::{block_index, global_to_chunk, global_to_local};
use strata_geom::{BlockPos, ChunkCoord};

/// Sparse map of every chunk generated so far. Chunks are never evicted, so
/// edits survive unloading.
#[derive(Default)]
pub struct ChunkGrid {
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkGrid {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, c: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&c)
    }

    #[inline]
    pub fn get_mut(&mut self, c: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&c)
    }

    /// Chunk that generation guarantees to exist.
    pub fn expect(&self, c: ChunkCoord) -> &Chunk {
        match self.chunks.get(&c) {
            Some(ch) => ch,
            None => panic!("chunk ({}, {}) is not in the world", c.cx, c.cy),
        }
    }

    pub fn expect_mut(&mut self, c: ChunkCoord) -> &mut Chunk {
        match self.chunks.get_mut(&c) {
            Some(ch) => ch,
            None => panic!("chunk ({}, {}) is not in the world", c.cx, c.cy),
        }
    }

    pub fn get_or_create(&mut self, c: ChunkCoord) -> &mut Chunk {
        self.chunks.entry(c).or_insert_with(|| Chunk::new(c))
    }

    #[inline]
    pub fn contains(&self, c: ChunkCoord) -> bool {
        self.chunks.contains_key(&c)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Reads one cell by global block coordinate. `g.z` must lie in the
    /// chunk's vertical range.
    pub fn block_at_global(&self, g: BlockPos) -> BlockId {
        let l = global_to_local(g);
        self.expect(global_to_chunk(g))
            .get(l.x as usize, l.y as usize, l.z as usize)
    }

    /// Writes one cell by global block coordinate and returns the owning chunk.
    pub fn set_block_at_global(&mut self, g: BlockPos, id: BlockId) -> ChunkCoord {
        let c = global_to_chunk(g);
        let l = global_to_local(g);
        self.expect_mut(c)
            .set_index(block_index(l.x as usize, l.y as usize, l.z as usize), id);
        c
    }

    pub fn snapshot(&self, c: ChunkCoord) -> ChunkSnapshot {
        self.expect(c).snapshot()
    }

    pub fn neighbors(&self, c: ChunkCoord) -> ChunkNeighbors {
        ChunkNeighbors {
            neg_x: self.snapshot(c.offset(-1, 0)),
            pos_x: self.snapshot(c.offset(1, 0)),
            neg_y: self.snapshot(c.offset(0, -1)),
            pos_y: self.snapshot(c.offset(0, 1)),
        }
    }
}
