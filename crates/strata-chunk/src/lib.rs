//! Chunk block storage and generation state.
#![forbid(unsafe_code)]

use std::sync::Arc;

use strata_blocks::{AIR, BlockId};
use strata_geom::coords::{block_index, in_chunk_bounds};
use strata_geom::{BlockPos, CHUNK_VOLUME, ChunkCoord};

/// Generation stage. Ordered so that `a < b` means `a` comes first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ChunkState {
    #[default]
    Empty,
    Heightmapped,
    Populated,
}

#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    state: ChunkState,
    blocks: Arc<Vec<BlockId>>,
}

impl Chunk {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            state: ChunkState::Empty,
            blocks: Arc::new(vec![AIR; CHUNK_VOLUME]),
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Moves the chunk to `next`. Returns `false` and leaves the state alone
    /// if `next` is not strictly later than the current state.
    pub fn advance_state(&mut self, next: ChunkState) -> bool {
        if next <= self.state {
            return false;
        }
        self.state = next;
        true
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.blocks[block_index(x, y, z)]
    }

    /// Bounds-checked read; `None` outside the chunk.
    #[inline]
    pub fn get_local(&self, p: BlockPos) -> Option<BlockId> {
        if !in_chunk_bounds(p) {
            return None;
        }
        Some(self.get(p.x as usize, p.y as usize, p.z as usize))
    }

    #[inline]
    pub fn get_index(&self, i: usize) -> BlockId {
        self.blocks[i]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, id: BlockId) {
        self.set_index(block_index(x, y, z), id);
    }

    /// Writes one cell. Clones the storage first if a snapshot still shares it.
    #[inline]
    pub fn set_index(&mut self, i: usize, id: BlockId) {
        Arc::make_mut(&mut self.blocks)[i] = id;
    }

    /// Mutable access to the whole block array for bulk generation passes.
    pub fn blocks_mut(&mut self) -> &mut [BlockId] {
        Arc::make_mut(&mut self.blocks).as_mut_slice()
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|&b| b != AIR)
    }

    /// Cheap immutable view for background mesh jobs.
    pub fn snapshot(&self) -> ChunkSnapshot {
        ChunkSnapshot {
            coord: self.coord,
            state: self.state,
            blocks: Arc::clone(&self.blocks),
        }
    }
}

/// Read-only copy of a chunk's blocks. Later edits to the source chunk are
/// not visible through it.
#[derive(Clone, Debug)]
pub struct ChunkSnapshot {
    pub coord: ChunkCoord,
    pub state: ChunkState,
    blocks: Arc<Vec<BlockId>>,
}

impl ChunkSnapshot {
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.blocks[block_index(x, y, z)]
    }

    #[inline]
    pub fn get_local(&self, p: BlockPos) -> Option<BlockId> {
        if !in_chunk_bounds(p) {
            return None;
        }
        Some(self.get(p.x as usize, p.y as usize, p.z as usize))
    }

    #[inline]
    pub fn is_empty_at(&self, x: usize, y: usize, z: usize) -> bool {
        self.get(x, y, z) == AIR
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Builds a snapshot straight from a block array; used by tests and
    /// benchmarks that mesh synthetic chunks.
    pub fn from_blocks(coord: ChunkCoord, blocks: Vec<BlockId>) -> Self {
        let mut b = blocks;
        if b.len() != CHUNK_VOLUME {
            b.resize(CHUNK_VOLUME, AIR);
        }
        Self {
            coord,
            state: ChunkState::Populated,
            blocks: Arc::new(b),
        }
    }
}

/// The four lateral neighbours a mesh job needs to cull boundary faces.
#[derive(Clone, Debug)]
pub struct ChunkNeighbors {
    pub neg_x: ChunkSnapshot,
    pub pos_x: ChunkSnapshot,
    pub neg_y: ChunkSnapshot,
    pub pos_y: ChunkSnapshot,
}

impl ChunkNeighbors {
    /// All-air neighbours; every boundary face of the centre chunk is exposed.
    pub fn empty_around(c: ChunkCoord) -> Self {
        let air = |dx, dy| ChunkSnapshot::from_blocks(c.offset(dx, dy), Vec::new());
        Self {
            neg_x: air(-1, 0),
            pos_x: air(1, 0),
            neg_y: air(0, -1),
            pos_y: air(0, 1),
        }
    }
}
