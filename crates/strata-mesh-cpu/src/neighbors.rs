use strata_blocks::{AIR, BlockId};
use strata_chunk::{ChunkNeighbors, ChunkSnapshot};
use strata_geom::{CHUNK_HEIGHT, CHUNK_WIDTH};

/// Block lookup for a chunk that may step one cell into a lateral
/// neighbour. Only axis-aligned steps are needed, so diagonals never occur.
pub struct NeighborView<'a> {
    pub center: &'a ChunkSnapshot,
    pub neighbors: &'a ChunkNeighbors,
}

/// What lies beyond a face.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Beyond {
    Block(BlockId),
    /// Outside the vertical range of the world; treated as open.
    Void,
    /// Lateral chunk edge with neighbour lookup disabled.
    Edge,
}

impl<'a> NeighborView<'a> {
    pub fn new(center: &'a ChunkSnapshot, neighbors: &'a ChunkNeighbors) -> Self {
        Self { center, neighbors }
    }

    pub fn at(&self, x: i32, y: i32, z: i32, show_chunk_edges: bool) -> Beyond {
        if !(0..CHUNK_HEIGHT).contains(&z) {
            return Beyond::Void;
        }
        let w = CHUNK_WIDTH;
        let inside_x = (0..w).contains(&x);
        let inside_y = (0..w).contains(&y);
        if inside_x && inside_y {
            return Beyond::Block(self.center.get(x as usize, y as usize, z as usize));
        }
        if show_chunk_edges {
            return Beyond::Edge;
        }
        let (snap, lx, ly) = if x < 0 {
            (&self.neighbors.neg_x, x + w, y)
        } else if x >= w {
            (&self.neighbors.pos_x, x - w, y)
        } else if y < 0 {
            (&self.neighbors.neg_y, x, y + w)
        } else {
            (&self.neighbors.pos_y, x, y - w)
        };
        Beyond::Block(snap.get(lx as usize, ly as usize, z as usize))
    }

    #[inline]
    pub fn is_open(&self, x: i32, y: i32, z: i32, show_chunk_edges: bool) -> bool {
        match self.at(x, y, z, show_chunk_edges) {
            Beyond::Block(id) => id == AIR,
            Beyond::Void | Beyond::Edge => true,
        }
    }
}
