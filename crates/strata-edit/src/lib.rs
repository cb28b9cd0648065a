//! Edit target resolution and per-chunk revision tracking.
#![forbid(unsafe_code)]

use std::collections::HashMap;

use strata_geom::coords::{block_index, in_chunk_bounds, world_to_chunk, world_to_local};
use strata_geom::{BlockPos, CHUNK_WIDTH, ChunkCoord, Vec3};

/// The cell a world-space edit lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditTarget {
    pub chunk: ChunkCoord,
    pub local: BlockPos,
    pub index: usize,
}

impl EditTarget {
    /// Resolves a world point. `None` if it lies above or below the world.
    pub fn resolve(p: Vec3) -> Option<Self> {
        let chunk = world_to_chunk(p);
        let local = world_to_local(p);
        if !in_chunk_bounds(local) {
            return None;
        }
        Some(Self {
            chunk,
            local,
            index: block_index(local.x as usize, local.y as usize, local.z as usize),
        })
    }

    /// Lateral neighbours sharing a boundary with this cell: none for an
    /// interior cell, one on an edge, two on a corner.
    pub fn border_neighbors(&self) -> Vec<ChunkCoord> {
        let mut out = Vec::with_capacity(2);
        let last = CHUNK_WIDTH - 1;
        if self.local.x == 0 {
            out.push(self.chunk.offset(-1, 0));
        } else if self.local.x == last {
            out.push(self.chunk.offset(1, 0));
        }
        if self.local.y == 0 {
            out.push(self.chunk.offset(0, -1));
        } else if self.local.y == last {
            out.push(self.chunk.offset(0, 1));
        }
        out
    }

    /// The edited chunk followed by its border neighbours.
    pub fn affected_chunks(&self) -> Vec<ChunkCoord> {
        let mut out = vec![self.chunk];
        out.extend(self.border_neighbors());
        out
    }
}

/// Change tracking: every block change stamps the chunks whose meshes it
/// invalidates with a new, monotonically increasing revision.
#[derive(Default, Debug)]
pub struct EditRevisions {
    rev: HashMap<ChunkCoord, u64>,
    built: HashMap<ChunkCoord, u64>,
    counter: u64,
}

impl EditRevisions {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_stamp(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(1).max(1);
        self.counter
    }

    /// Marks one chunk changed and returns its new revision.
    pub fn bump(&mut self, c: ChunkCoord) -> u64 {
        let stamp = self.next_stamp();
        self.rev.insert(c, stamp);
        stamp
    }

    /// Marks the target chunk and any border neighbours with one shared stamp.
    pub fn bump_region_around(&mut self, target: &EditTarget) -> u64 {
        let stamp = self.next_stamp();
        for c in target.affected_chunks() {
            self.rev.insert(c, stamp);
        }
        stamp
    }

    /// Latest requested revision; zero for a chunk never edited.
    #[inline]
    pub fn rev(&self, c: ChunkCoord) -> u64 {
        self.rev.get(&c).copied().unwrap_or(0)
    }

    pub fn mark_built(&mut self, c: ChunkCoord, rev: u64) {
        let e = self.built.entry(c).or_insert(0);
        if rev > *e {
            *e = rev;
        }
    }

    #[inline]
    pub fn built_rev(&self, c: ChunkCoord) -> u64 {
        self.built.get(&c).copied().unwrap_or(0)
    }

    pub fn needs_rebuild(&self, c: ChunkCoord) -> bool {
        self.rev(c) > self.built_rev(c)
    }

    /// Whether a mesh built from revision `rev` is older than the block data.
    #[inline]
    pub fn is_stale(&self, c: ChunkCoord, rev: u64) -> bool {
        rev < self.rev(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_points_outside_vertical_range() {
        assert!(EditTarget::resolve(Vec3::new(0.5, 0.5, 0.5)).is_none());
        assert!(EditTarget::resolve(Vec3::new(0.5, -64.5, 0.5)).is_none());
        let t = EditTarget::resolve(Vec3::new(0.5, -0.5, 0.5)).unwrap();
        assert_eq!(t.local, BlockPos::new(8, 8, 63));
        assert_eq!(t.index, 63 * 256 + 8 * 16 + 8);
    }

    #[test]
    fn border_cells_name_their_neighbours() {
        // world x = 7.5 is the last column of chunk 0
        let t = EditTarget::resolve(Vec3::new(7.5, -20.0, 0.5)).unwrap();
        assert_eq!(t.chunk, ChunkCoord::new(0, 0));
        assert_eq!(t.local.x, 15);
        assert_eq!(t.affected_chunks(), vec![ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]);

        let interior = EditTarget::resolve(Vec3::new(1.5, -20.0, 1.5)).unwrap();
        assert!(interior.border_neighbors().is_empty());

        // local (0, 0) of chunk (0, 0) sits at world (-8, -8)
        let corner = EditTarget::resolve(Vec3::new(-7.5, -20.0, -7.5)).unwrap();
        assert_eq!(
            corner.border_neighbors(),
            vec![ChunkCoord::new(-1, 0), ChunkCoord::new(0, -1)]
        );
    }

    #[test]
    fn region_bump_stamps_edge_neighbour_only() {
        let mut revs = EditRevisions::new();
        let t = EditTarget::resolve(Vec3::new(7.5, -20.0, 0.5)).unwrap();
        let stamp = revs.bump_region_around(&t);
        assert_eq!(revs.rev(ChunkCoord::new(0, 0)), stamp);
        assert_eq!(revs.rev(ChunkCoord::new(1, 0)), stamp);
        assert_eq!(revs.rev(ChunkCoord::new(-1, 0)), 0);
        assert!(revs.needs_rebuild(ChunkCoord::new(1, 0)));

        revs.mark_built(ChunkCoord::new(1, 0), stamp);
        assert!(!revs.needs_rebuild(ChunkCoord::new(1, 0)));
        revs.mark_built(ChunkCoord::new(1, 0), stamp - 1);
        assert_eq!(revs.built_rev(ChunkCoord::new(1, 0)), stamp);
    }

    #[test]
    fn stamps_increase_and_old_meshes_go_stale() {
        let mut revs = EditRevisions::new();
        let c = ChunkCoord::new(3, 3);
        assert!(!revs.is_stale(c, 0));
        let a = revs.bump(c);
        let b = revs.bump(ChunkCoord::new(9, 9));
        let d = revs.bump(c);
        assert!(a < b && b < d);
        assert!(revs.is_stale(c, a));
        assert!(!revs.is_stale(c, d));
    }
}
