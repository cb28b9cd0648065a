//! Conversions between world positions, chunk coordinates, chunk-local
//! block coordinates, global block coordinates and flat block indices.
//!
//! A chunk `c` covers world x in `[16*cx - 8, 16*cx + 8)` and world z in
//! `[16*cy - 8, 16*cy + 8)`. Block space is z-up with z in `[0, 64)`;
//! world y equals block z minus [`VERTICAL_OFFSET`].

use serde::{Deserialize, Serialize};

use crate::Vec3;

pub const CHUNK_WIDTH: i32 = 16;
pub const CHUNK_HEIGHT: i32 = 64;
pub const CHUNK_VOLUME: usize = (CHUNK_WIDTH * CHUNK_WIDTH * CHUNK_HEIGHT) as usize;
pub const VERTICAL_OFFSET: i32 = 64;

const HALF_WIDTH: i32 = CHUNK_WIDTH / 2;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
        }
    }

    /// Chebyshev distance; the streaming and generation areas are squares.
    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.cx - other.cx).abs().max((self.cy - other.cy).abs())
    }

    /// All coordinates within `radius` of `self`, inclusive square, row-major.
    pub fn square(self, radius: i32) -> impl Iterator<Item = ChunkCoord> {
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| self.offset(dx, dy)))
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy)
    }
}

/// Integer block position. Used both for chunk-local coordinates
/// (x,y in `[0,16)`, z in `[0,64)`) and for global block coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl core::ops::Add for BlockPos {
    type Output = BlockPos;
    #[inline]
    fn add(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Global block containing `p`. Each axis is floored once, so chunk and
/// local coordinates derived from it always agree.
#[inline]
pub fn world_to_global(p: Vec3) -> BlockPos {
    BlockPos::new(
        p.x.floor() as i32,
        p.z.floor() as i32,
        p.y.floor() as i32 + VERTICAL_OFFSET,
    )
}

#[inline]
pub fn world_to_chunk(p: Vec3) -> ChunkCoord {
    global_to_chunk(world_to_global(p))
}

#[inline]
pub fn world_to_local(p: Vec3) -> BlockPos {
    global_to_local(world_to_global(p))
}

/// Centre of the block at `local` inside `chunk`.
#[inline]
pub fn local_to_world(local: BlockPos, chunk: ChunkCoord) -> Vec3 {
    Vec3::new(
        (CHUNK_WIDTH * chunk.cx + local.x - HALF_WIDTH) as f32 + 0.5,
        (local.z - VERTICAL_OFFSET) as f32 + 0.5,
        (CHUNK_WIDTH * chunk.cy + local.y - HALF_WIDTH) as f32 + 0.5,
    )
}

#[inline]
pub fn local_to_global(local: BlockPos, chunk: ChunkCoord) -> BlockPos {
    BlockPos::new(
        CHUNK_WIDTH * chunk.cx + local.x - HALF_WIDTH,
        CHUNK_WIDTH * chunk.cy + local.y - HALF_WIDTH,
        local.z,
    )
}

#[inline]
pub fn global_to_chunk(g: BlockPos) -> ChunkCoord {
    ChunkCoord::new(
        (g.x + HALF_WIDTH).div_euclid(CHUNK_WIDTH),
        (g.y + HALF_WIDTH).div_euclid(CHUNK_WIDTH),
    )
}

#[inline]
pub fn global_to_local(g: BlockPos) -> BlockPos {
    BlockPos::new(
        (g.x + HALF_WIDTH).rem_euclid(CHUNK_WIDTH),
        (g.y + HALF_WIDTH).rem_euclid(CHUNK_WIDTH),
        g.z,
    )
}

#[inline]
pub fn global_to_world(g: BlockPos) -> Vec3 {
    Vec3::new(
        g.x as f32 + 0.5,
        (g.z - VERTICAL_OFFSET) as f32 + 0.5,
        g.y as f32 + 0.5,
    )
}

/// World position of a chunk's render handle.
#[inline]
pub fn chunk_origin(c: ChunkCoord) -> Vec3 {
    Vec3::new((CHUNK_WIDTH * c.cx) as f32, 0.0, (CHUNK_WIDTH * c.cy) as f32)
}

#[inline]
pub fn in_chunk_bounds(local: BlockPos) -> bool {
    (0..CHUNK_WIDTH).contains(&local.x)
        && (0..CHUNK_WIDTH).contains(&local.y)
        && (0..CHUNK_HEIGHT).contains(&local.z)
}

#[inline]
pub const fn block_index(x: usize, y: usize, z: usize) -> usize {
    z * (CHUNK_WIDTH * CHUNK_WIDTH) as usize + y * CHUNK_WIDTH as usize + x
}

#[inline]
pub const fn index_to_local(i: usize) -> BlockPos {
    let w = CHUNK_WIDTH as usize;
    BlockPos::new((i % w) as i32, ((i / w) % w) as i32, (i / (w * w)) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_spans_are_half_open() {
        assert_eq!(world_to_chunk(Vec3::new(-8.0, 0.0, 0.0)), ChunkCoord::new(0, 0));
        assert_eq!(world_to_chunk(Vec3::new(7.99, 0.0, 7.99)), ChunkCoord::new(0, 0));
        assert_eq!(world_to_chunk(Vec3::new(8.0, 0.0, -8.01)), ChunkCoord::new(1, -1));
        assert_eq!(world_to_local(Vec3::new(8.0, -64.0, -8.0)), BlockPos::new(0, 0, 0));
        assert_eq!(world_to_local(Vec3::new(7.5, -0.5, 7.5)), BlockPos::new(15, 15, 63));
    }

    #[test]
    fn points_just_below_a_boundary_stay_in_their_chunk() {
        // x / 16 + 0.5 rounds to 1.0 in f32
        let p = Vec3::new(7.999_999_5, -20.0, -8.000_000_5);
        assert_eq!(world_to_chunk(p), ChunkCoord::new(0, -1));
        assert_eq!(world_to_local(p), BlockPos::new(15, 15, 44));
        assert_eq!(world_to_global(p), BlockPos::new(7, -9, 44));
        assert!(in_chunk_bounds(world_to_local(p)));
    }

    #[test]
    fn index_layout_is_z_major() {
        assert_eq!(block_index(1, 0, 0), 1);
        assert_eq!(block_index(0, 1, 0), 16);
        assert_eq!(block_index(0, 0, 1), 256);
        assert_eq!(block_index(15, 15, 63), CHUNK_VOLUME - 1);
        assert_eq!(index_to_local(CHUNK_VOLUME - 1), BlockPos::new(15, 15, 63));
    }

    #[test]
    fn square_covers_side_squared() {
        let c = ChunkCoord::new(3, -2);
        let all: Vec<_> = c.square(7).collect();
        assert_eq!(all.len(), 225);
        assert!(all.iter().all(|k| k.chebyshev(c) <= 7));
    }
}
