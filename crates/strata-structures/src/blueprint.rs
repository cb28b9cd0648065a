use std::collections::HashMap;

use strata_blocks::BlockId;
use strata_geom::BlockPos;

/// One occupied cell of a blueprint, relative to the structure root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructureBlock {
    pub pos: BlockPos,
    pub id: BlockId,
}

impl StructureBlock {
    pub const fn new(pos: BlockPos, id: BlockId) -> Self {
        Self { pos, id }
    }
}

/// Immutable structure shape. The root sits at lateral (0,0), z = 0 is the
/// cell directly above the ground. The lateral box extents are always odd
/// so the root is centred.
#[derive(Clone, Debug)]
pub struct Blueprint {
    size: [i32; 3],
    blocks: Vec<StructureBlock>,
    cells: HashMap<BlockPos, BlockId>,
}

impl Blueprint {
    pub fn new(size: [i32; 3], blocks: Vec<StructureBlock>) -> Self {
        let mut size = size;
        for s in &mut size[..2] {
            if *s % 2 == 0 {
                *s += 1;
            }
        }
        let cells = blocks.iter().map(|b| (b.pos, b.id)).collect();
        Self {
            size,
            blocks,
            cells,
        }
    }

    /// Bounding box `[x, y, z]`.
    #[inline]
    pub fn size(&self) -> [i32; 3] {
        self.size
    }

    /// Half lateral extents; the box spans `-half..=half` around the root.
    #[inline]
    pub fn half_extents(&self) -> (i32, i32) {
        (self.size[0] / 2, self.size[1] / 2)
    }

    pub fn blocks(&self) -> &[StructureBlock] {
        &self.blocks
    }

    #[inline]
    pub fn get(&self, rel: BlockPos) -> Option<BlockId> {
        self.cells.get(&rel).copied()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
