use std::collections::HashSet;

use strata_blocks::BlockId;
use strata_geom::BlockPos;

use crate::blueprint::{Blueprint, StructureBlock};

const NEIGHBORS: [(i32, i32, i32); 6] = [
    (0, 0, 1),
    (0, 0, -1),
    (0, 1, 0),
    (0, -1, 0),
    (1, 0, 0),
    (-1, 0, 0),
];

/// Leaves with fewer present neighbours than this are decay candidates.
const LEAF_SUPPORT: usize = 4;

/// Base tree shape plus the parameters used to vary it.
#[derive(Clone, Debug)]
pub struct TreeTemplate {
    pub name: String,
    pub base: Blueprint,
    pub log: BlockId,
    pub leaves: BlockId,
    /// Extra trunk height, half-open `[min, max)`. May be negative.
    pub height_variation: (i32, i32),
    pub leaf_decay_chance: f32,
}

impl TreeTemplate {
    /// Derives a new randomized instance. The template itself is untouched.
    pub fn generate(&self, rng: &mut fastrand::Rng) -> Blueprint {
        let (lo, hi) = self.height_variation;
        let height = if lo < hi { rng.i32(lo..hi) } else { lo };

        let mut cells: Vec<StructureBlock> = self
            .base
            .blocks()
            .iter()
            .map(|b| StructureBlock::new(b.pos.offset(0, 0, height), b.id))
            .filter(|b| b.pos.z >= 0)
            .collect();
        for i in 0..height.max(0) {
            cells.push(StructureBlock::new(BlockPos::new(0, 0, i), self.log));
        }

        let present: HashSet<BlockPos> = cells.iter().map(|b| b.pos).collect();
        let mut kept = Vec::with_capacity(cells.len());
        for b in cells {
            if b.id == self.leaves {
                let support = NEIGHBORS
                    .iter()
                    .filter(|(dx, dy, dz)| present.contains(&b.pos.offset(*dx, *dy, *dz)))
                    .count();
                if support < LEAF_SUPPORT && rng.f32() < self.leaf_decay_chance {
                    continue;
                }
            }
            kept.push(b);
        }

        let [sx, sy, sz] = self.base.size();
        Blueprint::new([sx, sy, sz + height], kept)
    }
}

/// Canopy tree: a straight trunk with a layered leaf crown.
pub fn canopy_blueprint(
    log: BlockId,
    leaves: BlockId,
    trunk_height: i32,
    radius: i32,
) -> Blueprint {
    let trunk_height = trunk_height.max(1);
    let radius = radius.max(1);
    let mut blocks = Vec::new();
    for z in 0..trunk_height {
        blocks.push(StructureBlock::new(BlockPos::new(0, 0, z), log));
    }
    // two wide layers around the trunk top, corners clipped
    for z in (trunk_height - 1)..=trunk_height {
        for y in -radius..=radius {
            for x in -radius..=radius {
                let corner = x.abs() == radius && y.abs() == radius;
                let trunk = x == 0 && y == 0 && z < trunk_height;
                if !corner && !trunk {
                    blocks.push(StructureBlock::new(BlockPos::new(x, y, z), leaves));
                }
            }
        }
    }
    let inner = (radius - 1).max(1);
    for y in -inner..=inner {
        for x in -inner..=inner {
            blocks.push(StructureBlock::new(BlockPos::new(x, y, trunk_height + 1), leaves));
        }
    }
    for (x, y) in [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)] {
        blocks.push(StructureBlock::new(BlockPos::new(x, y, trunk_height + 2), leaves));
    }
    let width = 2 * radius + 1;
    Blueprint::new([width, width, trunk_height + 3], blocks)
}
