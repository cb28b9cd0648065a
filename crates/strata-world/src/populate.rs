use hashbrown::HashSet;

use strata_blocks::{AIR, BlockId};
use strata_chunk::ChunkState;
use strata_geom::coords::{global_to_chunk, local_to_global};
use strata_geom::{BlockPos, CHUNK_HEIGHT, CHUNK_WIDTH, ChunkCoord};
use strata_structures::{Blueprint, StructureSet};

use crate::grid::ChunkGrid;
use crate::noise::NoiseGenerator;
use crate::worldgen::DensityParams;

const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

#[inline]
fn fold(v: i32) -> u128 {
    let v = i64::from(v);
    if v >= 0 { (2 * v) as u128 } else { (-2 * v - 1) as u128 }
}

/// Unique seed for a chunk coordinate: folds each axis onto the naturals
/// and applies the Cantor pairing function.
pub fn point_to_seed(c: ChunkCoord) -> u64 {
    let a = fold(c.cx);
    let b = fold(c.cy);
    ((a + b) * (a + b + 1) / 2 + b) as u64
}

#[inline]
pub fn mix_world_seed(seed: i64) -> u64 {
    (seed as u64).wrapping_mul(SEED_MIX)
}

/// What one population pass did.
#[derive(Debug, Default)]
pub struct Population {
    pub placed: u32,
    /// Other chunks that received structure blocks.
    pub touched: HashSet<ChunkCoord>,
}

/// Places structures on heightmapped chunks.
pub struct StructurePlacer {
    density: NoiseGenerator,
    max_structures: u32,
    attempts: u32,
    world_seed: u64,
    surface: BlockId,
    instances: Vec<Blueprint>,
}

impl StructurePlacer {
    /// Pre-generates `instance_count` randomized trees from the world seed.
    pub fn new(
        density: &DensityParams,
        world_seed: i64,
        surface: BlockId,
        structures: &StructureSet,
        instance_count: usize,
    ) -> Self {
        let world_seed = mix_world_seed(world_seed);
        let mut rng = fastrand::Rng::with_seed(world_seed);
        let mut instances = Vec::with_capacity(instance_count);
        if !structures.trees.is_empty() {
            for _ in 0..instance_count {
                let t = &structures.trees[rng.usize(..structures.trees.len())];
                instances.push(t.generate(&mut rng));
            }
        }
        log::debug!(
            target: "worldgen",
            "generated {} tree instances from {} templates",
            instances.len(),
            structures.trees.len()
        );
        Self {
            density: NoiseGenerator::new(density.noise),
            max_structures: density.max_structures,
            attempts: density.attempts,
            world_seed,
            surface,
            instances,
        }
    }

    pub fn instances(&self) -> &[Blueprint] {
        &self.instances
    }

    /// Number of placements to attempt in chunk `c`.
    pub fn structure_count(&self, c: ChunkCoord) -> u32 {
        let v = self
            .density
            .sample_at(f64::from(c.cx), f64::from(c.cy))
            .clamp(0.0, 1.0);
        (self.max_structures as f32 * v).floor() as u32
    }

    /// Populates chunk `c`. `None` if `c` is missing or not heightmapped.
    pub fn populate(&self, grid: &mut ChunkGrid, c: ChunkCoord) -> Option<Population> {
        if grid.get(c)?.state() != ChunkState::Heightmapped {
            return None;
        }
        let mut rng = fastrand::Rng::with_seed(point_to_seed(c) ^ self.world_seed);
        let mut touched = HashSet::new();
        let count = self.structure_count(c);
        let mut placed = 0u32;
        for _ in 0..count {
            for _ in 0..self.attempts {
                let x = rng.i32(0..CHUNK_WIDTH);
                let y = rng.i32(0..CHUNK_WIDTH);
                let Some(z) = self.surface_z(grid, c, x, y) else {
                    continue;
                };
                if self.instances.is_empty() {
                    break;
                }
                let bp = &self.instances[rng.usize(..self.instances.len())];
                let root = local_to_global(BlockPos::new(x, y, z + 1), c);
                if stamp(grid, root, bp, &mut touched) {
                    placed += 1;
                    break;
                }
            }
        }
        grid.expect_mut(c).advance_state(ChunkState::Populated);
        touched.remove(&c);
        log::trace!(
            target: "worldgen",
            "populated ({}, {}): {placed}/{count} structures, {} neighbours touched",
            c.cx,
            c.cy,
            touched.len()
        );
        Some(Population { placed, touched })
    }

    fn surface_z(&self, grid: &ChunkGrid, c: ChunkCoord, x: i32, y: i32) -> Option<i32> {
        let ch = grid.expect(c);
        (0..CHUNK_HEIGHT)
            .rev()
            .find(|&z| ch.get(x as usize, y as usize, z as usize) == self.surface)
    }
}

/// Writes `bp` rooted at global `root` if every cell it occupies is empty
/// and its whole box fits under the top of the world. Nothing is written
/// on failure.
pub fn stamp(
    grid: &mut ChunkGrid,
    root: BlockPos,
    bp: &Blueprint,
    touched: &mut HashSet<ChunkCoord>,
) -> bool {
    let (hx, hy) = bp.half_extents();
    let sz = bp.size()[2];
    for z in 0..=sz {
        for y in -hy..=hy {
            for x in -hx..=hx {
                let g = root.offset(x, y, z);
                if g.z >= CHUNK_HEIGHT {
                    return false;
                }
                let existing = grid.block_at_global(g);
                let wanted = bp.get(BlockPos::new(x, y, z)).unwrap_or(AIR);
                if existing != AIR && wanted != AIR {
                    return false;
                }
            }
        }
    }
    for b in bp.blocks() {
        if b.id == AIR {
            continue;
        }
        let g = root + b.pos;
        grid.set_block_at_global(g, b.id);
        touched.insert(global_to_chunk(g));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_structures::StructureBlock;

    #[test]
    fn pairing_matches_cantor_on_small_values() {
        assert_eq!(point_to_seed(ChunkCoord::new(0, 0)), 0);
        // (0,-1) folds to (0,1): (1*2)/2 + 1 = 2
        assert_eq!(point_to_seed(ChunkCoord::new(0, -1)), 2);
        // (1,0) folds to (2,0): (2*3)/2 = 3
        assert_eq!(point_to_seed(ChunkCoord::new(1, 0)), 3);
        // (-1,-1) folds to (1,1): (2*3)/2 + 1 = 4
        assert_eq!(point_to_seed(ChunkCoord::new(-1, -1)), 4);
    }

    #[test]
    fn pairing_is_injective_on_a_window() {
        let mut seen = std::collections::HashSet::new();
        for c in ChunkCoord::new(0, 0).square(60) {
            assert!(seen.insert(point_to_seed(c)), "collision at {c:?}");
        }
    }

    fn grid_with_floor(radius: i32, floor_z: usize) -> ChunkGrid {
        let mut g = ChunkGrid::new();
        for c in ChunkCoord::new(0, 0).square(radius) {
            let ch = g.get_or_create(c);
            for y in 0..16 {
                for x in 0..16 {
                    ch.set(x, y, floor_z, 4);
                }
            }
            ch.advance_state(ChunkState::Heightmapped);
        }
        g
    }

    fn pillar(height: i32) -> Blueprint {
        let blocks = (0..height)
            .map(|z| StructureBlock::new(BlockPos::new(0, 0, z), 3))
            .collect();
        Blueprint::new([1, 1, height], blocks)
    }

    #[test]
    fn stamp_rejects_overlap_without_writing() {
        let mut g = grid_with_floor(1, 10);
        let root = BlockPos::new(0, 0, 11);
        g.set_block_at_global(root.offset(0, 0, 2), 6);
        let mut touched = HashSet::new();
        assert!(!stamp(&mut g, root, &pillar(4), &mut touched));
        assert_eq!(g.block_at_global(root), AIR);
        assert!(touched.is_empty());
    }

    #[test]
    fn stamp_rejects_boxes_above_the_world() {
        let mut g = grid_with_floor(1, 10);
        let mut touched = HashSet::new();
        // box spans z 60..=64
        assert!(!stamp(&mut g, BlockPos::new(0, 0, 60), &pillar(4), &mut touched));
        assert!(stamp(&mut g, BlockPos::new(0, 0, 59), &pillar(4), &mut touched));
        assert_eq!(g.block_at_global(BlockPos::new(0, 0, 62)), 3);
    }

    #[test]
    fn stamp_reports_chunks_across_the_boundary() {
        let mut g = grid_with_floor(1, 10);
        let wide = Blueprint::new(
            [3, 1, 1],
            vec![
                StructureBlock::new(BlockPos::new(-1, 0, 0), 5),
                StructureBlock::new(BlockPos::new(1, 0, 0), 5),
            ],
        );
        let mut touched = HashSet::new();
        // global x = 7 is the last column of chunk 0; x + 1 belongs to chunk 1
        assert!(stamp(&mut g, BlockPos::new(7, 0, 11), &wide, &mut touched));
        assert!(touched.contains(&ChunkCoord::new(0, 0)));
        assert!(touched.contains(&ChunkCoord::new(1, 0)));
        assert_eq!(g.block_at_global(BlockPos::new(8, 0, 11)), 5);
    }
}
