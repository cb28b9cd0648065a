use std::sync::Arc;

use hashbrown::{HashMap, HashSet};

use strata_blocks::{BlockId, BlockRegistry};
use strata_chunk::{Chunk, ChunkNeighbors, ChunkSnapshot, ChunkState};
use strata_geom::{BlockPos, ChunkCoord};
use strata_structures::{Blueprint, StructureSet};

use crate::grid::ChunkGrid;
use crate::populate::{Population, StructurePlacer, stamp};
use crate::terrain::TerrainGenerator;
use crate::worldgen::WorldGenParams;

/// Extra ring of chunks generated beyond the visible radius, so meshing and
/// structure stamping always find their neighbours.
pub const GENERATION_MARGIN: i32 = 3;

/// Population runs this many rings inside the generated area.
const POPULATION_INSET: i32 = 2;

/// Outcome of one generation sweep.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub heightmapped: usize,
    pub populated: usize,
    /// Chunks that received structure blocks from a neighbour's population.
    pub touched: HashSet<ChunkCoord>,
}

/// Owns the chunk grid and the generators that fill it.
pub struct World {
    params: WorldGenParams,
    registry: Arc<BlockRegistry>,
    terrain: TerrainGenerator,
    placer: StructurePlacer,
    grid: ChunkGrid,
    placed: HashMap<ChunkCoord, u32>,
}

impl World {
    pub fn new(
        params: WorldGenParams,
        registry: Arc<BlockRegistry>,
        structures: &StructureSet,
    ) -> Self {
        let terrain = TerrainGenerator::new(&params.terrain);
        let placer = StructurePlacer::new(
            &params.density,
            params.seed,
            params.terrain.surface,
            structures,
            params.tree_instances,
        );
        log::info!(
            target: "worldgen",
            "world seed {} terrain seed {} ({} tree instances)",
            params.seed,
            params.terrain.noise.seed,
            placer.instances().len()
        );
        Self {
            params,
            registry,
            terrain,
            placer,
            grid: ChunkGrid::new(),
            placed: HashMap::new(),
        }
    }

    #[inline]
    pub fn params(&self) -> &WorldGenParams {
        &self.params
    }

    #[inline]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    #[inline]
    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    #[inline]
    pub fn placer(&self) -> &StructurePlacer {
        &self.placer
    }

    #[inline]
    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    /// Makes sure every chunk within `render_distance / 2 + GENERATION_MARGIN`
    /// of `center` is heightmapped, then populates the inner area.
    pub fn update_generation(
        &mut self,
        center: ChunkCoord,
        render_distance: i32,
    ) -> GenerationReport {
        let radius = render_distance / 2 + GENERATION_MARGIN;
        let mut report = GenerationReport::default();
        for c in center.square(radius) {
            if self.generate_heightmap(c) {
                report.heightmapped += 1;
            }
        }
        for c in center.square(radius - POPULATION_INSET) {
            if let Some(p) = self.populate(c) {
                report.populated += 1;
                report.touched.extend(p.touched);
            }
        }
        if report.heightmapped > 0 || report.populated > 0 {
            log::debug!(
                target: "worldgen",
                "generation around ({}, {}): {} heightmapped, {} populated, {} chunks total",
                center.cx,
                center.cy,
                report.heightmapped,
                report.populated,
                self.grid.len()
            );
        }
        report
    }

    /// Creates `c` if needed and heightmaps it. `false` if it was already
    /// past the empty stage.
    pub fn generate_heightmap(&mut self, c: ChunkCoord) -> bool {
        let chunk = self.grid.get_or_create(c);
        self.terrain.generate(chunk)
    }

    /// Populates a heightmapped chunk; see [`StructurePlacer::populate`].
    pub fn populate(&mut self, c: ChunkCoord) -> Option<Population> {
        let p = self.placer.populate(&mut self.grid, c)?;
        self.placed.insert(c, p.placed);
        Some(p)
    }

    /// Structures that population actually placed in `c`, once populated.
    pub fn placed(&self, c: ChunkCoord) -> Option<u32> {
        self.placed.get(&c).copied()
    }

    /// Stamps `bp` rooted at global `root` under the same overlap rules as
    /// population. Returns every chunk written, or `None` if nothing fit.
    pub fn place_structure(
        &mut self,
        root: BlockPos,
        bp: &Blueprint,
    ) -> Option<HashSet<ChunkCoord>> {
        for id in bp.blocks().iter().map(|b| b.id) {
            assert!(self.registry.contains(id), "block id {id} is not registered");
        }
        let mut touched = HashSet::new();
        stamp(&mut self.grid, root, bp, &mut touched).then_some(touched)
    }

    #[inline]
    pub fn chunk(&self, c: ChunkCoord) -> Option<&Chunk> {
        self.grid.get(c)
    }

    pub fn state(&self, c: ChunkCoord) -> Option<ChunkState> {
        self.grid.get(c).map(Chunk::state)
    }

    #[inline]
    pub fn block_at_global(&self, g: BlockPos) -> BlockId {
        self.grid.block_at_global(g)
    }

    /// Writes one cell of chunk `c` by block index. Unknown ids and missing
    /// chunks are programming errors.
    pub fn set_block(&mut self, c: ChunkCoord, index: usize, id: BlockId) {
        assert!(self.registry.contains(id), "block id {id} is not registered");
        self.grid.expect_mut(c).set_index(index, id);
    }

    pub fn snapshot(&self, c: ChunkCoord) -> ChunkSnapshot {
        self.grid.snapshot(c)
    }

    pub fn neighbors(&self, c: ChunkCoord) -> ChunkNeighbors {
        self.grid.neighbors(c)
    }
}
