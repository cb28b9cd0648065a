use std::f32::consts::FRAC_PI_2;

use strata_blocks::{AIR, BlockId};
use strata_chunk::{Chunk, ChunkState};
use strata_geom::coords::block_index;
use strata_geom::{CHUNK_HEIGHT, CHUNK_WIDTH, ChunkCoord};

use crate::noise::{NoiseGenerator, NoiseParams, NoiseRange};
use crate::worldgen::TerrainParams;

#[inline]
pub fn ease_in_sine(t: f32) -> f32 {
    1.0 - (t * FRAC_PI_2).cos()
}

/// Fills fresh chunks with heightmapped terrain.
pub struct TerrainGenerator {
    noise: NoiseGenerator,
    range: NoiseRange,
    surface_min: f32,
    surface_max: f32,
    solid: BlockId,
    surface: BlockId,
}

impl TerrainGenerator {
    /// Builds the generator and takes the reference sample that fixes the
    /// global normalization range.
    pub fn new(params: &TerrainParams) -> Self {
        let noise = NoiseGenerator::new(params.noise);
        let mut range = NoiseRange::default();
        let n = params.reference_size.max(1);
        let half = (n / 2) as f64;
        range.observe(&noise.sample(n, n, (-half, -half)));
        log::debug!(
            target: "worldgen",
            "terrain noise range {:.4}..{:.4} from {}x{} reference sample",
            range.min,
            range.max,
            n,
            n
        );
        Self {
            noise,
            range,
            surface_min: params.surface_min as f32,
            surface_max: params.surface_max as f32,
            solid: params.solid,
            surface: params.surface,
        }
    }

    #[inline]
    pub fn range(&self) -> NoiseRange {
        self.range
    }

    #[inline]
    pub fn noise_params(&self) -> &NoiseParams {
        self.noise.params()
    }

    /// Surface height for every column of chunk `c`, row-major by local y.
    pub fn surface_heights(&self, c: ChunkCoord) -> Vec<f32> {
        let w = CHUNK_WIDTH as usize;
        let origin = (
            f64::from(CHUNK_WIDTH * c.cx),
            f64::from(CHUNK_WIDTH * c.cy),
        );
        let field = self.noise.sample(w, w, origin);
        field
            .values
            .iter()
            .map(|&v| {
                let t = ease_in_sine(self.range.normalize(v));
                self.surface_min + (self.surface_max - self.surface_min) * t
            })
            .collect()
    }

    /// Heightmaps `chunk`. Returns `false` without touching it unless the
    /// chunk is still empty.
    pub fn generate(&self, chunk: &mut Chunk) -> bool {
        if chunk.state() != ChunkState::Empty {
            return false;
        }
        let w = CHUNK_WIDTH as usize;
        let h = CHUNK_HEIGHT as usize;
        let heights = self.surface_heights(chunk.coord());
        let solid = self.solid;
        let surface = self.surface;
        let blocks = chunk.blocks_mut();
        for y in 0..w {
            for x in 0..w {
                let level = heights[y * w + x];
                for z in 0..h {
                    if (z as f32) < level {
                        blocks[block_index(x, y, z)] = solid;
                    }
                }
            }
        }
        for y in 0..w {
            for x in 0..w {
                for z in 0..h {
                    let above_open = z + 1 >= h || blocks[block_index(x, y, z + 1)] == AIR;
                    if above_open && blocks[block_index(x, y, z)] == solid {
                        blocks[block_index(x, y, z)] = surface;
                    }
                }
            }
        }
        chunk.advance_state(ChunkState::Heightmapped);
        true
    }
}
