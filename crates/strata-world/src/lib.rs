//! Procedural world: noise, terrain heightmaps, structure population and
//! the authoritative chunk grid.
#![forbid(unsafe_code)]

pub mod grid;
pub mod noise;
pub mod populate;
pub mod terrain;
pub mod world;
pub mod worldgen;

pub use grid::ChunkGrid;
pub use noise::{Heightfield, NoiseGenerator, NoiseParams, NoiseRange};
pub use populate::{Population, StructurePlacer, point_to_seed};
pub use terrain::TerrainGenerator;
pub use world::{GENERATION_MARGIN, GenerationReport, World};
pub use worldgen::{WorldGenConfig, WorldGenParams, load_params_from_path};
