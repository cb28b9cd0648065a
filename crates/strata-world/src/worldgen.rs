use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use strata_blocks::{BlockId, BlockRegistry};
use strata_geom::CHUNK_HEIGHT;

use crate::noise::NoiseParams;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Seeds structure placement and tree variation. Terrain noise has its
    /// own seed under `terrain.noise`.
    pub seed: i64,
    pub terrain: TerrainConfig,
    pub density: DensityConfig,
    pub tree_instances: usize,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            terrain: TerrainConfig::default(),
            density: DensityConfig::default(),
            tree_instances: default_tree_instances(),
        }
    }
}

fn default_tree_instances() -> usize {
    70
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub noise: NoiseParams,
    pub surface_min: i32,
    pub surface_max: i32,
    /// Side of the square reference sample used for normalization.
    pub reference_size: usize,
    pub solid_block: String,
    pub surface_block: String,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            noise: NoiseParams::default(),
            surface_min: 30,
            surface_max: 48,
            reference_size: 512,
            solid_block: "stone".into(),
            surface_block: "grass".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    pub noise: NoiseParams,
    pub max_structures: u32,
    pub attempts: u32,
}

fn default_density_noise() -> NoiseParams {
    NoiseParams {
        seed: 0,
        scale: 2.342352,
        octaves: 1,
        persistence: 1.0,
        lacunarity: 1.0,
        banding: None,
    }
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            noise: default_density_noise(),
            max_structures: 7,
            attempts: 5,
        }
    }
}

/// Terrain settings with block names resolved.
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub noise: NoiseParams,
    pub surface_min: i32,
    pub surface_max: i32,
    pub reference_size: usize,
    pub solid: BlockId,
    pub surface: BlockId,
}

impl Default for TerrainParams {
    /// Matches the built-in block table (stone = 1, grass = 4).
    fn default() -> Self {
        let cfg = TerrainConfig::default();
        Self {
            noise: cfg.noise,
            surface_min: cfg.surface_min,
            surface_max: cfg.surface_max,
            reference_size: cfg.reference_size,
            solid: 1,
            surface: 4,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DensityParams {
    pub noise: NoiseParams,
    pub max_structures: u32,
    pub attempts: u32,
}

/// Validated world generation parameters.
#[derive(Clone, Debug)]
pub struct WorldGenParams {
    pub seed: i64,
    pub terrain: TerrainParams,
    pub density: DensityParams,
    pub tree_instances: usize,
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig, reg: &BlockRegistry) -> Result<Self, Box<dyn Error>> {
        let t = &cfg.terrain;
        if t.surface_min < 0 || t.surface_min >= t.surface_max || t.surface_max > CHUNK_HEIGHT {
            return Err(format!(
                "terrain surface bounds {}..{} must satisfy 0 <= min < max <= {}",
                t.surface_min, t.surface_max, CHUNK_HEIGHT
            )
            .into());
        }
        if t.noise.octaves == 0 || cfg.density.noise.octaves == 0 {
            return Err("noise octaves must be at least 1".into());
        }
        let solid = reg.require(&t.solid_block)?;
        let surface = reg.require(&t.surface_block)?;
        if solid == surface {
            return Err("terrain solid and surface blocks must differ".into());
        }
        Ok(Self {
            seed: cfg.seed,
            terrain: TerrainParams {
                noise: t.noise,
                surface_min: t.surface_min,
                surface_max: t.surface_max,
                reference_size: t.reference_size.max(1),
                solid,
                surface,
            },
            density: DensityParams {
                noise: cfg.density.noise,
                max_structures: cfg.density.max_structures,
                attempts: cfg.density.attempts.max(1),
            },
            tree_instances: cfg.tree_instances,
        })
    }

    pub fn from_toml_str(toml_str: &str, reg: &BlockRegistry) -> Result<Self, Box<dyn Error>> {
        let cfg: WorldGenConfig = toml::from_str(toml_str)?;
        Self::from_config(&cfg, reg)
    }

    /// Defaults resolved against `reg`.
    pub fn defaults(reg: &BlockRegistry) -> Result<Self, Box<dyn Error>> {
        Self::from_config(&WorldGenConfig::default(), reg)
    }
}

pub fn load_params_from_path(
    path: &Path,
    reg: &BlockRegistry,
) -> Result<WorldGenParams, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    WorldGenParams::from_toml_str(&s, reg)
}
