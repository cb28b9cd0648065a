use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use strata_blocks::BlockRegistry;
use strata_runtime::StreamConfig;
use strata_structures::StructureSet;
use strata_world::{WorldGenParams, load_params_from_path};

use crate::assets;

/// Everything the driver needs before the world exists.
pub struct Loaded {
    pub registry: Arc<BlockRegistry>,
    pub structures: StructureSet,
    pub worldgen: WorldGenParams,
    pub stream: StreamConfig,
}

/// Reads each config file under `root`, falling back to built-in defaults
/// for files that are absent. A file that exists but fails to parse is an
/// error. `stream_override` replaces `assets/strata.toml`.
pub fn load(root: &Path, stream_override: Option<&PathBuf>) -> Result<Loaded, Box<dyn Error>> {
    let blocks = assets::blocks_path(root);
    let registry = if blocks.exists() {
        log::info!("loading blocks from {}", blocks.display());
        BlockRegistry::load_from_path(&blocks)?
    } else {
        log::info!("{} not found; using built-in blocks", blocks.display());
        BlockRegistry::builtin()
    };

    let structures_path = assets::structures_path(root);
    let structures = if structures_path.exists() {
        StructureSet::load_from_path(&structures_path, &registry)?
    } else {
        StructureSet::builtin(&registry)?
    };

    let worldgen_path = assets::worldgen_path(root);
    let worldgen = if worldgen_path.exists() {
        load_params_from_path(&worldgen_path, &registry)?
    } else {
        WorldGenParams::defaults(&registry)?
    };

    let stream = match stream_override {
        Some(p) => StreamConfig::load_from_path(p)?,
        None => {
            let p = assets::stream_path(root);
            if p.exists() {
                StreamConfig::load_from_path(&p)?
            } else {
                StreamConfig::default()
            }
        }
    };

    Ok(Loaded {
        registry: Arc::new(registry),
        structures,
        worldgen,
        stream,
    })
}
