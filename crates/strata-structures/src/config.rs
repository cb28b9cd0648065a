use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use strata_blocks::BlockRegistry;
use strata_geom::BlockPos;

use crate::blueprint::{Blueprint, StructureBlock};
use crate::tree::{TreeTemplate, canopy_blueprint};

/// Tree set used when no structures file is supplied.
pub const DEFAULT_STRUCTURES_TOML: &str = r#"
[[trees]]
name = "oak"
log = "log"
leaves = "leaves"
height_variation = [-1, 2]
leaf_decay_chance = 0.35

[trees.canopy]
trunk_height = 4
radius = 2
"#;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct StructuresConfig {
    #[serde(default)]
    pub trees: Vec<TreeDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TreeDef {
    pub name: String,
    #[serde(default = "default_log")]
    pub log: String,
    #[serde(default = "default_leaves")]
    pub leaves: String,
    #[serde(default = "default_height_variation")]
    pub height_variation: [i32; 2],
    #[serde(default)]
    pub leaf_decay_chance: f32,
    /// Required with explicit `blocks`; derived for `canopy` trees.
    #[serde(default)]
    pub bounding_box: Option<[i32; 3]>,
    #[serde(default)]
    pub blocks: Vec<CellDef>,
    #[serde(default)]
    pub canopy: Option<CanopyDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CellDef {
    pub pos: [i32; 3],
    pub block: String,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct CanopyDef {
    pub trunk_height: i32,
    pub radius: i32,
}

fn default_log() -> String {
    "log".into()
}

fn default_leaves() -> String {
    "leaves".into()
}

fn default_height_variation() -> [i32; 2] {
    [-1, 2]
}

/// Read-only set of tree templates with block names resolved to ids.
#[derive(Clone, Debug, Default)]
pub struct StructureSet {
    pub trees: Vec<TreeTemplate>,
}

impl StructureSet {
    pub fn builtin(reg: &BlockRegistry) -> Result<Self, Box<dyn Error>> {
        Self::from_toml_str(DEFAULT_STRUCTURES_TOML, reg)
    }

    pub fn load_from_path(
        path: impl AsRef<Path>,
        reg: &BlockRegistry,
    ) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s, reg)
    }

    pub fn from_toml_str(toml_str: &str, reg: &BlockRegistry) -> Result<Self, Box<dyn Error>> {
        let cfg: StructuresConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg, reg)
    }

    pub fn from_config(cfg: StructuresConfig, reg: &BlockRegistry) -> Result<Self, Box<dyn Error>> {
        let mut trees = Vec::with_capacity(cfg.trees.len());
        for def in cfg.trees {
            trees.push(compile_tree(def, reg)?);
        }
        Ok(Self { trees })
    }
}

fn compile_tree(def: TreeDef, reg: &BlockRegistry) -> Result<TreeTemplate, Box<dyn Error>> {
    let log = reg.require(&def.log)?;
    let leaves = reg.require(&def.leaves)?;
    let base = match (def.canopy, def.blocks.is_empty()) {
        (Some(c), true) => canopy_blueprint(log, leaves, c.trunk_height, c.radius),
        (None, false) => {
            let size = def.bounding_box.ok_or_else(|| {
                format!("tree '{}': explicit blocks need a bounding_box", def.name)
            })?;
            let mut cells = Vec::with_capacity(def.blocks.len());
            for cell in &def.blocks {
                let [x, y, z] = cell.pos;
                cells.push(StructureBlock::new(BlockPos::new(x, y, z), reg.require(&cell.block)?));
            }
            Blueprint::new(size, cells)
        }
        _ => {
            return Err(
                format!("tree '{}': give exactly one of `canopy` or `blocks`", def.name).into(),
            );
        }
    };
    let [sx, sy, sz] = base.size();
    let (hx, hy) = base.half_extents();
    for b in base.blocks() {
        if b.pos.x.abs() > hx || b.pos.y.abs() > hy || b.pos.z < 0 || b.pos.z > sz {
            return Err(format!(
                "tree '{}': cell {:?} outside bounding box {}x{}x{}",
                def.name, b.pos, sx, sy, sz
            )
            .into());
        }
    }
    Ok(TreeTemplate {
        name: def.name,
        base,
        log,
        leaves,
        height_variation: (def.height_variation[0], def.height_variation[1]),
        leaf_decay_chance: def.leaf_decay_chance.clamp(0.0, 1.0),
    })
}
