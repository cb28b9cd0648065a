use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::atlas::TextureAtlas;
use crate::config::{BlockDef, BlocksConfig};
use crate::types::{AIR, AtlasCell, BlockId, BlockType, FaceTextures};

/// Block set used when no blocks file is supplied.
pub const DEFAULT_BLOCKS_TOML: &str = r#"
[atlas]
cols = 4
rows = 4

[[blocks]]
id = 1
name = "stone"
all = [0, 0]

[[blocks]]
id = 2
name = "dirt"
all = [1, 0]

[[blocks]]
id = 3
name = "log"
side = [2, 1]
top = [3, 1]
bottom = [3, 1]

[[blocks]]
id = 4
name = "grass"
side = [1, 1]
top = [0, 1]
bottom = [1, 0]

[[blocks]]
id = 5
name = "leaves"
all = [2, 0]

[[blocks]]
id = 6
name = "planks"
all = [3, 0]
"#;

/// Read-only id → block type mapping, built once at startup.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    pub atlas: TextureAtlas,
    blocks: HashMap<BlockId, BlockType>,
    by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    pub fn builtin() -> Self {
        match Self::from_toml_str(DEFAULT_BLOCKS_TOML) {
            Ok(reg) => reg,
            Err(e) => panic!("built-in block table is invalid: {e}"),
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, Box<dyn Error>> {
        let atlas = TextureAtlas::new(cfg.atlas.cols, cfg.atlas.rows);
        let mut reg = BlockRegistry {
            atlas,
            blocks: HashMap::new(),
            by_name: HashMap::new(),
        };
        reg.insert(BlockType {
            id: AIR,
            name: "air".into(),
            faces: FaceTextures::default(),
        });
        for def in cfg.blocks {
            if def.id == AIR {
                return Err(format!("block '{}': id 0 is reserved for air", def.name).into());
            }
            if reg.blocks.contains_key(&def.id) {
                return Err(format!("block '{}': duplicate id {}", def.name, def.id).into());
            }
            if reg.by_name.contains_key(&def.name) {
                return Err(format!("duplicate block name '{}'", def.name).into());
            }
            let faces = compile_faces(&def);
            let cells = [
                faces.top,
                faces.bottom,
                faces.left,
                faces.right,
                faces.front,
                faces.back,
            ];
            for cell in cells {
                if !atlas.contains(cell) {
                    return Err(format!(
                        "block '{}': atlas cell ({}, {}) outside {}x{} atlas",
                        def.name, cell.col, cell.row, atlas.cols, atlas.rows
                    )
                    .into());
                }
            }
            reg.insert(BlockType {
                id: def.id,
                name: def.name,
                faces,
            });
        }
        Ok(reg)
    }

    fn insert(&mut self, ty: BlockType) {
        self.by_name.insert(ty.name.clone(), ty.id);
        self.blocks.insert(ty.id, ty);
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(&id)
    }

    /// Looks up a block that must exist. An unknown id means the world holds
    /// data the registry was never told about, which is unrecoverable.
    #[inline]
    pub fn lookup(&self, id: BlockId) -> &BlockType {
        match self.blocks.get(&id) {
            Some(ty) => ty,
            None => panic!("block id {id} is not registered"),
        }
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    /// Resolves a block name from a config file into an id.
    pub fn require(&self, name: &str) -> Result<BlockId, Box<dyn Error>> {
        self.id_by_name(name)
            .ok_or_else(|| format!("unknown block name '{name}'").into())
    }

    #[inline]
    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    /// Number of registered types, air included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

fn compile_faces(def: &BlockDef) -> FaceTextures {
    let all = def.all.unwrap_or(AtlasCell::default());
    let side = def.side.unwrap_or(all);
    FaceTextures {
        top: def.top.unwrap_or(all),
        bottom: def.bottom.unwrap_or(all),
        left: def.left.unwrap_or(side),
        right: def.right.unwrap_or(side),
        front: def.front.unwrap_or(side),
        back: def.back.unwrap_or(side),
    }
}
