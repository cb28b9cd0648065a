use serde::Deserialize;

use crate::types::AtlasCell;

// Top-level blocks config file
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlocksConfig {
    #[serde(default)]
    pub atlas: AtlasConfig,
    pub blocks: Vec<BlockDef>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct AtlasConfig {
    #[serde(default = "default_atlas_dim")]
    pub cols: u16,
    #[serde(default = "default_atlas_dim")]
    pub rows: u16,
}

fn default_atlas_dim() -> u16 {
    1
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            cols: default_atlas_dim(),
            rows: default_atlas_dim(),
        }
    }
}

/// One block definition. Face cells resolve most-specific first:
/// `top`/`bottom`/`left`/`right`/`front`/`back`, then `side` for the four
/// lateral faces, then `all`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlockDef {
    pub id: u16,
    pub name: String,
    #[serde(default)]
    pub all: Option<AtlasCell>,
    #[serde(default)]
    pub side: Option<AtlasCell>,
    #[serde(default)]
    pub top: Option<AtlasCell>,
    #[serde(default)]
    pub bottom: Option<AtlasCell>,
    #[serde(default)]
    pub left: Option<AtlasCell>,
    #[serde(default)]
    pub right: Option<AtlasCell>,
    #[serde(default)]
    pub front: Option<AtlasCell>,
    #[serde(default)]
    pub back: Option<AtlasCell>,
}
