//! Block types, texture atlas lookup, and the read-only block registry.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod config;
pub mod registry;
pub mod types;

pub use atlas::TextureAtlas;
pub use registry::BlockRegistry;
pub use types::{AIR, AtlasCell, BlockFace, BlockId, BlockType, FaceTextures};
