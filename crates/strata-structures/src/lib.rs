//! Structure blueprints and randomized tree instances.
#![forbid(unsafe_code)]

pub mod blueprint;
pub mod config;
pub mod tree;

pub use blueprint::{Blueprint, StructureBlock};
pub use config::{StructureSet, StructuresConfig};
pub use tree::TreeTemplate;
