use serde::Deserialize;

pub type BlockId = u16;

/// Empty cell. Every id above zero is solid.
pub const AIR: BlockId = 0;

/// Cell coordinate in the texture atlas grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "[u16; 2]")]
pub struct AtlasCell {
    pub col: u16,
    pub row: u16,
}

impl AtlasCell {
    #[inline]
    pub const fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }
}

impl From<[u16; 2]> for AtlasCell {
    fn from(v: [u16; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

/// Face roles a block can texture independently. Block space is z-up:
/// top/bottom are +z/-z, left/right are -x/+x, back/front are -y/+y.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlockFace {
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaceTextures {
    pub top: AtlasCell,
    pub bottom: AtlasCell,
    pub left: AtlasCell,
    pub right: AtlasCell,
    pub front: AtlasCell,
    pub back: AtlasCell,
}

impl FaceTextures {
    #[inline]
    pub fn cell(&self, face: BlockFace) -> AtlasCell {
        match face {
            BlockFace::Top => self.top,
            BlockFace::Bottom => self.bottom,
            BlockFace::Left => self.left,
            BlockFace::Right => self.right,
            BlockFace::Front => self.front,
            BlockFace::Back => self.back,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub faces: FaceTextures,
}

impl BlockType {
    #[inline]
    pub fn is_air(&self) -> bool {
        self.id == AIR
    }
}
