use strata_blocks::BlockFace;
use strata_geom::Vec3;

/// Cube face in block space (z-up).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Block-space step `(dx, dy, dz)` out through this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    /// Outward unit normal in render space (y-up; block y maps to render z).
    #[inline]
    pub fn normal(self) -> Vec3 {
        match self {
            Face::PosX => Vec3::new(1.0, 0.0, 0.0),
            Face::NegX => Vec3::new(-1.0, 0.0, 0.0),
            Face::PosY => Vec3::new(0.0, 0.0, 1.0),
            Face::NegY => Vec3::new(0.0, 0.0, -1.0),
            Face::PosZ => Vec3::new(0.0, 1.0, 0.0),
            Face::NegZ => Vec3::new(0.0, -1.0, 0.0),
        }
    }

    /// Which of a block's six textures this face shows.
    #[inline]
    pub fn block_face(self) -> BlockFace {
        match self {
            Face::PosZ => BlockFace::Top,
            Face::NegZ => BlockFace::Bottom,
            Face::NegX => BlockFace::Left,
            Face::PosX => BlockFace::Right,
            Face::PosY => BlockFace::Front,
            Face::NegY => BlockFace::Back,
        }
    }

    /// Render-space corner of the face plus its texture `u` and `v` edge
    /// vectors, relative to the cell's minimum corner. `u` runs left to
    /// right and `v` top to bottom as seen from outside.
    #[inline]
    pub(crate) fn frame(self) -> (Vec3, Vec3, Vec3) {
        match self {
            Face::PosX => (
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(0.0, -1.0, 0.0),
            ),
            Face::NegX => (
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, -1.0, 0.0),
            ),
            Face::PosY => (
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
            ),
            Face::NegY => (
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
            ),
            Face::PosZ => (
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ),
            Face::NegZ => (
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -1.0),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_lie_in_the_face_plane() {
        for f in Face::ALL {
            let (base, u, v) = f.frame();
            let n = f.normal();
            assert_eq!(u.dot(n), 0.0);
            assert_eq!(v.dot(n), 0.0);
            // the plane sits on the outward side of the unit cell
            let centre = Vec3::new(0.5, 0.5, 0.5);
            assert!((base - centre).dot(n) > 0.0, "{f:?}");
        }
    }

    #[test]
    fn normal_agrees_with_delta() {
        for f in Face::ALL {
            let (dx, dy, dz) = f.delta();
            let n = f.normal();
            // block (x, y, z) maps to render (x, z, y)
            assert_eq!((n.x, n.y, n.z), (dx as f32, dz as f32, dy as f32));
        }
    }
}
