//! CPU face-culling mesher: turns chunk block data into per-face quads.
#![forbid(unsafe_code)]

mod face;
mod mesh_build;
mod neighbors;

pub use face::Face;
pub use mesh_build::MeshBuild;
pub use neighbors::{Beyond, NeighborView};

use strata_blocks::{AIR, BlockRegistry};
use strata_chunk::{ChunkNeighbors, ChunkSnapshot};
use strata_geom::{Aabb, CHUNK_HEIGHT, CHUNK_WIDTH, ChunkCoord, VERTICAL_OFFSET, Vec3};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshOptions {
    /// Emit every lateral boundary face without consulting neighbours.
    pub show_chunk_edges: bool,
}

/// Geometry for one chunk. Vertices are relative to the chunk's render
/// origin (see `strata_geom::coords::chunk_origin`).
#[derive(Clone, Debug)]
pub struct ChunkMeshData {
    pub coord: ChunkCoord,
    /// Edit revision of the block data this mesh was built from.
    pub rev: u64,
    pub mesh: MeshBuild,
    pub bbox: Aabb,
}

impl ChunkMeshData {
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.mesh.quad_count()
    }
}

/// Local bounds every chunk mesh fits in.
pub fn chunk_bounds() -> Aabb {
    let half = (CHUNK_WIDTH / 2) as f32;
    Aabb::new(
        Vec3::new(-half, -(VERTICAL_OFFSET as f32), -half),
        Vec3::new(half, (CHUNK_HEIGHT - VERTICAL_OFFSET) as f32, half),
    )
}

/// Render-space minimum corner of the cell at block-local `(x, y, z)`.
#[inline]
fn cell_origin(x: i32, y: i32, z: i32) -> Vec3 {
    let half = CHUNK_WIDTH / 2;
    Vec3::new(
        (x - half) as f32,
        (z - VERTICAL_OFFSET) as f32,
        (y - half) as f32,
    )
}

/// Emits one quad for every face of a solid cell that borders an empty
/// cell, the vertical ends of the world, or (with `show_chunk_edges`) a
/// lateral chunk edge. Unknown block ids panic.
pub fn mesh_chunk(
    chunk: &ChunkSnapshot,
    neighbors: &ChunkNeighbors,
    reg: &BlockRegistry,
    opts: &MeshOptions,
) -> ChunkMeshData {
    let view = NeighborView::new(chunk, neighbors);
    let mut mesh = MeshBuild::default();
    for z in 0..CHUNK_HEIGHT {
        for y in 0..CHUNK_WIDTH {
            for x in 0..CHUNK_WIDTH {
                let id = chunk.get(x as usize, y as usize, z as usize);
                if id == AIR {
                    continue;
                }
                let ty = reg.lookup(id);
                for face in Face::ALL {
                    let (dx, dy, dz) = face.delta();
                    if !view.is_open(x + dx, y + dy, z + dz, opts.show_chunk_edges) {
                        continue;
                    }
                    let uvs = reg.atlas.uvs_for(ty.faces.cell(face.block_face()));
                    mesh.add_face(face, cell_origin(x, y, z), uvs);
                }
            }
        }
    }
    log::trace!(
        target: "mesh",
        "meshed ({}, {}): {} quads",
        chunk.coord.cx,
        chunk.coord.cy,
        mesh.quad_count()
    );
    ChunkMeshData {
        coord: chunk.coord,
        rev: 0,
        mesh,
        bbox: chunk_bounds(),
    }
}
