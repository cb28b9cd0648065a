use std::collections::HashSet;

use proptest::prelude::*;
use strata_blocks::{AtlasCell, BlockRegistry};
use strata_chunk::{ChunkNeighbors, ChunkSnapshot};
use strata_geom::coords::block_index;
use strata_geom::{CHUNK_VOLUME, ChunkCoord};
use strata_mesh_cpu::{ChunkMeshData, MeshOptions, mesh_chunk};

const STONE: u16 = 1;
const GRASS: u16 = 4;

fn solid(c: ChunkCoord) -> ChunkSnapshot {
    ChunkSnapshot::from_blocks(c, vec![STONE; CHUNK_VOLUME])
}

fn solid_neighbors(c: ChunkCoord) -> ChunkNeighbors {
    ChunkNeighbors {
        neg_x: solid(c.offset(-1, 0)),
        pos_x: solid(c.offset(1, 0)),
        neg_y: solid(c.offset(0, -1)),
        pos_y: solid(c.offset(0, 1)),
    }
}

fn with_cells(c: ChunkCoord, base: u16, cells: &[((usize, usize, usize), u16)]) -> ChunkSnapshot {
    let mut blocks = vec![base; CHUNK_VOLUME];
    for &((x, y, z), id) in cells {
        blocks[block_index(x, y, z)] = id;
    }
    ChunkSnapshot::from_blocks(c, blocks)
}

fn quad_uvs(m: &ChunkMeshData, q: usize) -> Vec<[f32; 2]> {
    (0..4)
        .map(|k| {
            let v = q * 4 + k;
            [m.mesh.uv[v * 2], m.mesh.uv[v * 2 + 1]]
        })
        .collect()
}

fn quad_positions(m: &ChunkMeshData, q: usize) -> Vec<[f32; 3]> {
    (0..4)
        .map(|k| {
            let v = q * 4 + k;
            [m.mesh.pos[v * 3], m.mesh.pos[v * 3 + 1], m.mesh.pos[v * 3 + 2]]
        })
        .collect()
}

fn same_corners(a: &[[f32; 2]], b: &[[f32; 2]; 4]) -> bool {
    b.iter().all(|uv| a.contains(uv)) && a.len() == 4
}

#[test]
fn enclosed_cell_across_chunk_boundary_emits_nothing() {
    let reg = BlockRegistry::builtin();
    let c = ChunkCoord::new(0, 0);
    let center = with_cells(
        c,
        0,
        &[
            ((0, 5, 5), STONE),
            ((1, 5, 5), STONE),
            ((0, 4, 5), STONE),
            ((0, 6, 5), STONE),
            ((0, 5, 4), STONE),
            ((0, 5, 6), STONE),
        ],
    );
    let mut neighbors = ChunkNeighbors::empty_around(c);
    neighbors.neg_x = with_cells(c.offset(-1, 0), 0, &[((15, 5, 5), STONE)]);

    let m = mesh_chunk(&center, &neighbors, &reg, &MeshOptions::default());
    // five arms with five open faces each; the middle cell is fully hidden
    assert_eq!(m.quad_count(), 25);
    assert_eq!(m.mesh.vertex_count(), 100);
    assert_eq!(m.mesh.idx.len(), 150);

    let edges = mesh_chunk(
        &center,
        &neighbors,
        &reg,
        &MeshOptions {
            show_chunk_edges: true,
        },
    );
    assert_eq!(edges.quad_count(), 26);
}

#[test]
fn single_open_side_gives_one_quad_with_face_uvs() {
    let reg = BlockRegistry::builtin();
    let c = ChunkCoord::new(2, -3);
    let center = with_cells(c, STONE, &[((5, 5, 30), GRASS), ((5, 5, 31), 0)]);
    let m = mesh_chunk(&center, &solid_neighbors(c), &reg, &MeshOptions::default());
    // top and bottom layers of the world, the grass top, and five faces lining the hole
    assert_eq!(m.quad_count(), 256 + 256 + 1 + 5);

    let grass_top = reg.atlas.uvs_for(reg.lookup(GRASS).faces.top);
    assert_eq!(reg.lookup(GRASS).faces.top, AtlasCell::new(0, 1));
    let hits: Vec<usize> = (0..m.quad_count())
        .filter(|&q| same_corners(&quad_uvs(&m, q), &grass_top))
        .collect();
    assert_eq!(hits.len(), 1);

    let q = hits[0];
    let normal = [m.mesh.norm[q * 12], m.mesh.norm[q * 12 + 1], m.mesh.norm[q * 12 + 2]];
    assert_eq!(normal, [0.0, 1.0, 0.0]);
    let xs: HashSet<i32> = quad_positions(&m, q).iter().map(|p| p[0] as i32).collect();
    let zs: HashSet<i32> = quad_positions(&m, q).iter().map(|p| p[2] as i32).collect();
    assert_eq!(xs, HashSet::from([-3, -2]));
    assert_eq!(zs, HashSet::from([-3, -2]));
    for p in quad_positions(&m, q) {
        assert_eq!(p[1], -33.0);
    }
    assert_eq!(&m.mesh.idx[q * 6..q * 6 + 6], &[
        (q * 4) as u32,
        (q * 4 + 1) as u32,
        (q * 4 + 2) as u32,
        (q * 4) as u32,
        (q * 4 + 2) as u32,
        (q * 4 + 3) as u32,
    ]);
}

#[test]
fn neighbour_blocks_hide_boundary_faces() {
    let reg = BlockRegistry::builtin();
    let c = ChunkCoord::new(0, 0);
    let center = with_cells(c, 0, &[((15, 3, 10), STONE)]);
    let mut neighbors = ChunkNeighbors::empty_around(c);
    let open = mesh_chunk(&center, &neighbors, &reg, &MeshOptions::default());
    assert_eq!(open.quad_count(), 6);

    neighbors.pos_x = with_cells(c.offset(1, 0), 0, &[((0, 3, 10), STONE)]);
    let hidden = mesh_chunk(&center, &neighbors, &reg, &MeshOptions::default());
    assert_eq!(hidden.quad_count(), 5);

    let forced = mesh_chunk(
        &center,
        &neighbors,
        &reg,
        &MeshOptions {
            show_chunk_edges: true,
        },
    );
    assert_eq!(forced.quad_count(), 6);
}

#[test]
fn vertical_ends_of_the_world_are_open() {
    let reg = BlockRegistry::builtin();
    let c = ChunkCoord::new(0, 0);
    let center = solid(c);
    let m = mesh_chunk(&center, &solid_neighbors(c), &reg, &MeshOptions::default());
    assert_eq!(m.quad_count(), 512);
    let bounds = m.bbox;
    for p in m.mesh.pos.chunks(3) {
        assert!(p[1] == 0.0 || p[1] == -64.0);
        assert!(bounds.contains(strata_geom::Vec3::new(p[0], p[1], p[2])));
    }
}

fn brute_force_quads(cells: &HashSet<(i32, i32, i32)>) -> usize {
    let mut n = 0;
    for &(x, y, z) in cells {
        for (dx, dy, dz) in [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0), (0, 0, 1), (0, 0, -1)] {
            if !cells.contains(&(x + dx, y + dy, z + dz)) {
                n += 1;
            }
        }
    }
    n
}

proptest! {
    // with empty neighbours the quad count is the number of solid/open cell pairs
    #[test]
    fn quad_count_matches_exposed_faces(
        cells in prop::collection::hash_set((0i32..16, 0i32..16, 0i32..64), 0..60)
    ) {
        let reg = BlockRegistry::builtin();
        let c = ChunkCoord::new(0, 0);
        let list: Vec<_> = cells
            .iter()
            .map(|&(x, y, z)| ((x as usize, y as usize, z as usize), STONE))
            .collect();
        let center = with_cells(c, 0, &list);
        let m = mesh_chunk(
            &center,
            &ChunkNeighbors::empty_around(c),
            &reg,
            &MeshOptions::default(),
        );
        let cells: HashSet<_> = cells.into_iter().collect();
        prop_assert_eq!(m.quad_count(), brute_force_quads(&cells));
        prop_assert_eq!(m.mesh.vertex_count(), m.quad_count() * 4);
        prop_assert_eq!(m.mesh.uv.len(), m.quad_count() * 8);
    }
}
