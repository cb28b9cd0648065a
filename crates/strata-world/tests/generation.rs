use std::path::PathBuf;
use std::sync::Arc;

use strata_blocks::{AIR, BlockRegistry};
use strata_chunk::ChunkState;
use strata_geom::coords::{block_index, local_to_global};
use strata_geom::{BlockPos, ChunkCoord};
use strata_structures::StructureSet;
use strata_world::{GENERATION_MARGIN, World, WorldGenParams, load_params_from_path};

fn world(seed: i64) -> World {
    let reg = Arc::new(BlockRegistry::builtin());
    let mut params = WorldGenParams::defaults(&reg).unwrap();
    params.seed = seed;
    params.terrain.reference_size = 64;
    params.tree_instances = 8;
    let structures = StructureSet::builtin(&reg).unwrap();
    World::new(params, reg, &structures)
}

#[test]
fn generation_covers_margin_and_populates_inner_area() {
    let mut w = world(0);
    let rd = 5;
    let report = w.update_generation(ChunkCoord::new(0, 0), rd);
    let radius = rd / 2 + GENERATION_MARGIN;
    let side = (2 * radius + 1) as usize;
    assert_eq!(report.heightmapped, side * side);
    let inner = (2 * (radius - 2) + 1) as usize;
    assert_eq!(report.populated, inner * inner);
    for c in ChunkCoord::new(0, 0).square(radius) {
        let expected = if c.chebyshev(ChunkCoord::new(0, 0)) <= radius - 2 {
            ChunkState::Populated
        } else {
            ChunkState::Heightmapped
        };
        assert_eq!(w.state(c), Some(expected), "{c:?}");
    }
    assert_eq!(w.grid().len(), side * side);

    // a second sweep over the same area is a no-op
    let again = w.update_generation(ChunkCoord::new(0, 0), rd);
    assert_eq!(again.heightmapped, 0);
    assert_eq!(again.populated, 0);
}

#[test]
fn population_never_overwrites_terrain() {
    let mut w = world(3);
    let center = ChunkCoord::new(0, 0);
    for c in center.square(3) {
        w.generate_heightmap(c);
    }
    let before: Vec<_> = center
        .square(3)
        .map(|c| (c, w.snapshot(c)))
        .collect();
    for c in center.square(1) {
        w.populate(c);
    }
    for (c, snap) in before {
        let now = w.chunk(c).unwrap();
        for (i, (&old, &new)) in snap.blocks().iter().zip(now.blocks()).enumerate() {
            if old != AIR {
                assert_eq!(old, new, "chunk {c:?} cell {i} was overwritten");
            }
        }
    }
}

#[test]
fn same_seed_same_world() {
    let mut a = world(11);
    let mut b = world(11);
    a.update_generation(ChunkCoord::new(2, -1), 3);
    b.update_generation(ChunkCoord::new(2, -1), 3);
    for c in ChunkCoord::new(2, -1).square(4) {
        assert_eq!(
            a.chunk(c).unwrap().blocks(),
            b.chunk(c).unwrap().blocks(),
            "{c:?}"
        );
    }
}

#[test]
fn populate_requires_heightmapped_chunk() {
    let mut w = world(0);
    assert!(w.populate(ChunkCoord::new(5, 5)).is_none());
    assert_eq!(w.placed(ChunkCoord::new(5, 5)), None);
    w.update_generation(ChunkCoord::new(0, 0), 1);
    // already populated
    assert!(w.populate(ChunkCoord::new(0, 0)).is_none());
}

#[test]
fn placements_stay_within_the_density_budget() {
    let mut w = world(0);
    let center = ChunkCoord::new(0, 0);
    w.update_generation(center, 9);
    for c in center.square(9 / 2 + GENERATION_MARGIN) {
        let budget = w.placer().structure_count(c);
        assert!(budget <= 7);
        match w.state(c) {
            Some(ChunkState::Populated) => {
                let placed = w.placed(c).expect("populated");
                assert!(placed <= budget, "{c:?}: {placed} > {budget}");
            }
            _ => assert_eq!(w.placed(c), None, "{c:?}"),
        }
    }
}

#[test]
fn writes_go_to_the_indexed_cell() {
    let mut w = world(0);
    let c = ChunkCoord::new(0, 0);
    w.generate_heightmap(c);
    let i = block_index(3, 4, 63);
    w.set_block(c, i, 5);
    assert_eq!(w.chunk(c).unwrap().get(3, 4, 63), 5);
    assert_eq!(w.block_at_global(local_to_global(BlockPos::new(3, 4, 63), c)), 5);
}

#[test]
#[should_panic(expected = "not registered")]
fn writing_an_unknown_block_is_fatal() {
    let mut w = world(0);
    let c = ChunkCoord::new(0, 0);
    w.generate_heightmap(c);
    w.set_block(c, 0, 999);
}

#[test]
fn shipped_worldgen_matches_defaults() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets");
    let reg = BlockRegistry::load_from_path(dir.join("blocks.toml")).unwrap();
    let file = load_params_from_path(&dir.join("worldgen.toml"), &reg).unwrap();
    let defaults = WorldGenParams::defaults(&reg).unwrap();
    assert_eq!(file.seed, defaults.seed);
    assert_eq!(file.terrain.noise, defaults.terrain.noise);
    assert_eq!(file.density.noise, defaults.density.noise);
    assert_eq!(file.terrain.surface_min, defaults.terrain.surface_min);
    assert_eq!(file.terrain.surface_max, defaults.terrain.surface_max);
    assert_eq!(file.tree_instances, defaults.tree_instances);
}
