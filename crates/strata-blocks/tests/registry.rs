use std::path::PathBuf;

use strata_blocks::{AIR, AtlasCell, BlockFace, BlockRegistry};

fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets").join(name)
}

#[test]
fn builtin_registry_has_terrain_blocks() {
    let reg = BlockRegistry::builtin();
    assert_eq!(reg.id_by_name("air"), Some(AIR));
    assert_eq!(reg.id_by_name("stone"), Some(1));
    assert_eq!(reg.id_by_name("grass"), Some(4));
    assert_eq!(reg.id_by_name("leaves"), Some(5));
    assert!(reg.lookup(AIR).is_air());
    assert_eq!(reg.len(), 7);
}

#[test]
fn face_cells_resolve_specific_then_side_then_all() {
    let reg = BlockRegistry::from_toml_str(
        r#"
        [atlas]
        cols = 8
        rows = 8

        [[blocks]]
        id = 9
        name = "crate"
        all = [1, 1]
        side = [2, 2]
        front = [3, 3]
    "#,
    )
    .unwrap();
    let faces = reg.lookup(9).faces;
    assert_eq!(faces.cell(BlockFace::Top), AtlasCell::new(1, 1));
    assert_eq!(faces.cell(BlockFace::Bottom), AtlasCell::new(1, 1));
    assert_eq!(faces.cell(BlockFace::Left), AtlasCell::new(2, 2));
    assert_eq!(faces.cell(BlockFace::Back), AtlasCell::new(2, 2));
    assert_eq!(faces.cell(BlockFace::Front), AtlasCell::new(3, 3));
}

#[test]
fn duplicate_ids_are_rejected() {
    let err = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        id = 1
        name = "a"

        [[blocks]]
        id = 1
        name = "b"
    "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("duplicate id"));
}

#[test]
fn air_id_cannot_be_redefined() {
    let res = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        id = 0
        name = "void"
    "#,
    );
    assert!(res.is_err());
}

#[test]
fn cells_outside_atlas_are_rejected() {
    let res = BlockRegistry::from_toml_str(
        r#"
        [atlas]
        cols = 2
        rows = 2

        [[blocks]]
        id = 1
        name = "stone"
        all = [2, 0]
    "#,
    );
    assert!(res.is_err());
}

#[test]
#[should_panic(expected = "not registered")]
fn lookup_of_unknown_id_is_fatal() {
    let reg = BlockRegistry::builtin();
    let _ = reg.lookup(999);
}

#[test]
fn require_reports_unknown_names() {
    let reg = BlockRegistry::builtin();
    assert_eq!(reg.require("log").unwrap(), 3);
    assert!(reg.require("obsidian").is_err());
}

#[test]
fn shipped_blocks_match_builtin_ids() {
    let file = BlockRegistry::load_from_path(shipped("blocks.toml")).unwrap();
    let builtin = BlockRegistry::builtin();
    assert_eq!(file.len(), builtin.len());
    for name in ["air", "stone", "dirt", "log", "grass", "leaves", "planks"] {
        assert_eq!(file.id_by_name(name), builtin.id_by_name(name), "{name}");
    }
}
