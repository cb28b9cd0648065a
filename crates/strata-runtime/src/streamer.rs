use std::collections::VecDeque;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use strata_blocks::{BlockId, BlockRegistry};
use strata_edit::{EditRevisions, EditTarget};
use strata_geom::coords::{chunk_origin, world_to_chunk};
use strata_geom::{ChunkCoord, Vec3};
use strata_mesh_cpu::{ChunkMeshData, MeshOptions, mesh_chunk};
use strata_world::World;

use crate::pool::RenderPool;
use crate::{MeshJob, Runtime};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Width of the visible square in chunks; even values are bumped to
    /// the next odd one.
    pub render_distance: i32,
    /// Mesh worker threads; `None` picks one per spare core.
    pub workers: Option<usize>,
    pub show_chunk_edges: bool,
    /// Handles created up front; `None` sizes the pool from the render distance.
    pub pool_prewarm: Option<usize>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            render_distance: 15,
            workers: None,
            show_chunk_edges: false,
            pool_prewarm: None,
        }
    }
}

impl StreamConfig {
    pub fn render_distance(&self) -> i32 {
        let rd = self.render_distance.max(1);
        if rd % 2 == 0 { rd + 1 } else { rd }
    }

    pub fn prewarm(&self) -> usize {
        self.pool_prewarm.unwrap_or_else(|| {
            let rd = self.render_distance() as usize;
            rd * rd + rd * 3
        })
    }

    pub fn mesh_options(&self) -> MeshOptions {
        MeshOptions {
            show_chunk_edges: self.show_chunk_edges,
        }
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub submitted: usize,
    pub applied: usize,
    pub unloaded: usize,
    pub discarded_undesired: usize,
    pub discarded_stale: usize,
    /// Loaded or pending chunks remeshed because a neighbour's structures
    /// reached into them.
    pub refreshed: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    pub target: EditTarget,
    pub rev: u64,
    /// Chunks remeshed synchronously, the edited chunk first.
    pub remeshed: Vec<ChunkCoord>,
}

/// Keeps the loaded chunk set equal to the square around the viewpoint.
///
/// Block data is generated on the calling thread. Meshing goes to the
/// [`Runtime`] and at most one finished mesh is put on a render handle per
/// [`tick`](Self::tick).
pub struct ChunkStreamer<P: RenderPool> {
    world: World,
    runtime: Runtime,
    pool: P,
    revisions: EditRevisions,
    render_distance: i32,
    opts: MeshOptions,
    center: Option<ChunkCoord>,
    desired: HashSet<ChunkCoord>,
    inflight: HashMap<ChunkCoord, u64>,
    loaded: HashMap<ChunkCoord, P::Handle>,
    unload: VecDeque<ChunkCoord>,
    stats: StreamStats,
}

impl<P: RenderPool> ChunkStreamer<P> {
    pub fn new(world: World, pool: P, cfg: &StreamConfig) -> Self {
        let opts = cfg.mesh_options();
        let runtime = Runtime::new(Arc::clone(world.registry()), opts, cfg.workers);
        Self {
            world,
            runtime,
            pool,
            revisions: EditRevisions::new(),
            render_distance: cfg.render_distance(),
            opts,
            center: None,
            desired: HashSet::new(),
            inflight: HashMap::new(),
            loaded: HashMap::new(),
            unload: VecDeque::new(),
            stats: StreamStats::default(),
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    #[inline]
    pub fn pool(&self) -> &P {
        &self.pool
    }

    #[inline]
    pub fn revisions(&self) -> &EditRevisions {
        &self.revisions
    }

    #[inline]
    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    #[inline]
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    #[inline]
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn desired(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.desired.iter().copied()
    }

    pub fn loaded(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.loaded.keys().copied()
    }

    #[inline]
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    #[inline]
    pub fn inflight_count(&self) -> usize {
        self.inflight.len()
    }

    #[inline]
    pub fn is_loaded(&self, c: ChunkCoord) -> bool {
        self.loaded.contains_key(&c)
    }

    pub fn handle(&self, c: ChunkCoord) -> Option<&P::Handle> {
        self.loaded.get(&c)
    }

    /// Nothing pending and exactly the desired square is loaded.
    pub fn is_settled(&self) -> bool {
        self.center.is_some()
            && self.inflight.is_empty()
            && self.unload.is_empty()
            && self.loaded.len() == self.desired.len()
            && self.desired.iter().all(|c| self.loaded.contains_key(c))
    }

    /// Loads everything around `viewpoint` before returning.
    pub fn start(&mut self, viewpoint: Vec3) {
        let c = world_to_chunk(viewpoint);
        log::info!(
            target: "stream",
            "hard load around ({}, {}) with render distance {}",
            c.cx,
            c.cy,
            self.render_distance
        );
        self.recenter(c, true);
        self.drain_unloads();
    }

    /// One step of the streaming loop.
    pub fn tick(&mut self, viewpoint: Vec3) {
        let c = world_to_chunk(viewpoint);
        if self.center != Some(c) {
            self.recenter(c, false);
        }
        if let Some(out) = self.runtime.try_recv() {
            log::trace!(
                target: "stream",
                "mesh ({}, {}) rev {} took {} ms",
                out.data.coord.cx,
                out.data.coord.cy,
                out.data.rev,
                out.t_mesh_ms
            );
            self.apply_mesh(out.data);
        }
        self.drain_unloads();
    }

    fn recenter(&mut self, center: ChunkCoord, hard: bool) {
        self.center = Some(center);
        let report = self.world.update_generation(center, self.render_distance);
        self.desired = center.square(self.render_distance / 2).collect();

        self.refresh(report.touched, hard);

        let mut to_unload: Vec<ChunkCoord> = self
            .loaded
            .keys()
            .copied()
            .filter(|c| !self.desired.contains(c) && !self.unload.contains(c))
            .collect();
        to_unload.sort_unstable();
        self.unload.extend(to_unload);

        let mut to_load: Vec<ChunkCoord> = self
            .desired
            .iter()
            .copied()
            .filter(|c| !self.loaded.contains_key(c) && !self.inflight.contains_key(c))
            .collect();
        // nearest first
        to_load.sort_unstable_by_key(|c| (c.chebyshev(center), *c));
        let n = to_load.len();
        for c in to_load {
            self.schedule(c, hard);
        }
        log::debug!(
            target: "stream",
            "center ({}, {}): {} to load, {} queued for unload, {} generated",
            center.cx,
            center.cy,
            n,
            self.unload.len(),
            report.heightmapped
        );
    }

    /// Rebuilds the chunks in `touched` that already have, or are waiting
    /// for, a mesh. Their revisions are bumped so older results drop.
    fn refresh(&mut self, touched: impl IntoIterator<Item = ChunkCoord>, hard: bool) {
        let mut touched: Vec<ChunkCoord> = touched
            .into_iter()
            .filter(|c| self.loaded.contains_key(c) || self.inflight.contains_key(c))
            .collect();
        touched.sort_unstable();
        for c in touched {
            self.revisions.bump(c);
            self.stats.refreshed += 1;
            self.schedule(c, hard);
        }
    }

    /// Meshes `c` now (`hard`) or hands it to the workers.
    fn schedule(&mut self, c: ChunkCoord, hard: bool) {
        let rev = self.revisions.rev(c);
        if hard {
            let data = self.mesh_now(c, rev);
            self.apply_mesh(data);
        } else {
            self.runtime.submit(MeshJob {
                coord: c,
                rev,
                snapshot: self.world.snapshot(c),
                neighbors: self.world.neighbors(c),
            });
            self.inflight.insert(c, rev);
            self.stats.submitted += 1;
        }
    }

    fn mesh_now(&self, c: ChunkCoord, rev: u64) -> ChunkMeshData {
        let mut data = mesh_chunk(
            &self.world.snapshot(c),
            &self.world.neighbors(c),
            self.world.registry(),
            &self.opts,
        );
        data.rev = rev;
        data
    }

    fn apply_mesh(&mut self, data: ChunkMeshData) {
        let c = data.coord;
        if self.inflight.get(&c).is_some_and(|&r| r <= data.rev) {
            self.inflight.remove(&c);
        }
        if !self.desired.contains(&c) {
            log::debug!(target: "stream", "dropping mesh for undesired chunk ({}, {})", c.cx, c.cy);
            self.stats.discarded_undesired += 1;
            return;
        }
        if self.revisions.is_stale(c, data.rev) {
            log::debug!(
                target: "stream",
                "dropping stale mesh for ({}, {}): rev {} < {}",
                c.cx,
                c.cy,
                data.rev,
                self.revisions.rev(c)
            );
            self.stats.discarded_stale += 1;
            if self.revisions.needs_rebuild(c) && !self.inflight.contains_key(&c) {
                self.schedule(c, false);
            }
            return;
        }
        let origin = chunk_origin(c);
        match self.loaded.get_mut(&c) {
            Some(handle) => self.pool.upload(handle, &data, origin),
            None => {
                let mut handle = self.pool.acquire();
                self.pool.upload(&mut handle, &data, origin);
                self.loaded.insert(c, handle);
            }
        }
        self.revisions.mark_built(c, data.rev);
        self.stats.applied += 1;
    }

    fn drain_unloads(&mut self) {
        while let Some(c) = self.unload.pop_front() {
            // the viewpoint may have come back before the queue drained
            if self.desired.contains(&c) {
                continue;
            }
            if let Some(handle) = self.loaded.remove(&c) {
                self.pool.release(handle);
                self.stats.unloaded += 1;
            }
        }
    }

    /// Writes `id` at a world point and remeshes the chunks whose faces it
    /// can change. `None` for points above or below the world.
    pub fn apply_edit(&mut self, point: Vec3, id: BlockId) -> Option<EditOutcome> {
        let Some(target) = EditTarget::resolve(point) else {
            log::warn!(
                target: "edit",
                "edit at ({:.2}, {:.2}, {:.2}) is outside the world",
                point.x,
                point.y,
                point.z
            );
            return None;
        };
        let reg: &BlockRegistry = self.world.registry();
        let name = reg.lookup(id).name.clone();
        self.world.set_block(target.chunk, target.index, id);
        let rev = self.revisions.bump_region_around(&target);

        let mut remeshed = Vec::new();
        for c in target.affected_chunks() {
            let visible = c == target.chunk
                || self.loaded.contains_key(&c)
                || self.inflight.contains_key(&c);
            if !visible || !self.desired.contains(&c) {
                continue;
            }
            let data = self.mesh_now(c, self.revisions.rev(c));
            self.apply_mesh(data);
            remeshed.push(c);
        }
        log::info!(
            target: "edit",
            "set {} at chunk ({}, {}) local ({}, {}, {}); remeshed {}",
            name,
            target.chunk.cx,
            target.chunk.cy,
            target.local.x,
            target.local.y,
            target.local.z,
            remeshed.len()
        );
        Some(EditOutcome {
            target,
            rev,
            remeshed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{ChunkPool, HeadlessHandle};
    use strata_geom::BlockPos;
    use strata_structures::{Blueprint, StructureBlock, StructureSet};
    use strata_world::WorldGenParams;

    fn streamer(rd: i32) -> ChunkStreamer<ChunkPool<HeadlessHandle, fn() -> HeadlessHandle>> {
        let reg = Arc::new(BlockRegistry::builtin());
        let mut params = WorldGenParams::defaults(&reg).unwrap();
        params.terrain.reference_size = 64;
        let structures = StructureSet::builtin(&reg).unwrap();
        let world = World::new(params, reg, &structures);
        let cfg = StreamConfig {
            render_distance: rd,
            workers: Some(1),
            ..StreamConfig::default()
        };
        ChunkStreamer::new(world, ChunkPool::headless(cfg.prewarm()), &cfg)
    }

    #[test]
    fn render_distance_is_forced_odd() {
        let mut cfg = StreamConfig::default();
        assert_eq!(cfg.render_distance(), 15);
        cfg.render_distance = 8;
        assert_eq!(cfg.render_distance(), 9);
        cfg.render_distance = 0;
        assert_eq!(cfg.render_distance(), 1);
        assert_eq!(cfg.prewarm(), 4);
    }

    #[test]
    fn config_fields_default_individually() {
        let cfg = StreamConfig::from_toml_str("render_distance = 7\n").unwrap();
        assert_eq!(cfg.render_distance, 7);
        assert_eq!(cfg.workers, None);
        assert!(!cfg.show_chunk_edges);
        assert!(StreamConfig::from_toml_str("render_distance = \"far\"").is_err());
    }

    #[test]
    fn stale_and_undesired_results_are_dropped() {
        let mut s = streamer(3);
        s.start(Vec3::new(0.0, 0.0, 0.0));
        assert!(s.is_settled());
        assert_eq!(s.loaded_count(), 9);

        let c = ChunkCoord::new(1, 1);
        let old = s.mesh_now(c, 0);
        s.revisions.bump(c);
        s.apply_mesh(old);
        assert_eq!(s.stats().discarded_stale, 1);
        assert_eq!(s.handle(c).map(|h| h.rev), Some(0));
        // the drop queued a rebuild at the new revision
        assert_eq!(s.inflight.get(&c).copied(), Some(s.revisions.rev(c)));

        let far = ChunkCoord::new(3, 0);
        let data = s.mesh_now(far, 0);
        s.apply_mesh(data);
        assert_eq!(s.stats().discarded_undesired, 1);
        assert!(!s.is_loaded(far));
    }

    #[test]
    fn structures_across_a_border_refresh_both_loaded_chunks() {
        let mut s = streamer(3);
        s.start(Vec3::new(0.0, 0.0, 0.0));
        let before = s.pool().stats();
        let refreshed = s.stats().refreshed;

        let wide = Blueprint::new(
            [3, 1, 1],
            vec![
                StructureBlock::new(BlockPos::new(-1, 0, 0), 5),
                StructureBlock::new(BlockPos::new(1, 0, 0), 5),
            ],
        );
        // global x 6 and 8 sit on either side of the (0,0)/(1,0) border
        let touched = s
            .world
            .place_structure(BlockPos::new(7, 0, 62), &wide)
            .expect("open sky above the terrain");
        s.refresh(touched, false);
        assert_eq!(s.inflight_count(), 2);

        let t0 = std::time::Instant::now();
        while !s.is_settled() {
            assert!(t0.elapsed().as_secs() < 10, "refresh did not finish");
            s.tick(Vec3::new(0.0, 0.0, 0.0));
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        assert_eq!(s.stats().refreshed, refreshed + 2);
        for c in [ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)] {
            let h = s.handle(c).expect("still loaded");
            assert_eq!(h.uploads, 2, "{c:?}");
            assert_eq!(h.rev, s.revisions.rev(c));
        }
        assert_eq!(s.handle(ChunkCoord::new(-1, 0)).map(|h| h.uploads), Some(1));
        assert_eq!(s.pool().stats(), before);
    }

    #[test]
    fn reapplying_replaces_the_existing_handle() {
        let mut s = streamer(3);
        s.start(Vec3::new(0.0, 0.0, 0.0));
        let before = s.pool().stats();
        let c = ChunkCoord::new(0, 0);
        let data = s.mesh_now(c, s.revisions.rev(c));
        s.apply_mesh(data);
        assert_eq!(s.loaded_count(), 9);
        assert_eq!(s.handle(c).map(|h| h.uploads), Some(2));
        assert_eq!(s.pool().stats(), before);
    }
}
