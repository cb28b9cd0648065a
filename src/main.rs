mod assets;
mod config;

use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use strata_blocks::{AIR, BlockId};
use strata_geom::coords::{global_to_world, world_to_global};
use strata_geom::{BlockPos, CHUNK_HEIGHT, Vec3};
use strata_runtime::{ChunkPool, ChunkStreamer, HeadlessHandle, RenderPool};
use strata_world::World;

#[derive(Parser, Debug)]
#[command(name = "strata", about = "Headless voxel terrain streaming driver")]
struct Cli {
    /// Directory containing `assets/`
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Stream config file (defaults to assets/strata.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// World seed for structure placement
    #[arg(long)]
    seed: Option<i64>,
    /// Terrain noise seed
    #[arg(long)]
    terrain_seed: Option<i32>,
    #[arg(long)]
    render_distance: Option<i32>,
    /// Simulated frames to run
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Viewpoint speed along +x in blocks per tick
    #[arg(long, default_value_t = 0.25)]
    speed: f32,
    /// Place this block on the surface under the final viewpoint
    #[arg(long)]
    edit: Option<BlockId>,
    #[arg(long)]
    show_chunk_edges: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let root = assets::resolve_assets_root(cli.assets.clone());
    let mut loaded = config::load(&root, cli.config.as_ref())?;
    if let Some(seed) = cli.seed {
        loaded.worldgen.seed = seed;
    }
    if let Some(seed) = cli.terrain_seed {
        loaded.worldgen.terrain.noise.seed = seed;
    }
    if let Some(rd) = cli.render_distance {
        loaded.stream.render_distance = rd;
    }
    if cli.show_chunk_edges {
        loaded.stream.show_chunk_edges = true;
    }

    let t0 = Instant::now();
    let world = World::new(loaded.worldgen, loaded.registry, &loaded.structures);
    let pool = ChunkPool::headless(loaded.stream.prewarm());
    let mut streamer = ChunkStreamer::new(world, pool, &loaded.stream);

    let mut viewpoint = Vec3::new(0.5, 0.0, 0.5);
    streamer.start(viewpoint);
    log::info!(
        "hard load: {} chunks in {:.1} ms",
        streamer.loaded_count(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    let step = Vec3::new(cli.speed, 0.0, 0.0);
    for i in 0..cli.ticks {
        viewpoint += step;
        streamer.tick(viewpoint);
        if i % 100 == 99 {
            report(&streamer, i + 1);
        }
    }
    settle(&mut streamer, viewpoint);

    if let Some(id) = cli.edit {
        place_on_surface(&mut streamer, viewpoint, id);
    }

    report(&streamer, cli.ticks);
    let pool = streamer.pool().stats();
    log::info!(
        "pool: {} handles allocated, {} free, {} underflows",
        pool.allocated,
        pool.free,
        pool.underflows
    );
    Ok(())
}

type HeadlessStreamer = ChunkStreamer<ChunkPool<HeadlessHandle, fn() -> HeadlessHandle>>;

fn report<P: RenderPool>(s: &ChunkStreamer<P>, tick: u32) {
    let st = s.stats();
    let (queued, inflight, ready) = s.runtime().queue_debug_counts();
    let center = s.center().unwrap_or_default();
    log::info!(
        "tick {tick}: center ({}, {}) loaded {} pending {} | jobs q={queued} run={inflight} \
         done={ready} | applied {} unloaded {} dropped {}/{} refreshed {}",
        center.cx,
        center.cy,
        s.loaded_count(),
        s.inflight_count(),
        st.applied,
        st.unloaded,
        st.discarded_undesired,
        st.discarded_stale,
        st.refreshed
    );
}

fn settle(s: &mut HeadlessStreamer, viewpoint: Vec3) {
    let t0 = Instant::now();
    while !s.is_settled() {
        if t0.elapsed() > Duration::from_secs(30) {
            log::warn!("gave up waiting for {} pending meshes", s.inflight_count());
            return;
        }
        s.tick(viewpoint);
        thread::sleep(Duration::from_millis(1));
    }
}

fn place_on_surface(s: &mut HeadlessStreamer, viewpoint: Vec3, id: BlockId) {
    let g = world_to_global(viewpoint);
    let top = (0..CHUNK_HEIGHT)
        .rev()
        .find(|&z| s.world().block_at_global(BlockPos::new(g.x, g.y, z)) != AIR);
    let z = top.map_or(0, |z| z + 1);
    let point = global_to_world(BlockPos::new(g.x, g.y, z));
    if let Some(out) = s.apply_edit(point, id) {
        log::info!(
            "edit rev {} remeshed {:?}",
            out.rev,
            out.remeshed
                .iter()
                .map(|c| (c.cx, c.cy))
                .collect::<Vec<_>>()
        );
    }
}
