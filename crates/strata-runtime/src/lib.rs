//! Mesh worker pool, render handle pooling and chunk streaming.
#![forbid(unsafe_code)]

mod pool;
mod streamer;

pub use pool::{ChunkPool, HeadlessHandle, MeshHandle, PoolStats, RenderPool};
pub use streamer::{ChunkStreamer, EditOutcome, StreamConfig, StreamStats};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use strata_blocks::BlockRegistry;
use strata_chunk::{ChunkNeighbors, ChunkSnapshot};
use strata_geom::ChunkCoord;
use strata_mesh_cpu::{ChunkMeshData, MeshOptions, mesh_chunk};

/// One chunk to mesh: its own blocks plus the four lateral neighbours,
/// all immutable.
#[derive(Clone, Debug)]
pub struct MeshJob {
    pub coord: ChunkCoord,
    pub rev: u64,
    pub snapshot: ChunkSnapshot,
    pub neighbors: ChunkNeighbors,
}

pub struct MeshOut {
    pub data: ChunkMeshData,
    pub t_mesh_ms: u32,
}

fn process_mesh_job(job: MeshJob, reg: &BlockRegistry, opts: &MeshOptions, tx: &Sender<MeshOut>) {
    let MeshJob {
        coord,
        rev,
        snapshot,
        neighbors,
    } = job;
    debug_assert_eq!(snapshot.coord, coord);
    let t0 = Instant::now();
    let mut data = mesh_chunk(&snapshot, &neighbors, reg, opts);
    data.rev = rev;
    let t_mesh_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    // receiver gone means the runtime is shutting down
    let _ = tx.send(MeshOut { data, t_mesh_ms });
}

/// Number of mesh workers used when none is configured.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

/// Fixed-size pool of mesh workers fed through a channel. Results come back
/// in completion order.
pub struct Runtime {
    job_tx: Sender<MeshJob>,
    res_rx: Receiver<MeshOut>,
    _pool: Arc<ThreadPool>,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    pub workers: usize,
}

impl Runtime {
    pub fn new(reg: Arc<BlockRegistry>, opts: MeshOptions, workers: Option<usize>) -> Self {
        let (job_tx, job_rx) = unbounded::<MeshJob>();
        let (res_tx, res_rx) = unbounded::<MeshOut>();
        let workers = workers.unwrap_or_else(default_worker_count).max(1);

        let queued_ctr = Arc::new(AtomicUsize::new(0));
        let inflight_ctr = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("strata-mesh-{i}"))
                .build()
                .expect("mesh pool"),
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let reg = reg.clone();
            let queued = queued_ctr.clone();
            let inflight = inflight_ctr.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    queued.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    process_mesh_job(job, reg.as_ref(), &opts, &tx);
                    inflight.fetch_sub(1, Ordering::Relaxed);
                }
            });
        }
        log::info!(target: "stream", "mesh runtime started with {workers} workers");

        Self {
            job_tx,
            res_rx,
            _pool: pool,
            queued: queued_ctr,
            inflight: inflight_ctr,
            workers,
        }
    }

    pub fn submit(&self, job: MeshJob) {
        self.queued.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(job).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Next finished mesh, if any, without blocking.
    pub fn try_recv(&self) -> Option<MeshOut> {
        self.res_rx.try_recv().ok()
    }

    /// Blocks up to `timeout` for the next finished mesh.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<MeshOut> {
        match self.res_rx.recv_timeout(timeout) {
            Ok(out) => Some(out),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// `(queued, in flight, finished but not yet taken)`.
    pub fn queue_debug_counts(&self) -> (usize, usize, usize) {
        (
            self.queued.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
            self.res_rx.len(),
        )
    }
}
