use strata_geom::{Aabb, ChunkCoord, Vec3};
use strata_mesh_cpu::ChunkMeshData;

/// Render-side storage for chunk geometry. The streamer only ever talks to
/// handles through this interface.
pub trait RenderPool {
    type Handle;

    fn acquire(&mut self) -> Self::Handle;
    fn release(&mut self, handle: Self::Handle);
    /// Replaces the handle's geometry and places it at `origin`.
    fn upload(&mut self, handle: &mut Self::Handle, mesh: &ChunkMeshData, origin: Vec3);
}

/// A single reusable geometry slot.
pub trait MeshHandle {
    fn upload(&mut self, mesh: &ChunkMeshData, origin: Vec3);
    fn clear(&mut self);
}

/// Handle without a GPU behind it; keeps what was uploaded.
#[derive(Clone, Debug, Default)]
pub struct HeadlessHandle {
    pub coord: Option<ChunkCoord>,
    pub rev: u64,
    pub origin: Vec3,
    pub quads: usize,
    pub vertices: usize,
    pub bbox: Option<Aabb>,
    pub uploads: u32,
}

impl MeshHandle for HeadlessHandle {
    fn upload(&mut self, mesh: &ChunkMeshData, origin: Vec3) {
        self.coord = Some(mesh.coord);
        self.rev = mesh.rev;
        self.origin = origin;
        self.quads = mesh.quad_count();
        self.vertices = mesh.mesh.vertex_count();
        self.bbox = Some(mesh.bbox);
        self.uploads += 1;
    }

    fn clear(&mut self) {
        *self = Self {
            uploads: self.uploads,
            ..Self::default()
        };
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub allocated: usize,
    pub free: usize,
    pub underflows: usize,
}

/// Free list of handles built by `factory`, filled up front.
pub struct ChunkPool<H, F> {
    free: Vec<H>,
    factory: F,
    allocated: usize,
    underflows: usize,
}

impl<H: MeshHandle, F: FnMut() -> H> ChunkPool<H, F> {
    pub fn new(prewarm: usize, mut factory: F) -> Self {
        let free: Vec<H> = (0..prewarm).map(|_| factory()).collect();
        log::debug!(target: "stream", "prewarmed {prewarm} chunk handles");
        Self {
            free,
            factory,
            allocated: prewarm,
            underflows: 0,
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated,
            free: self.free.len(),
            underflows: self.underflows,
        }
    }
}

impl ChunkPool<HeadlessHandle, fn() -> HeadlessHandle> {
    pub fn headless(prewarm: usize) -> Self {
        Self::new(prewarm, HeadlessHandle::default)
    }
}

impl<H: MeshHandle, F: FnMut() -> H> RenderPool for ChunkPool<H, F> {
    type Handle = H;

    fn acquire(&mut self) -> H {
        if let Some(h) = self.free.pop() {
            return h;
        }
        self.underflows += 1;
        self.allocated += 1;
        log::warn!(
            target: "stream",
            "chunk handle pool ran dry; allocating handle #{}",
            self.allocated
        );
        (self.factory)()
    }

    fn release(&mut self, mut handle: H) {
        handle.clear();
        self.free.push(handle);
    }

    fn upload(&mut self, handle: &mut H, mesh: &ChunkMeshData, origin: Vec3) {
        handle.upload(mesh, origin);
    }
}
