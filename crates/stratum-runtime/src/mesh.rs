use std::sync::Arc;

use hashbrown::HashMap;
use rayon::ThreadPoolBuildError;
use stratum_geom::Vec3;
use stratum_materials::MaterialTable;
use stratum_mesh_cpu::{GeometryBuffer, MeshParams, build_chunk_mesh};
use stratum_world::{ChunkId, VoxelGrid};

use crate::pool::{JobSlotPool, SlotHandler, SlotJob};

/// Finished chunk geometry, borrowed from the slot buffer for the duration of the callback.
#[derive(Debug)]
pub struct ChunkMesh<'a> {
    pub chunk: ChunkId,
    /// World position of the chunk's local origin.
    pub origin: Vec3,
    pub quad_count: usize,
    pub vertices: &'a [Vec3],
    pub indices: &'a [u32],
    pub uvs: &'a [[f32; 2]],
    pub colors: &'a [[f32; 4]],
}

/// Consumer of finished meshes. The slices are only valid during the call; implementations
/// copy or upload what they need before returning.
pub trait RenderCollaborator {
    fn on_chunk_mesh_ready(&mut self, mesh: &ChunkMesh<'_>);
}

/// One chunk build: snapshot in, geometry out.
pub struct MeshJob {
    pub chunk: ChunkId,
    grid: Arc<VoxelGrid>,
    materials: Arc<MaterialTable>,
    params: MeshParams,
    buffer: GeometryBuffer,
    quad_count: usize,
}

impl SlotJob for MeshJob {
    fn execute(&mut self) {
        self.quad_count = build_chunk_mesh(
            &self.grid,
            self.chunk,
            &self.params,
            &self.materials,
            &mut self.buffer,
        );
    }
}

/// A chunk to rebuild and the volume snapshot the build reads.
#[derive(Clone, Debug)]
pub struct MeshRequest {
    pub chunk: ChunkId,
    pub volume: Arc<VoxelGrid>,
}

/// Slot handler behind [`MeshUpdateScheduler`]: one geometry buffer per slot, reused across builds.
pub struct MeshSlots<R> {
    buffers: Vec<Option<GeometryBuffer>>,
    buffer_quads: usize,
    materials: Arc<MaterialTable>,
    params: MeshParams,
    /// Running builds per chunk; the same chunk may be in several slots at once.
    building: HashMap<ChunkId, usize>,
    quads_emitted: u64,
    collaborator: R,
}

impl<R: RenderCollaborator> SlotHandler for MeshSlots<R> {
    type Params = MeshRequest;
    type Job = MeshJob;

    fn on_ready(&mut self, slot: usize, request: &MeshRequest) -> MeshJob {
        let chunk = &request.chunk;
        let buffer = self.buffers[slot]
            .take()
            .unwrap_or_else(|| GeometryBuffer::with_quad_capacity(self.buffer_quads));
        *self.building.entry(*chunk).or_insert(0) += 1;
        log::debug!(target: "events", "mesh start {chunk} slot={slot}");
        MeshJob {
            chunk: *chunk,
            grid: Arc::clone(&request.volume),
            materials: Arc::clone(&self.materials),
            params: self.params,
            buffer,
            quad_count: 0,
        }
    }

    fn on_complete(&mut self, slot: usize, request: MeshRequest, job: MeshJob) {
        let chunk = request.chunk;
        if let Some(n) = self.building.get_mut(&chunk) {
            *n -= 1;
            if *n == 0 {
                self.building.remove(&chunk);
            }
        }
        let size = self.params.chunk_size as f32;
        let origin = Vec3::new(chunk.cx as f32 * size, 0.0, chunk.cz as f32 * size)
            .scale(self.params.tile_size);
        let buf = &job.buffer;
        self.collaborator.on_chunk_mesh_ready(&ChunkMesh {
            chunk,
            origin,
            quad_count: job.quad_count,
            vertices: buf.written_vertices(),
            indices: buf.written_indices(),
            uvs: buf.written_uvs(),
            colors: buf.written_colors(),
        });
        self.quads_emitted += job.quad_count as u64;
        log::debug!(target: "events", "mesh done {chunk} slot={slot} quads={}", job.quad_count);
        self.buffers[slot] = Some(job.buffer);
    }
}

/// Chunk rebuilds on a [`JobSlotPool`], each job reading a stable snapshot of the volume.
pub struct MeshUpdateScheduler<R: RenderCollaborator> {
    pool: JobSlotPool<MeshSlots<R>>,
}

impl<R: RenderCollaborator> MeshUpdateScheduler<R> {
    /// Allocates `slots` geometry buffers sized for a full `chunk_size x height` chunk.
    pub fn new(
        slots: usize,
        height: usize,
        params: MeshParams,
        materials: MaterialTable,
        collaborator: R,
    ) -> Result<Self, ThreadPoolBuildError> {
        let buffers: Vec<Option<GeometryBuffer>> = (0..slots)
            .map(|_| Some(GeometryBuffer::for_chunk(params.chunk_size, height)))
            .collect();
        let buffer_quads = buffers
            .first()
            .and_then(|b| b.as_ref())
            .map_or(0, GeometryBuffer::max_quads);
        log::info!(
            "mesh scheduler: {slots} slots, {buffer_quads} quads per slot buffer"
        );
        let handler = MeshSlots {
            buffers,
            buffer_quads,
            materials: Arc::new(materials),
            params,
            building: HashMap::new(),
            quads_emitted: 0,
            collaborator,
        };
        Ok(Self {
            pool: JobSlotPool::new(slots, handler, "stratum-mesh")?,
        })
    }

    /// Queues a rebuild of `chunk` against `volume`. The snapshot is held until the build
    /// completes, so later volume writes do not reach it.
    pub fn schedule(&mut self, chunk: ChunkId, volume: Arc<VoxelGrid>) {
        self.pool.schedule(MeshRequest { chunk, volume });
    }

    /// Forwards finished meshes to the collaborator and starts queued builds.
    pub fn complete_and_drain(&mut self) -> usize {
        self.pool.complete_and_drain()
    }

    pub fn complete_blocking(&mut self) -> usize {
        self.pool.complete_blocking()
    }

    /// True while at least one build of `chunk` is running.
    #[inline]
    pub fn is_building(&self, chunk: ChunkId) -> bool {
        self.pool.handler().building.contains_key(&chunk)
    }

    #[inline]
    pub fn free_slots(&self) -> usize {
        self.pool.free_slots()
    }

    #[inline]
    pub fn in_flight(&self) -> usize {
        self.pool.in_flight()
    }

    #[inline]
    pub fn queued(&self) -> usize {
        self.pool.queued()
    }

    pub fn slot_count(&self) -> usize {
        self.pool.slot_count()
    }

    /// `(started, completed, quads emitted)` since construction.
    pub fn counters(&self) -> (u64, u64, u64) {
        let (started, completed) = self.pool.counters();
        (started, completed, self.pool.handler().quads_emitted)
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.pool.handler().materials
    }

    pub fn params(&self) -> &MeshParams {
        &self.pool.handler().params
    }

    pub fn collaborator(&self) -> &R {
        &self.pool.handler().collaborator
    }

    pub fn collaborator_mut(&mut self) -> &mut R {
        &mut self.pool.handler_mut().collaborator
    }
}
