use std::error::Error;
use std::sync::Arc;

use stratum_edit::{ChunkInvalidator, PendingUpdateSet};
use stratum_geom::Vec3;
use stratum_materials::{MaterialTable, VoxelType};
use stratum_mesh_cpu::MeshParams;
use stratum_runtime::{MeshUpdateScheduler, RenderCollaborator};
use stratum_world::{ChunkLayout, TileCoord, VolumeError, VoxelVolume, pick_tile};

use crate::config::AppConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrchestratorStats {
    pub tick: u64,
    pub pending: usize,
    pub in_flight: usize,
    pub started: u64,
    pub completed: u64,
    pub quads: u64,
}

impl OrchestratorStats {
    /// Nothing pending and nothing building.
    pub fn is_idle(&self) -> bool {
        self.pending == 0 && self.in_flight == 0
    }
}

/// Owns the volume and drives chunk rebuilds: edits mark chunks dirty, `tick` hands dirty
/// chunks to the mesh scheduler as slots free up and forwards finished meshes.
pub struct Orchestrator<R: RenderCollaborator> {
    volume: VoxelVolume,
    layout: ChunkLayout,
    pending: PendingUpdateSet,
    scheduler: MeshUpdateScheduler<R>,
    tick: u64,
}

impl<R: RenderCollaborator> Orchestrator<R> {
    pub fn new(
        volume: VoxelVolume,
        max_jobs: usize,
        params: MeshParams,
        materials: MaterialTable,
        collaborator: R,
    ) -> Result<Self, Box<dyn Error>> {
        if params.chunk_size == 0 {
            return Err("chunk_size must be positive".into());
        }
        if max_jobs == 0 {
            return Err("max_jobs must be positive".into());
        }
        let layout = ChunkLayout::new(volume.dims(), params.chunk_size);
        let scheduler =
            MeshUpdateScheduler::new(max_jobs, volume.dims().height, params, materials, collaborator)?;
        log::info!(
            "orchestrator: volume {}x{}x{}, {} chunks of {}, {} job slots",
            layout.dims.width,
            layout.dims.depth,
            layout.dims.height,
            layout.chunk_count(),
            layout.chunk_size,
            max_jobs
        );
        Ok(Self {
            volume,
            layout,
            pending: PendingUpdateSet::new(),
            scheduler,
            tick: 0,
        })
    }

    /// Builds the volume described by `cfg` (bottom `fill_height` layers solid) and the
    /// scheduler around it.
    pub fn from_config(cfg: &AppConfig, collaborator: R) -> Result<Self, Box<dyn Error>> {
        cfg.validate()?;
        let mut volume = VoxelVolume::new(cfg.width, cfg.depth, cfg.height);
        volume.set_type_all(cfg.fill_type);
        for y in 0..cfg.fill_height as i32 {
            for z in 0..cfg.depth as i32 {
                for x in 0..cfg.width as i32 {
                    volume.set_present(TileCoord::new(x, y, z), true, &mut ())?;
                }
            }
        }
        Self::new(
            volume,
            cfg.max_jobs,
            cfg.mesh_params(),
            cfg.material_table()?,
            collaborator,
        )
    }

    #[cfg(test)]
    pub fn volume(&self) -> &VoxelVolume {
        &self.volume
    }

    #[cfg(test)]
    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    #[cfg(test)]
    pub fn pending(&self) -> &PendingUpdateSet {
        &self.pending
    }

    pub fn collaborator(&self) -> &R {
        self.scheduler.collaborator()
    }

    pub fn set_voxel(&mut self, tile: TileCoord, present: bool) -> Result<(), VolumeError> {
        let mut invalidator = ChunkInvalidator {
            layout: &self.layout,
            pending: &mut self.pending,
        };
        self.volume.set_present(tile, present, &mut invalidator)?;
        log::info!(target: "events", "[tick {}] VoxelSet {} present={}", self.tick, tile, present);
        Ok(())
    }

    pub fn set_type(&mut self, tile: TileCoord, ty: VoxelType) -> Result<(), VolumeError> {
        let mut invalidator = ChunkInvalidator {
            layout: &self.layout,
            pending: &mut self.pending,
        };
        self.volume.set_type(tile, ty, &mut invalidator)?;
        log::info!(target: "events", "[tick {}] VoxelTyped {} type={}", self.tick, tile, ty.name());
        Ok(())
    }

    /// Marks every chunk dirty, e.g. for the initial meshing pass.
    pub fn rebuild_all(&mut self) {
        for id in self.layout.chunks() {
            self.pending.insert(id);
        }
        log::info!(
            target: "events",
            "[tick {}] RebuildAll chunks={}",
            self.tick,
            self.layout.chunk_count()
        );
    }

    /// Tile under a world-space hit point from the render side, if any is present nearby.
    pub fn pick(&self, hit: Vec3) -> Option<TileCoord> {
        pick_tile(self.volume.grid(), self.scheduler.params().tile_size, hit)
    }

    /// One frame step: start pending chunks that fit in free slots, then collect whatever has
    /// finished. Never waits on a running build. Returns the number of meshes delivered.
    pub fn tick(&mut self) -> usize {
        self.tick += 1;
        self.dispatch_pending();
        let done = self.scheduler.complete_and_drain();
        if done > 0 {
            log::debug!(target: "events", "[tick {}] MeshesCompleted n={}", self.tick, done);
        }
        done
    }

    /// Runs until nothing is pending or building. Blocks; for shutdown and tests.
    pub fn flush(&mut self) -> usize {
        let mut done = 0;
        loop {
            self.dispatch_pending();
            if self.pending.is_empty() && self.scheduler.in_flight() == 0 {
                break;
            }
            done += self.scheduler.complete_blocking();
        }
        done
    }

    pub fn stats(&self) -> OrchestratorStats {
        let (started, completed, quads) = self.scheduler.counters();
        OrchestratorStats {
            tick: self.tick,
            pending: self.pending.len(),
            in_flight: self.scheduler.in_flight(),
            started,
            completed,
            quads,
        }
    }

    // A chunk still building stays pending so its follow-up build reads the newer snapshot.
    fn dispatch_pending(&mut self) {
        let capacity = self.scheduler.free_slots();
        let scheduler = &self.scheduler;
        let ready = self
            .pending
            .take_ready(capacity, |id| !scheduler.is_building(id));
        if ready.is_empty() {
            return;
        }
        let snapshot = self.volume.snapshot();
        for id in ready {
            log::debug!(target: "events", "[tick {}] ChunkRebuildScheduled {}", self.tick, id);
            self.scheduler.schedule(id, Arc::clone(&snapshot));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_runtime::ChunkMesh;
    use stratum_world::ChunkId;

    #[derive(Default)]
    struct Sink {
        ready: Vec<(ChunkId, usize)>,
    }

    impl RenderCollaborator for Sink {
        fn on_chunk_mesh_ready(&mut self, mesh: &ChunkMesh<'_>) {
            self.ready.push((mesh.chunk, mesh.quad_count));
        }
    }

    fn slab(width: usize, depth: usize, chunk_size: usize, jobs: usize) -> Orchestrator<Sink> {
        let mut vol = VoxelVolume::new(width, depth, 1);
        vol.set_present_all(true);
        let params = MeshParams {
            chunk_size,
            ..MeshParams::default()
        };
        Orchestrator::new(vol, jobs, params, MaterialTable::default(), Sink::default()).unwrap()
    }

    fn count_for(sink: &Sink, id: ChunkId) -> usize {
        sink.ready.iter().filter(|r| r.0 == id).count()
    }

    #[test]
    fn boundary_edits_in_one_tick_rebuild_each_side_once() {
        let mut orch = slab(8, 4, 4, 2);
        orch.set_voxel(TileCoord::new(3, 0, 1), false).unwrap();
        orch.set_voxel(TileCoord::new(4, 0, 2), false).unwrap();
        orch.set_voxel(TileCoord::new(3, 0, 3), false).unwrap();
        assert_eq!(orch.pending().len(), 2);
        orch.flush();
        let sink = orch.collaborator();
        assert_eq!(sink.ready.len(), 2);
        assert_eq!(count_for(sink, ChunkId::new(0, 0)), 1);
        assert_eq!(count_for(sink, ChunkId::new(1, 0)), 1);
    }

    #[test]
    fn low_edge_edit_invalidates_the_low_neighbor() {
        let mut orch = slab(8, 8, 4, 1);
        orch.set_voxel(TileCoord::new(4, 0, 5), false).unwrap();
        let mut ids: Vec<ChunkId> = orch.pending().iter().collect();
        ids.sort();
        assert_eq!(ids, vec![ChunkId::new(0, 1), ChunkId::new(1, 1)]);
    }

    #[test]
    fn tick_never_exceeds_slot_capacity() {
        let mut orch = slab(16, 16, 4, 3);
        orch.rebuild_all();
        assert_eq!(orch.pending().len(), 16);
        orch.tick();
        let stats = orch.stats();
        assert!(stats.in_flight <= 3);
        assert_eq!(stats.pending + stats.started as usize, 16);
        orch.flush();
        let stats = orch.stats();
        assert!(stats.is_idle());
        assert_eq!(stats.completed, 16);
        assert_eq!(orch.collaborator().ready.len(), 16);
    }

    #[test]
    fn edit_during_build_triggers_a_follow_up_with_new_state() {
        let mut orch = slab(2, 2, 2, 1);
        orch.rebuild_all();
        orch.tick();
        // The first build holds the pre-edit snapshot.
        orch.set_voxel(TileCoord::new(0, 0, 0), false).unwrap();
        orch.flush();
        let ready = &orch.collaborator().ready;
        assert_eq!(ready.len(), 2);
        assert_eq!(ready[0], (ChunkId::new(0, 0), 16));
        assert_eq!(ready[1], (ChunkId::new(0, 0), 14));
    }

    #[test]
    fn new_rejects_zero_chunk_size_and_zero_jobs() {
        let vol = || VoxelVolume::new(4, 4, 1);
        let zero_chunk = MeshParams {
            chunk_size: 0,
            ..MeshParams::default()
        };
        let err = Orchestrator::new(vol(), 2, zero_chunk, MaterialTable::default(), Sink::default())
            .err()
            .map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("chunk_size must be positive"));
        let err = Orchestrator::new(vol(), 0, MeshParams::default(), MaterialTable::default(), Sink::default())
            .err()
            .map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("max_jobs must be positive"));
    }

    #[test]
    fn rejected_edit_leaves_everything_untouched() {
        let mut orch = slab(4, 4, 2, 1);
        assert!(orch.set_voxel(TileCoord::new(0, 1, 0), false).is_err());
        assert!(orch.set_type(TileCoord::new(-1, 0, 0), VoxelType::Sand).is_err());
        assert!(orch.pending().is_empty());
        assert_eq!(orch.volume().grid().present_count(), 16);
    }

    #[test]
    fn pick_resolves_clicks_on_faces() {
        let mut orch = slab(4, 4, 2, 1);
        assert_eq!(
            orch.pick(Vec3::new(2.5, 1.0, 0.5)),
            Some(TileCoord::new(2, 0, 0))
        );
        orch.set_voxel(TileCoord::new(1, 0, 2), false).unwrap();
        assert_eq!(orch.pick(Vec3::new(1.5, 0.5, 2.5)), None);
    }

    #[test]
    fn from_config_fills_bottom_layers() {
        let cfg = AppConfig {
            width: 6,
            depth: 5,
            height: 4,
            chunk_size: 3,
            max_jobs: 2,
            fill_height: 2,
            fill_type: VoxelType::Dirt,
            ..AppConfig::default()
        };
        let mut orch = Orchestrator::from_config(&cfg, Sink::default()).unwrap();
        assert_eq!(orch.volume().grid().present_count(), 60);
        assert_eq!(orch.volume().get_type(TileCoord::new(5, 1, 4)), VoxelType::Dirt);
        assert_eq!(orch.layout().chunk_count(), 4);
        orch.rebuild_all();
        assert_eq!(orch.flush(), 4);
    }
}
