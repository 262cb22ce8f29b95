//! Dirty-chunk tracking for voxel edits.
#![forbid(unsafe_code)]

use std::collections::VecDeque;

use hashbrown::HashSet;
use stratum_materials::VoxelType;
use stratum_world::{ChunkId, ChunkLayout, TileCoord, VolumeListener};

/// Deduplicated FIFO of chunks awaiting a (re)build.
#[derive(Default, Debug, Clone)]
pub struct PendingUpdateSet {
    order: VecDeque<ChunkId>,
    members: HashSet<ChunkId>,
}

impl PendingUpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the chunk was not already pending.
    pub fn insert(&mut self, id: ChunkId) -> bool {
        if self.members.insert(id) {
            self.order.push_back(id);
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, id: ChunkId) -> bool {
        if self.members.remove(&id) {
            self.order.retain(|c| *c != id);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn contains(&self, id: ChunkId) -> bool {
        self.members.contains(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pending ids, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = ChunkId> + '_ {
        self.order.iter().copied()
    }

    /// Removes and returns up to `max` ids, oldest first, skipping ids `ready` rejects.
    /// Skipped ids keep their place in line.
    pub fn take_ready(&mut self, max: usize, mut ready: impl FnMut(ChunkId) -> bool) -> Vec<ChunkId> {
        let mut taken = Vec::new();
        if max == 0 {
            return taken;
        }
        let mut kept = VecDeque::with_capacity(self.order.len());
        while let Some(id) = self.order.pop_front() {
            if taken.len() < max && ready(id) {
                self.members.remove(&id);
                taken.push(id);
            } else {
                kept.push_back(id);
            }
        }
        self.order = kept;
        taken
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

/// Chunks whose mesh depends on the presence of `tile`: its own chunk, plus the chunk across
/// any X or Z border the tile sits on. Face culling only looks at the six axis neighbors,
/// so diagonal chunks are never affected.
pub fn affected_chunks(layout: &ChunkLayout, tile: TileCoord) -> Vec<ChunkId> {
    let own = layout.chunk_of(tile);
    let local = layout.local_of(tile);
    let last = layout.chunk_size as i32 - 1;
    let mut affected = vec![own];

    let mut offsets_x = Vec::new();
    let mut offsets_z = Vec::new();
    if local.x == last && tile.x + 1 < layout.dims.width as i32 {
        offsets_x.push(1);
    }
    if local.x == 0 && tile.x > 0 {
        offsets_x.push(-1);
    }
    if local.z == last && tile.z + 1 < layout.dims.depth as i32 {
        offsets_z.push(1);
    }
    if local.z == 0 && tile.z > 0 {
        offsets_z.push(-1);
    }

    for dx in offsets_x {
        affected.push(own.offset(dx, 0));
    }
    for dz in offsets_z {
        affected.push(own.offset(0, dz));
    }
    affected
}

/// Volume listener that turns change notifications into pending chunk rebuilds.
pub struct ChunkInvalidator<'a> {
    pub layout: &'a ChunkLayout,
    pub pending: &'a mut PendingUpdateSet,
}

impl VolumeListener for ChunkInvalidator<'_> {
    fn present_changed(&mut self, tile: TileCoord, value: bool) {
        for id in affected_chunks(self.layout, tile) {
            if self.pending.insert(id) {
                log::debug!(target: "events", "chunk {id} dirty: tile {tile} present={value}");
            }
        }
    }

    fn type_changed(&mut self, tile: TileCoord, value: VoxelType) {
        for id in affected_chunks(self.layout, tile) {
            if self.pending.insert(id) {
                log::debug!(target: "events", "chunk {id} dirty: tile {tile} type={}", value.name());
            }
        }
    }
}
