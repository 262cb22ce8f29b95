//! Bounded background job slots and the chunk mesh scheduler built on them.
#![forbid(unsafe_code)]

mod mesh;
mod pool;

pub use mesh::{ChunkMesh, MeshJob, MeshRequest, MeshSlots, MeshUpdateScheduler, RenderCollaborator};
pub use pool::{JobSlotPool, SlotHandler, SlotJob};
