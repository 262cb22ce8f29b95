//! Voxel volume storage, chunk layout, and tile picking.
#![forbid(unsafe_code)]

mod coord;
mod layout;
pub mod pick;
mod volume;

pub use coord::{ChunkId, TileCoord};
pub use layout::ChunkLayout;
pub use pick::{pick_tile, world_to_tile};
pub use volume::{VolumeChange, VolumeDims, VolumeError, VolumeListener, VoxelGrid, VoxelVolume};
