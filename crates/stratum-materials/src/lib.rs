//! Voxel types and the per-type material table.
#![forbid(unsafe_code)]

pub mod material;
pub mod types;

pub use material::{MaterialEntry, MaterialInfo, MaterialTable, MaterialsConfig};
pub use types::VoxelType;
