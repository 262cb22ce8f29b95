//! CPU face-culling mesher for volume chunks.
#![forbid(unsafe_code)]

mod buffer;
mod face;
mod mesher;

pub use buffer::{FACES_PER_VOXEL, GeometryBuffer, INDICES_PER_QUAD, VERTS_PER_QUAD};
pub use face::Face;
pub use mesher::{MeshParams, build_chunk_mesh};
