use stratum_geom::Vec3;
use stratum_materials::MaterialTable;
use stratum_world::{ChunkId, TileCoord, VoxelGrid};

use crate::buffer::GeometryBuffer;
use crate::face::Face;

/// Per-build constants shared by every chunk of a volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshParams {
    pub chunk_size: usize,
    /// World size of one tile along each axis.
    pub tile_size: Vec3,
    /// Tiles spanned by one texture repeat.
    pub atlas_tiling_period: f32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            tile_size: Vec3::ONE,
            atlas_tiling_period: 10.0,
        }
    }
}

/// Builds the face-culled mesh of one chunk into `out` and returns the quad count.
///
/// A face is emitted for every present voxel side whose neighbor is absent. Neighbors are
/// read from the whole grid, so faces on chunk borders are culled against the adjacent
/// chunk, and the volume edge always produces faces because out-of-range reads are absent.
/// Vertex positions are chunk-local and scaled by `tile_size`; UVs come from world tile
/// coordinates divided by the atlas tiling period.
pub fn build_chunk_mesh(
    grid: &VoxelGrid,
    chunk: ChunkId,
    params: &MeshParams,
    materials: &MaterialTable,
    out: &mut GeometryBuffer,
) -> usize {
    out.reset();
    let size = params.chunk_size as i32;
    let height = grid.dims().height as i32;
    let base_x = chunk.cx * size;
    let base_z = chunk.cz * size;
    let inv_period = 1.0 / params.atlas_tiling_period;

    for y in 0..height {
        for z in 0..size {
            for x in 0..size {
                let here = TileCoord::new(base_x + x, y, base_z + z);
                if !grid.is_present(here) {
                    continue;
                }
                let color = materials.get(grid.get_type(here)).encode_color();
                let local = Vec3::new(x as f32, y as f32, z as f32);
                let world = Vec3::new(here.x as f32, here.y as f32, here.z as f32);

                for face in Face::ALL {
                    let (dx, dy, dz) = face.delta();
                    if grid.is_present(here.offset(dx, dy, dz)) {
                        continue;
                    }
                    let unit = face.corners();
                    let mut corners = [Vec3::ZERO; 4];
                    let mut uvs = [[0.0f32; 2]; 4];
                    for k in 0..4 {
                        corners[k] = (local + unit[k]).scale(params.tile_size);
                        let (u, v) = face.uv_axes(world + unit[k]);
                        uvs[k] = [u * inv_period, v * inv_period];
                    }
                    out.push_quad(corners, uvs, color);
                }
            }
        }
    }
    out.quad_count
}
