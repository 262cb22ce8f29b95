//! World position to tile mapping for pick queries coming back from the render side.

use stratum_geom::Vec3;

use crate::coord::TileCoord;
use crate::volume::{VolumeDims, VoxelGrid};

/// How far around a hit point to probe when it lands exactly on a face between tiles.
pub const PICK_PROBE_OFFSET: f32 = 0.01;

/// Maps a world position to a tile by clamping to the volume extent and flooring by tile
/// size. Positions on the far edge map one past the last tile, which reads as absent.
pub fn world_to_tile(dims: VolumeDims, tile_size: Vec3, pos: Vec3) -> TileCoord {
    #[inline]
    fn axis(p: f32, tiles: usize, size: f32) -> i32 {
        let clamped = p.clamp(0.0, tiles as f32 * size);
        (clamped / size).floor() as i32
    }
    TileCoord::new(
        axis(pos.x, dims.width, tile_size.x),
        axis(pos.y, dims.height, tile_size.y),
        axis(pos.z, dims.depth, tile_size.z),
    )
}

/// Resolves a hit point to a present tile. A hit on a face usually lands on the boundary
/// of the empty neighbor, so absent results are retried at small offsets on every axis.
pub fn pick_tile(grid: &VoxelGrid, tile_size: Vec3, hit: Vec3) -> Option<TileCoord> {
    let dims = grid.dims();
    let direct = world_to_tile(dims, tile_size, hit);
    if grid.is_present(direct) {
        return Some(direct);
    }
    let offsets = [-PICK_PROBE_OFFSET, 0.0, PICK_PROBE_OFFSET];
    for dx in offsets {
        for dy in offsets {
            for dz in offsets {
                let probe = world_to_tile(dims, tile_size, hit + Vec3::new(dx, dy, dz));
                if grid.is_present(probe) {
                    log::debug!("pick deduced {probe} for hit {:?}", hit);
                    return Some(probe);
                }
            }
        }
    }
    log::debug!("pick found no present tile near {:?}", hit);
    None
}
