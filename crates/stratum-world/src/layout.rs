use crate::coord::{ChunkId, TileCoord};
use crate::volume::VolumeDims;

/// Slices a volume into `chunk_size x height x chunk_size` columns along X and Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkLayout {
    pub chunk_size: usize,
    pub dims: VolumeDims,
}

impl ChunkLayout {
    pub fn new(dims: VolumeDims, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self { chunk_size, dims }
    }

    #[inline]
    pub fn chunks_x(&self) -> usize {
        self.dims.width.div_ceil(self.chunk_size)
    }

    #[inline]
    pub fn chunks_z(&self) -> usize {
        self.dims.depth.div_ceil(self.chunk_size)
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks_x() * self.chunks_z()
    }

    #[inline]
    pub fn contains(&self, id: ChunkId) -> bool {
        id.cx >= 0 && id.cz >= 0 && (id.cx as usize) < self.chunks_x() && (id.cz as usize) < self.chunks_z()
    }

    /// Chunk owning `tile`. Only meaningful for in-range tiles.
    #[inline]
    pub fn chunk_of(&self, tile: TileCoord) -> ChunkId {
        let s = self.chunk_size as i32;
        ChunkId::new(tile.x.div_euclid(s), tile.z.div_euclid(s))
    }

    /// Tile position relative to its owning chunk's origin.
    #[inline]
    pub fn local_of(&self, tile: TileCoord) -> TileCoord {
        let s = self.chunk_size as i32;
        TileCoord::new(tile.x.rem_euclid(s), tile.y, tile.z.rem_euclid(s))
    }

    /// World tile of the chunk's `(0,0,0)` local cell.
    #[inline]
    pub fn origin(&self, id: ChunkId) -> TileCoord {
        let s = self.chunk_size as i32;
        TileCoord::new(id.cx * s, 0, id.cz * s)
    }

    /// All chunk ids in x-major order.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkId> + '_ {
        let cz = self.chunks_z() as i32;
        (0..self.chunks_x() as i32).flat_map(move |x| (0..cz).map(move |z| ChunkId::new(x, z)))
    }
}
