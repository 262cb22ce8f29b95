use std::sync::Arc;

use stratum_materials::VoxelType;

use crate::coord::TileCoord;

const BITS_PER_WORD: usize = 64;
const WORD_INDEX_SHIFT: usize = 6; // log2(64)
const WORD_INDEX_MASK: usize = 63;

/// Volume extent in tiles: `width` along X, `depth` along Z, `height` along Y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VolumeDims {
    pub width: usize,
    pub depth: usize,
    pub height: usize,
}

impl VolumeDims {
    #[inline]
    pub const fn new(width: usize, depth: usize, height: usize) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.depth * self.height
    }

    #[inline]
    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.x >= 0
            && tile.y >= 0
            && tile.z >= 0
            && (tile.x as usize) < self.width
            && (tile.y as usize) < self.height
            && (tile.z as usize) < self.depth
    }

    /// Linear index `y*width*depth + z*width + x`, or `None` outside the volume.
    #[inline]
    pub fn index_of(&self, tile: TileCoord) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }
        let (x, y, z) = (tile.x as usize, tile.y as usize, tile.z as usize);
        Some(y * self.width * self.depth + z * self.width + x)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeError {
    OutOfRange { tile: TileCoord, dims: VolumeDims },
}

impl std::fmt::Display for VolumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeError::OutOfRange { tile, dims } => write!(
                f,
                "tile {} out of range for volume {}x{}x{}",
                tile, dims.width, dims.depth, dims.height
            ),
        }
    }
}

impl std::error::Error for VolumeError {}

/// Receives change notifications synchronously from inside the mutating call.
pub trait VolumeListener {
    fn present_changed(&mut self, tile: TileCoord, value: bool);
    fn type_changed(&mut self, tile: TileCoord, value: VoxelType);
}

/// Discards notifications.
impl VolumeListener for () {
    fn present_changed(&mut self, _tile: TileCoord, _value: bool) {}
    fn type_changed(&mut self, _tile: TileCoord, _value: VoxelType) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeChange {
    Present(TileCoord, bool),
    Type(TileCoord, VoxelType),
}

/// Records notifications in arrival order.
impl VolumeListener for Vec<VolumeChange> {
    fn present_changed(&mut self, tile: TileCoord, value: bool) {
        self.push(VolumeChange::Present(tile, value));
    }

    fn type_changed(&mut self, tile: TileCoord, value: VoxelType) {
        self.push(VolumeChange::Type(tile, value));
    }
}

/// Immutable-by-sharing cell storage: presence bits plus one type per cell.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    dims: VolumeDims,
    present: Vec<u64>,
    types: Vec<VoxelType>,
}

impl VoxelGrid {
    fn new(dims: VolumeDims) -> Self {
        let cells = dims.cell_count();
        let grid = Self {
            dims,
            present: vec![0; cells.div_ceil(BITS_PER_WORD)],
            types: vec![VoxelType::default(); cells],
        };
        grid.assert_invariants();
        grid
    }

    #[inline]
    fn assert_invariants(&self) {
        let cells = self.dims.cell_count();
        assert_eq!(self.types.len(), cells, "type array length mismatch");
        assert_eq!(
            self.present.len(),
            cells.div_ceil(BITS_PER_WORD),
            "presence bitset length mismatch"
        );
    }

    #[inline]
    pub fn dims(&self) -> VolumeDims {
        self.dims
    }

    #[inline]
    fn bit(&self, idx: usize) -> bool {
        (self.present[idx >> WORD_INDEX_SHIFT] >> (idx & WORD_INDEX_MASK)) & 1 == 1
    }

    #[inline]
    fn set_bit(&mut self, idx: usize, value: bool) {
        let word = &mut self.present[idx >> WORD_INDEX_SHIFT];
        let mask = 1u64 << (idx & WORD_INDEX_MASK);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// False for every coordinate outside `[0, dim)` on any axis. The mesher relies on this
    /// to emit faces at the volume edge without special cases.
    #[inline]
    pub fn is_present(&self, tile: TileCoord) -> bool {
        match self.dims.index_of(tile) {
            Some(idx) => self.bit(idx),
            None => false,
        }
    }

    /// Type of a present tile.
    ///
    /// # Panics
    /// If the tile is absent or out of range; callers must check `is_present` first.
    #[inline]
    pub fn get_type(&self, tile: TileCoord) -> VoxelType {
        assert!(self.is_present(tile), "get_type on absent tile {tile}");
        let idx = self.dims.index_of(tile).unwrap_or_default();
        self.types[idx]
    }

    pub fn present_count(&self) -> usize {
        let cells = self.dims.cell_count();
        let full = cells / BITS_PER_WORD;
        let mut n: usize = self.present[..full]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();
        let rem = cells & WORD_INDEX_MASK;
        if rem > 0 {
            n += (self.present[full] & ((1u64 << rem) - 1)).count_ones() as usize;
        }
        n
    }
}

/// Owner of the voxel grid. Background jobs read through `snapshot()`; a write while a
/// snapshot is alive copies the grid first, so in-flight readers never observe a mutation.
#[derive(Debug)]
pub struct VoxelVolume {
    grid: Arc<VoxelGrid>,
}

impl VoxelVolume {
    /// All cells absent with the default type.
    pub fn new(width: usize, depth: usize, height: usize) -> Self {
        Self {
            grid: Arc::new(VoxelGrid::new(VolumeDims::new(width, depth, height))),
        }
    }

    #[inline]
    pub fn dims(&self) -> VolumeDims {
        self.grid.dims
    }

    #[inline]
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Shared read-only view that stays stable for as long as it is held.
    #[inline]
    pub fn snapshot(&self) -> Arc<VoxelGrid> {
        Arc::clone(&self.grid)
    }

    #[inline]
    pub fn is_present(&self, tile: TileCoord) -> bool {
        self.grid.is_present(tile)
    }

    #[inline]
    pub fn get_type(&self, tile: TileCoord) -> VoxelType {
        self.grid.get_type(tile)
    }

    fn grid_mut(&mut self) -> &mut VoxelGrid {
        if Arc::get_mut(&mut self.grid).is_none() {
            log::debug!("voxel grid shared with in-flight readers; copying before write");
        }
        Arc::make_mut(&mut self.grid)
    }

    /// Initialization helper; fires no notifications.
    pub fn set_present_all(&mut self, value: bool) {
        let grid = self.grid_mut();
        let fill = if value { u64::MAX } else { 0 };
        grid.present.iter_mut().for_each(|w| *w = fill);
    }

    /// Initialization helper; fires no notifications.
    pub fn set_type_all(&mut self, value: VoxelType) {
        let grid = self.grid_mut();
        grid.types.iter_mut().for_each(|t| *t = value);
    }

    pub fn set_present(
        &mut self,
        tile: TileCoord,
        value: bool,
        listener: &mut impl VolumeListener,
    ) -> Result<(), VolumeError> {
        let idx = self.checked_index(tile)?;
        self.grid_mut().set_bit(idx, value);
        listener.present_changed(tile, value);
        Ok(())
    }

    pub fn set_type(
        &mut self,
        tile: TileCoord,
        value: VoxelType,
        listener: &mut impl VolumeListener,
    ) -> Result<(), VolumeError> {
        let idx = self.checked_index(tile)?;
        self.grid_mut().types[idx] = value;
        listener.type_changed(tile, value);
        Ok(())
    }

    fn checked_index(&self, tile: TileCoord) -> Result<usize, VolumeError> {
        let dims = self.grid.dims;
        dims.index_of(tile).ok_or_else(|| {
            let err = VolumeError::OutOfRange { tile, dims };
            log::warn!("rejected edit: {err}");
            err
        })
    }
}
