use serde::Deserialize;

/// Terrain type stored per cell. Discriminants double as default atlas layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum VoxelType {
    #[default]
    Grass = 0,
    Dirt = 1,
    SoftRocks = 2,
    HardRocks = 3,
    Sand = 4,
}

impl VoxelType {
    pub const COUNT: usize = 5;

    pub const ALL: [VoxelType; Self::COUNT] = [
        VoxelType::Grass,
        VoxelType::Dirt,
        VoxelType::SoftRocks,
        VoxelType::HardRocks,
        VoxelType::Sand,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a `[0..COUNT)` index back into a type.
    #[inline]
    pub fn from_index(i: usize) -> Option<VoxelType> {
        Self::ALL.get(i).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            VoxelType::Grass => "grass",
            VoxelType::Dirt => "dirt",
            VoxelType::SoftRocks => "soft_rocks",
            VoxelType::HardRocks => "hard_rocks",
            VoxelType::Sand => "sand",
        }
    }

    pub fn from_name(name: &str) -> Option<VoxelType> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}
