use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::types::VoxelType;

/// Added to the atlas layer so shader-side truncation to int lands on the intended layer.
pub const LAYER_TRUNCATION_BIAS: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialInfo {
    pub smoothness: f32,
    pub atlas_layer: u16,
}

impl MaterialInfo {
    pub const fn new(smoothness: f32, atlas_layer: u16) -> Self {
        Self {
            smoothness,
            atlas_layer,
        }
    }

    /// Per-vertex color carrying the two material channels: `r = smoothness`,
    /// `g = atlas layer`.
    #[inline]
    pub fn encode_color(&self) -> [f32; 4] {
        [
            self.smoothness,
            f32::from(self.atlas_layer) + LAYER_TRUNCATION_BIAS,
            0.0,
            1.0,
        ]
    }
}

/// Read-only `{type -> (smoothness, atlas layer)}` table indexed by `VoxelType`.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialTable {
    entries: [MaterialInfo; VoxelType::COUNT],
}

impl Default for MaterialTable {
    fn default() -> Self {
        let mut entries = [MaterialInfo::new(0.0, 0); VoxelType::COUNT];
        for ty in VoxelType::ALL {
            entries[ty.index()] = MaterialInfo::new(0.0, ty.index() as u16);
        }
        Self { entries }
    }
}

impl MaterialTable {
    #[inline]
    pub fn get(&self, ty: VoxelType) -> MaterialInfo {
        self.entries[ty.index()]
    }

    pub fn set(&mut self, ty: VoxelType, info: MaterialInfo) {
        self.entries[ty.index()] = info;
    }

    /// Builds a table from config entries; types not mentioned keep their defaults.
    pub fn from_config(cfg: &MaterialsConfig) -> Result<Self, Box<dyn Error>> {
        let mut table = MaterialTable::default();
        // HashMap iteration order is nondeterministic; sort keys so logs come out stable.
        let mut keys: Vec<&String> = cfg.materials.keys().collect();
        keys.sort();
        for key in keys {
            let entry = &cfg.materials[key];
            let ty = VoxelType::from_name(key)
                .ok_or_else(|| format!("unknown voxel type in material table: {key}"))?;
            let mut info = table.get(ty);
            if let Some(s) = entry.smoothness {
                if !(0.0..=1.0).contains(&s) {
                    return Err(format!("smoothness for {key} out of [0,1]: {s}").into());
                }
                info.smoothness = s;
            }
            if let Some(layer) = entry.layer {
                info.atlas_layer = layer;
            }
            log::debug!(
                "material {} -> smoothness={} layer={}",
                ty.name(),
                info.smoothness,
                info.atlas_layer
            );
            table.set(ty, info);
        }
        Ok(table)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: MaterialsConfig = toml::from_str(toml_str)?;
        Self::from_config(&cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

// --- Config ---

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MaterialsConfig {
    #[serde(default)]
    pub materials: HashMap<String, MaterialEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MaterialEntry {
    pub smoothness: Option<f32>,
    pub layer: Option<u16>,
}
