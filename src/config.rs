use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use stratum_geom::Vec3;
use stratum_materials::{MaterialEntry, MaterialTable, MaterialsConfig, VoxelType};
use stratum_mesh_cpu::MeshParams;

/// Top-level settings file. Every key is optional.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub width: usize,
    pub depth: usize,
    pub height: usize,
    pub chunk_size: usize,
    /// Concurrent mesh builds (slot count).
    pub max_jobs: usize,
    pub atlas_tiling_period: f32,
    pub tile_size: [f32; 3],
    /// Solid layers filled from y = 0 before the first tick.
    pub fill_height: usize,
    pub fill_type: VoxelType,
    pub materials: HashMap<String, MaterialEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 40,
            depth: 40,
            height: 8,
            chunk_size: 10,
            max_jobs: 4,
            atlas_tiling_period: 10.0,
            tile_size: [1.0, 1.0, 1.0],
            fill_height: 4,
            fill_type: VoxelType::Grass,
            materials: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: AppConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .map_err(|e| format!("reading config {}: {e}", path.display()))?;
        let cfg = Self::from_toml_str(&s)?;
        log::info!("loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.width == 0 || self.depth == 0 || self.height == 0 {
            return Err(format!(
                "volume dimensions must be positive, got {}x{}x{}",
                self.width, self.depth, self.height
            )
            .into());
        }
        if self.chunk_size == 0 {
            return Err("chunk_size must be positive".into());
        }
        if self.max_jobs == 0 {
            return Err("max_jobs must be positive".into());
        }
        if !(self.atlas_tiling_period > 0.0) {
            return Err(format!(
                "atlas_tiling_period must be positive, got {}",
                self.atlas_tiling_period
            )
            .into());
        }
        if self.tile_size.iter().any(|s| !(*s > 0.0)) {
            return Err(format!("tile_size components must be positive, got {:?}", self.tile_size).into());
        }
        if self.fill_height > self.height {
            return Err(format!(
                "fill_height {} exceeds volume height {}",
                self.fill_height, self.height
            )
            .into());
        }
        Ok(())
    }

    pub fn mesh_params(&self) -> MeshParams {
        MeshParams {
            chunk_size: self.chunk_size,
            tile_size: Vec3::from(self.tile_size),
            atlas_tiling_period: self.atlas_tiling_period,
        }
    }

    pub fn material_table(&self) -> Result<MaterialTable, Box<dyn Error>> {
        MaterialTable::from_config(&MaterialsConfig {
            materials: self.materials.clone(),
        })
    }
}
