mod config;
mod orchestrator;

use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use hashbrown::HashMap;
use stratum_geom::Vec3;
use stratum_materials::VoxelType;
use stratum_runtime::{ChunkMesh, RenderCollaborator};
use stratum_world::{ChunkId, TileCoord};

use crate::config::AppConfig;
use crate::orchestrator::Orchestrator;

const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "stratum")]
#[command(about = "Headless voxel volume with incremental chunk meshing")]
struct Args {
    /// Path to a TOML config file. Defaults apply to every missing key.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frames to run before flushing and exiting.
    #[arg(long, default_value_t = 120)]
    ticks: u64,

    /// Override `max_jobs` from the config.
    #[arg(long)]
    jobs: Option<usize>,

    /// Remove the voxel at `x,y,z` after the first frame. Repeatable.
    #[arg(long, value_parser = parse_tile)]
    carve: Vec<TileCoord>,

    /// Retype the voxel at `x,y,z` after the first frame, e.g. `3,0,4=sand`. Repeatable.
    #[arg(long, value_parser = parse_paint)]
    paint: Vec<(TileCoord, VoxelType)>,

    /// Resolve a world-space hit point `x,y,z` to a tile before exiting. Repeatable.
    #[arg(long, value_parser = parse_point)]
    pick: Vec<Vec3>,

    /// Log filter (e.g. `debug` or `events=debug`); applied after RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_tile(s: &str) -> Result<TileCoord, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z, got {s:?}"));
    };
    let axis = |v: &str| v.parse::<i32>().map_err(|e| format!("bad coordinate {v:?}: {e}"));
    Ok(TileCoord::new(axis(x)?, axis(y)?, axis(z)?))
}

fn parse_paint(s: &str) -> Result<(TileCoord, VoxelType), String> {
    let Some((tile, ty)) = s.split_once('=') else {
        return Err(format!("expected x,y,z=type, got {s:?}"));
    };
    let ty = ty.trim();
    let voxel = VoxelType::from_name(ty).ok_or_else(|| format!("unknown voxel type {ty:?}"))?;
    Ok((parse_tile(tile)?, voxel))
}

fn parse_point(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z, got {s:?}"));
    };
    let axis = |v: &str| v.parse::<f32>().map_err(|e| format!("bad coordinate {v:?}: {e}"));
    Ok(Vec3::new(axis(x)?, axis(y)?, axis(z)?))
}

/// Stands in for a renderer: keeps the latest quad count per chunk and logs arrivals.
#[derive(Default)]
struct MeshLog {
    latest: HashMap<ChunkId, usize>,
    received: usize,
}

impl RenderCollaborator for MeshLog {
    fn on_chunk_mesh_ready(&mut self, mesh: &ChunkMesh<'_>) {
        self.received += 1;
        let previous = self.latest.insert(mesh.chunk, mesh.quad_count);
        log::info!(
            target: "events",
            "ChunkMeshReady {} quads={} verts={} origin=({:.1}, {:.1}, {:.1}) prev={:?}",
            mesh.chunk,
            mesh.quad_count,
            mesh.vertices.len(),
            mesh.origin.x,
            mesh.origin.y,
            mesh.origin.z,
            previous
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut log_builder = env_logger::Builder::new();
    log_builder
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG");
    if let Some(filters) = &args.log_level {
        log_builder.parse_filters(filters);
    }
    log_builder.init();

    let mut cfg = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(jobs) = args.jobs {
        cfg.max_jobs = jobs;
    }
    cfg.validate()?;

    let mut orch = Orchestrator::from_config(&cfg, MeshLog::default())?;
    orch.rebuild_all();

    for frame in 0..args.ticks {
        orch.tick();
        if frame == 0 {
            for tile in &args.carve {
                if let Err(e) = orch.set_voxel(*tile, false) {
                    log::warn!("carve {tile} skipped: {e}");
                }
            }
            for (tile, ty) in &args.paint {
                if let Err(e) = orch.set_type(*tile, *ty) {
                    log::warn!("paint {tile} skipped: {e}");
                }
            }
        }
        let stats = orch.stats();
        if frame > 0 && stats.is_idle() {
            log::info!("idle after {} ticks", stats.tick);
            break;
        }
        thread::sleep(FRAME);
    }

    orch.flush();
    for hit in &args.pick {
        match orch.pick(*hit) {
            Some(tile) => log::info!("pick ({}, {}, {}) -> {tile}", hit.x, hit.y, hit.z),
            None => log::info!("pick ({}, {}, {}) -> nothing", hit.x, hit.y, hit.z),
        }
    }
    let stats = orch.stats();
    let sink = orch.collaborator();
    let total_quads: usize = sink.latest.values().sum();
    log::info!(
        "done: ticks={} started={} builds={} meshes={} chunks={} quads={} (emitted {})",
        stats.tick,
        stats.started,
        stats.completed,
        sink.received,
        sink.latest.len(),
        total_quads,
        stats.quads
    );
    Ok(())
}
