use bevy::prelude::*;

pub mod build;
pub mod chunk;
pub mod generator;
pub mod painter;

pub use build::{BuildStage, ChunkBuildState, ChunkHandle, PaintMode, StepOutcome};
pub use chunk::{ColliderState, TerrainChunk, TileCanvas};
pub use generator::TerrainGenerator;
pub use painter::{register_chunk_pools, ChunkPainter, ChunkPool, PaintTick};

/// Tilemap plugin for Skirmish.
/// Chunk containers, resumable chunk builds and terrain streaming.
pub struct SkTilemapPlugin;

impl Plugin for SkTilemapPlugin {
    fn build(&self, _app: &mut App) {
        // Painter and generator need the loaded config; the host inserts them.
    }
}
