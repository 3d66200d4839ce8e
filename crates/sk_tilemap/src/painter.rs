use bevy::log::{debug, info};
use bevy::prelude::Resource;
use sk_core::ChunkKind;
use sk_noise::{HeightParams, NoiseHeightField};
use sk_pool::{LiveSet, PoolError, ReturnReport, TypedObjectPool};

use crate::build::{ChunkBuildState, ChunkHandle, PaintMode};
use crate::chunk::{TerrainChunk, TileCanvas};

pub type ChunkPool = TypedObjectPool<TerrainChunk>;

/// Work done by one [`ChunkPainter::step`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaintTick {
    pub columns_painted: u32,
    pub finalized: Vec<ChunkHandle>,
}

/// Owns the chunks taken from the chunk pool and drives their builds.
#[derive(Resource)]
pub struct ChunkPainter {
    chunks: LiveSet<TerrainChunk>,
    builds: Vec<ChunkBuildState>,
    params: HeightParams,
    columns_per_tick: u32,
}

impl ChunkPainter {
    pub fn new(params: HeightParams, columns_per_tick: u32) -> Self {
        Self {
            chunks: LiveSet::new(),
            builds: Vec::new(),
            params,
            columns_per_tick: columns_per_tick.max(1),
        }
    }

    pub fn params(&self) -> &HeightParams {
        &self.params
    }

    pub fn columns_per_tick(&self) -> u32 {
        self.columns_per_tick
    }

    /// Take a customizable chunk from `pool` and start painting it.
    ///
    /// Immediate builds are fully painted when this returns; their collider
    /// is finalized by the next [`step`](Self::step).
    pub fn begin_chunk(
        &mut self,
        pool: &mut ChunkPool,
        width: u32,
        mode: PaintMode,
        seed: f64,
    ) -> Result<ChunkHandle, PoolError<ChunkKind>> {
        let mut chunk = pool.acquire(ChunkKind::Customizable)?;
        chunk.set_width(width);

        let heights = NoiseHeightField::new(seed, self.params);
        let handle = self.chunks.insert(chunk);
        let mut build = ChunkBuildState::new(handle, width, self.columns_per_tick, heights);

        if mode == PaintMode::Immediate {
            if let Some(chunk) = self.chunks.get_mut(handle) {
                build.paint_all(chunk);
            }
        }

        debug!(
            "chunk {:?}: building {} columns ({:?}, seed {:.0})",
            handle, width, mode, seed
        );
        self.builds.push(build);
        Ok(handle)
    }

    /// Take a fixed-shape chunk from `pool`. It needs no painting.
    pub fn place_fixed(
        &mut self,
        pool: &mut ChunkPool,
        kind: ChunkKind,
    ) -> Result<ChunkHandle, PoolError<ChunkKind>> {
        let mut chunk = pool.acquire(kind)?;
        chunk.finalize_collider();
        Ok(self.chunks.insert(chunk))
    }

    /// Advance every build by one tick.
    pub fn step(&mut self) -> PaintTick {
        let mut tick = PaintTick::default();
        let chunks = &mut self.chunks;

        self.builds.retain_mut(|build| {
            let Some(chunk) = chunks.get_mut(build.chunk()) else {
                return false;
            };
            let outcome = build.step(chunk);
            tick.columns_painted += outcome.columns_painted;
            if outcome.finalized {
                info!(
                    "chunk {:?}: collider ready ({} cells)",
                    build.chunk(),
                    chunk.cell_count()
                );
                tick.finalized.push(build.chunk());
            }
            !build.is_finished()
        });

        tick
    }

    /// Stop building `handle`. Cells painted so far stay.
    pub fn cancel(&mut self, handle: ChunkHandle) -> bool {
        let before = self.builds.len();
        self.builds.retain(|build| build.chunk() != handle);
        self.builds.len() != before
    }

    /// Cancel any build of `handle` and hand the chunk back to `pool`.
    ///
    /// The report is empty for a stale handle.
    pub fn recycle(&mut self, pool: &mut ChunkPool, handle: ChunkHandle) -> ReturnReport<TerrainChunk> {
        self.cancel(handle);
        if !self.chunks.request_return(handle) {
            return ReturnReport::default();
        }
        self.chunks.drain_returns(pool)
    }

    /// Hand every chunk back to `pool`.
    pub fn recycle_all(&mut self, pool: &mut ChunkPool) -> ReturnReport<TerrainChunk> {
        self.builds.clear();
        self.chunks.return_all(pool)
    }

    pub fn chunk(&self, handle: ChunkHandle) -> Option<&TerrainChunk> {
        self.chunks.get(handle)
    }

    pub fn chunk_mut(&mut self, handle: ChunkHandle) -> Option<&mut TerrainChunk> {
        self.chunks.get_mut(handle)
    }

    pub fn chunks(&self) -> impl Iterator<Item = (ChunkHandle, &TerrainChunk)> + '_ {
        self.chunks.iter()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_building(&self, handle: ChunkHandle) -> bool {
        self.builds.iter().any(|build| build.chunk() == handle)
    }

    pub fn builds_in_progress(&self) -> usize {
        self.builds.len()
    }

    /// World-space top of the painted ground at world x, if a chunk covers it.
    pub fn ground_height(&self, x: f32) -> Option<f32> {
        self.chunks.iter().find_map(|(_, chunk)| {
            let local = x - chunk.origin().x;
            if local < 0.0 || local >= chunk.world_width() {
                return None;
            }
            let column = (local / chunk.cell_size()) as i32;
            Some(chunk.origin().y + chunk.column_height(column) as f32 * chunk.cell_size())
        })
    }
}

/// Register the chunk pools of every [`ChunkKind`].
pub fn register_chunk_pools(
    pool: &mut ChunkPool,
    cell_size: f32,
    capacity: usize,
    initial_count: usize,
) -> Result<(), PoolError<ChunkKind>> {
    for &kind in ChunkKind::all() {
        pool.register(
            kind,
            move |kind| TerrainChunk::from_kind(kind, cell_size),
            capacity,
            initial_count,
        )?;
    }
    Ok(())
}
