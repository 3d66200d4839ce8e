use bevy::log::{debug, warn};
use bevy::math::Vec2;
use bevy::prelude::Resource;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sk_core::ChunkKind;
use sk_pool::{PoolError, ReturnReport};
use sk_world::TerrainConfig;
use std::collections::VecDeque;

use crate::build::{ChunkHandle, PaintMode};
use crate::chunk::TerrainChunk;
use crate::painter::{ChunkPainter, ChunkPool};

/// Chunk seeds are drawn from `[-SEED_RANGE, SEED_RANGE]`.
pub const SEED_RANGE: f64 = 1_000_000.0;

/// Streams terrain chunks left to right.
#[derive(Resource)]
pub struct TerrainGenerator {
    min_width: u32,
    max_width: u32,
    rng: ChaCha8Rng,
    next_origin: f32,
    chunks: VecDeque<ChunkHandle>,
}

impl TerrainGenerator {
    pub fn new(config: &TerrainConfig, seed: u64) -> Self {
        Self {
            min_width: config.min_chunk_width.min(config.max_chunk_width),
            max_width: config.max_chunk_width,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_origin: 0.0,
            chunks: VecDeque::new(),
        }
    }

    /// World x where the following chunk starts.
    pub fn next_origin(&self) -> f32 {
        self.next_origin
    }

    /// Streamed chunks, oldest first.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkHandle> + '_ {
        self.chunks.iter().copied()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Start a chunk at `origin`.
    ///
    /// Initial chunks use the widest width and are painted at once; later
    /// chunks get a random width and are painted over several ticks.
    pub fn generate_chunk(
        &mut self,
        painter: &mut ChunkPainter,
        pool: &mut ChunkPool,
        origin: Vec2,
        is_initial: bool,
    ) -> Result<ChunkHandle, PoolError<ChunkKind>> {
        let seed = self.rng.gen_range(-SEED_RANGE..=SEED_RANGE);
        let (width, mode) = if is_initial {
            (self.max_width, PaintMode::Immediate)
        } else {
            (
                self.rng.gen_range(self.min_width..=self.max_width),
                PaintMode::TimeSliced,
            )
        };

        let handle = painter.begin_chunk(pool, width, mode, seed)?;
        let world_width = match painter.chunk_mut(handle) {
            Some(chunk) => {
                chunk.set_origin(origin);
                chunk.world_width()
            }
            None => 0.0,
        };

        self.next_origin = origin.x + world_width;
        self.chunks.push_back(handle);
        Ok(handle)
    }

    /// Start a chunk right after the previous one.
    pub fn extend(
        &mut self,
        painter: &mut ChunkPainter,
        pool: &mut ChunkPool,
        is_initial: bool,
    ) -> Result<ChunkHandle, PoolError<ChunkKind>> {
        let origin = Vec2::new(self.next_origin, 0.0);
        self.generate_chunk(painter, pool, origin, is_initial)
    }

    /// Hand the oldest streamed chunk back to the pool.
    pub fn retire_oldest(
        &mut self,
        painter: &mut ChunkPainter,
        pool: &mut ChunkPool,
    ) -> Option<ReturnReport<TerrainChunk>> {
        let handle = self.chunks.pop_front()?;
        let report = painter.recycle(pool, handle);
        if report.returned() == 0 {
            warn!("chunk {:?}: retired but nothing went back to the pool", handle);
        } else {
            debug!("chunk {:?}: retired", handle);
        }
        Some(report)
    }
}
