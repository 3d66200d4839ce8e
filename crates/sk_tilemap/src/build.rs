//! Resumable chunk painting.
//!
//! A build paints whole columns into a [`TileCanvas`] and finalizes the
//! collider one tick after the last column, so the collider never sees a
//! half-painted chunk.

use sk_core::CellCoord;
use sk_noise::{HeightSource, NoiseHeightField};
use sk_pool::LiveId;

use crate::chunk::TileCanvas;

/// Handle of a chunk held by the painter.
pub type ChunkHandle = LiveId;

/// How a build spreads its work over ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintMode {
    /// Paint every column at once; finalize on the next tick.
    Immediate,
    /// Paint at most `columns_per_tick` columns per tick.
    TimeSliced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStage {
    Painting,
    AwaitingCollider,
    Finished,
}

/// Work done by one [`ChunkBuildState::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub columns_painted: u32,
    pub finalized: bool,
}

/// Progress of one chunk build.
pub struct ChunkBuildState<H: HeightSource = NoiseHeightField> {
    chunk: ChunkHandle,
    width: u32,
    next_column: u32,
    columns_per_tick: u32,
    heights: H,
    stage: BuildStage,
}

impl<H: HeightSource> ChunkBuildState<H> {
    pub fn new(chunk: ChunkHandle, width: u32, columns_per_tick: u32, heights: H) -> Self {
        let stage = if width == 0 {
            BuildStage::AwaitingCollider
        } else {
            BuildStage::Painting
        };
        Self {
            chunk,
            width,
            next_column: 0,
            columns_per_tick: columns_per_tick.max(1),
            heights,
            stage,
        }
    }

    pub fn chunk(&self) -> ChunkHandle {
        self.chunk
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn next_column(&self) -> u32 {
        self.next_column
    }

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    pub fn is_finished(&self) -> bool {
        self.stage == BuildStage::Finished
    }

    /// Paint every remaining column now. The collider still waits for the
    /// next [`step`](Self::step).
    pub fn paint_all(&mut self, canvas: &mut impl TileCanvas) -> u32 {
        self.paint_columns(canvas, self.width - self.next_column)
    }

    /// Advance by one tick.
    ///
    /// While painting, paints up to `columns_per_tick` columns. The tick
    /// after the last column finalizes the collider.
    pub fn step(&mut self, canvas: &mut impl TileCanvas) -> StepOutcome {
        match self.stage {
            BuildStage::Painting => StepOutcome {
                columns_painted: self.paint_columns(canvas, self.columns_per_tick),
                finalized: false,
            },
            BuildStage::AwaitingCollider => {
                canvas.finalize_collider();
                self.stage = BuildStage::Finished;
                StepOutcome {
                    columns_painted: 0,
                    finalized: true,
                }
            }
            BuildStage::Finished => StepOutcome::default(),
        }
    }

    fn paint_columns(&mut self, canvas: &mut impl TileCanvas, budget: u32) -> u32 {
        let end = self.next_column.saturating_add(budget).min(self.width);
        let painted = end - self.next_column;

        for column in self.next_column..end {
            let x = column as i32;
            for y in 0..self.heights.height_at(x) {
                canvas.set_cell(CellCoord::new(x, y));
            }
        }

        self.next_column = end;
        if self.next_column == self.width && self.stage == BuildStage::Painting {
            self.stage = BuildStage::AwaitingCollider;
        }
        painted
    }
}
