use bevy::math::Vec2;
use sk_core::{CellCoord, ChunkKind, CollisionLayers, Poolable};
use std::collections::BTreeSet;

/// Drawing surface a chunk build paints into.
pub trait TileCanvas {
    fn set_cell(&mut self, cell: CellCoord);
    fn finalize_collider(&mut self);
}

/// Collider state of a chunk container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColliderState {
    /// Cells may still change; nothing collides with the chunk.
    #[default]
    Disabled,
    /// Built from the painted cells and enabled.
    Ready,
}

/// Pooled terrain chunk container.
///
/// `Customizable` chunks are painted from a height field and lose their
/// cells on release. Fixed-shape chunks (holes) carry a stamp built once by
/// the factory and keep it across reuse.
#[derive(Debug, Clone)]
pub struct TerrainChunk {
    kind: ChunkKind,
    cells: BTreeSet<CellCoord>,
    origin: Vec2,
    width: u32,
    cell_size: f32,
    collider: ColliderState,
}

impl TerrainChunk {
    pub fn new(kind: ChunkKind, cell_size: f32) -> Self {
        Self {
            kind,
            cells: BTreeSet::new(),
            origin: Vec2::ZERO,
            width: 0,
            cell_size,
            collider: ColliderState::Disabled,
        }
    }

    /// Build a chunk of `kind`, stamping the fixed shape of hole kinds.
    pub fn from_kind(kind: ChunkKind, cell_size: f32) -> Self {
        let mut chunk = Self::new(kind, cell_size);
        if let Some((width, cells)) = hole_stamp(kind) {
            chunk.width = width;
            chunk.cells = cells;
        }
        chunk
    }

    pub fn kind(&self) -> ChunkKind {
        self.kind
    }

    pub fn cells(&self) -> &BTreeSet<CellCoord> {
        &self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn has_cell(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Painted height of column `x`: one past its highest cell.
    pub fn column_height(&self, x: i32) -> i32 {
        self.cells
            .range(CellCoord::new(x, i32::MIN)..=CellCoord::new(x, i32::MAX))
            .next_back()
            .map_or(0, |c| c.y + 1)
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Width in columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Width in world units.
    pub fn world_width(&self) -> f32 {
        self.width as f32 * self.cell_size
    }

    pub fn collider(&self) -> ColliderState {
        self.collider
    }

    pub fn is_collider_ready(&self) -> bool {
        self.collider == ColliderState::Ready
    }

    /// Layers a finished chunk reports to the collision collaborator.
    pub fn collision_layers(&self) -> CollisionLayers {
        CollisionLayers::GROUND
    }
}

impl TileCanvas for TerrainChunk {
    fn set_cell(&mut self, cell: CellCoord) {
        self.cells.insert(cell);
    }

    fn finalize_collider(&mut self) {
        self.collider = ColliderState::Ready;
    }
}

impl Poolable for TerrainChunk {
    type Key = ChunkKind;

    fn key(&self) -> ChunkKind {
        self.kind
    }

    fn on_acquire(&mut self) {
        self.collider = ColliderState::Disabled;
    }

    fn on_release(&mut self) {
        self.collider = ColliderState::Disabled;
        self.origin = Vec2::ZERO;
        if self.kind.is_customizable() {
            self.cells.clear();
            self.width = 0;
        }
    }
}

/// Ground strip with a gap in the middle, for the hole kinds.
fn hole_stamp(kind: ChunkKind) -> Option<(u32, BTreeSet<CellCoord>)> {
    let (width, gap) = match kind {
        ChunkKind::Customizable => return None,
        ChunkKind::HoleSmall => (8, 2),
        ChunkKind::HoleBig => (14, 6),
    };
    const GROUND_ROWS: i32 = 3;

    let gap_start = (width - gap) / 2;
    let gap_end = gap_start + gap;
    let cells = (0..width as i32)
        .filter(|x| *x < gap_start as i32 || *x >= gap_end as i32)
        .flat_map(|x| (0..GROUND_ROWS).map(move |y| CellCoord::new(x, y)))
        .collect();
    Some((width, cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customizable_chunk_is_cleared_on_release() {
        let mut chunk = TerrainChunk::from_kind(ChunkKind::Customizable, 1.0);
        chunk.set_width(2);
        chunk.set_cell(CellCoord::new(0, 0));
        chunk.set_cell(CellCoord::new(1, 0));
        chunk.finalize_collider();

        chunk.on_release();
        assert_eq!(chunk.cell_count(), 0);
        assert_eq!(chunk.width(), 0);
        assert_eq!(chunk.collider(), ColliderState::Disabled);
    }

    #[test]
    fn hole_chunks_keep_their_shape() {
        let mut chunk = TerrainChunk::from_kind(ChunkKind::HoleSmall, 1.0);
        let before = chunk.cells().clone();
        assert!(!before.is_empty());

        chunk.on_release();
        chunk.on_acquire();
        assert_eq!(chunk.cells(), &before);
        assert_eq!(chunk.width(), 8);
    }

    #[test]
    fn hole_stamp_leaves_a_gap() {
        let chunk = TerrainChunk::from_kind(ChunkKind::HoleBig, 1.0);
        assert_eq!(chunk.column_height(0), 3);
        assert_eq!(chunk.column_height(7), 0);
        assert_eq!(chunk.column_height(13), 3);
    }

    #[test]
    fn column_height_tracks_highest_cell() {
        let mut chunk = TerrainChunk::new(ChunkKind::Customizable, 0.5);
        for y in 0..4 {
            chunk.set_cell(CellCoord::new(2, y));
        }
        chunk.set_width(3);
        assert_eq!(chunk.column_height(2), 4);
        assert_eq!(chunk.column_height(1), 0);
        assert_eq!(chunk.world_width(), 1.5);
    }
}
