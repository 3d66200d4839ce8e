use bevy::math::Vec2;

/// Cell position inside a chunk's tile grid. `y = 0` is the bottom row.
#[derive(Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Debug, Default)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World-space position of the cell's lower-left corner for a chunk
    /// whose origin sits at `origin`.
    pub fn to_world(&self, origin: Vec2, cell_size: f32) -> Vec2 {
        origin + Vec2::new(self.x as f32, self.y as f32) * cell_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_to_world_scales_by_cell_size() {
        let cell = CellCoord::new(3, 2);
        let world = cell.to_world(Vec2::new(10.0, 0.0), 0.5);
        assert_eq!(world, Vec2::new(11.5, 1.0));
    }

    #[test]
    fn cells_order_by_column_first() {
        let mut cells = vec![CellCoord::new(1, 0), CellCoord::new(0, 5), CellCoord::new(0, 1)];
        cells.sort();
        assert_eq!(
            cells,
            vec![CellCoord::new(0, 1), CellCoord::new(0, 5), CellCoord::new(1, 0)]
        );
    }
}
