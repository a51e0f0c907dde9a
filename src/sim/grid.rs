//! Tile grid and the path-finder seam
//!
//! The dungeon layout arrives as a finished 2D tile grid; generating it is
//! someone else's problem. The A* engine is likewise consumed as a black
//! box through [`Pathfinder`]: given start and goal cells plus the
//! obstacle grid, it returns an ordered list of cell indices (empty when
//! no path exists).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TILE_SIZE;

/// Obstacle grid in row-major order; nonzero cells are blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl TileGrid {
    /// An all-free grid of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// Parse a grid from ascii rows: `#` is blocked, anything else free.
    /// Rows shorter than the widest are padded free.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.set_blocked(x, y, true);
                }
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_blocked(&mut self, x: usize, y: usize, blocked: bool) {
        self.cells[y * self.width + x] = u8::from(blocked);
    }

    pub fn is_blocked(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x] != 0
    }

    /// Raw row-major obstacle cells, for handing to an external path-finder.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Grid cell containing a world position.
    pub fn cell_of(&self, pos: Vec2) -> (i32, i32) {
        ((pos.x / TILE_SIZE) as i32, (pos.y / TILE_SIZE) as i32)
    }

    /// Row-major index of a cell.
    pub fn index_of(&self, x: i32, y: i32) -> usize {
        y as usize * self.width + x as usize
    }

    /// World-space walk target for a path cell.
    ///
    /// Biased to the cell's bottom edge minus 2 so a body whose position
    /// anchors its bottom-left lands centered in the cell, matching the
    /// convention wall bodies are laid out with.
    pub fn waypoint_of(&self, index: usize) -> Vec2 {
        let row = index / self.width;
        let col = index - self.width * row;
        Vec2::new(
            col as f32 * TILE_SIZE,
            row as f32 * TILE_SIZE - 2.0 + TILE_SIZE,
        )
    }
}

/// External path-finder contract.
///
/// Implementations return cells in walk order, starting with the first
/// step away from `start`; an empty path means unreachable (or already
/// there), which the AI treats as "hold position".
pub trait Pathfinder {
    fn find_path(&self, start: (i32, i32), goal: (i32, i32), grid: &TileGrid) -> Vec<usize>;
}
