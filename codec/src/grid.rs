//! Row-major cell grid of a tile-bearing layer.

use crate::error::{CodecResult, TransportError};

/// A `width` x `height` grid of cells stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileGrid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy + Default> TileGrid<T> {
    /// Creates a grid filled with empty cells.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![T::default(); width * height],
        }
    }

    /// Wraps decoded cells. The cell count must equal `width * height`.
    pub fn from_cells(width: usize, height: usize, cells: Vec<T>) -> CodecResult<Self> {
        let expected = width * height;
        if cells.len() != expected {
            return Err(TransportError::CellCount {
                expected,
                actual: cells.len(),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    #[must_use]
    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Returns the cell at column `x`, row `y`.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Writes the cell at column `x`, row `y` and returns the previous value,
    /// or `None` when the coordinate is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> Option<T> {
        let i = self.index(x, y)?;
        Some(std::mem::replace(&mut self.cells[i], value))
    }

    /// Resizes the grid. The top-left region is kept and new cells are empty.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        let mut cells = vec![T::default(); width * height];
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                cells[y * width + x] = self.cells[y * self.width + x];
            }
        }
        self.width = width;
        self.height = height;
        self.cells = cells;
    }
}
