//! Cell geometry of the labeled grid.
//!
//! The layout is computed once from a [`GridSpec`] and never changes
//! afterwards. Cell sizes use truncating division, so when the content area is
//! not evenly divisible the last column and row leave a few unused pixels at
//! the right and bottom edges.
mod components;
mod lines;

pub use components::*;
pub use lines::*;

use crate::config::GridSpec;
use imageproc::rect::Rect;
use smallvec::SmallVec;
use tracing::*;

/// A type alias for SmallVec with an optimized stack-allocated buffer size.
pub type SmallVecLine<T> = SmallVec<[T; 32]>;

/// Pixel geometry of the whole grid: header bands, rows and columns.
///
/// # Example
/// ```
/// use gridcomposer::grid::Layout;
///
/// let layout = Layout::new(512, 32, 2, 2);
/// assert_eq!(layout.cell_width, 240);
/// assert_eq!(layout.cell(1, 1).origin(), (272, 272));
/// ```
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Layout {
    pub canvas_size: u32,
    pub header_size: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub rows: SmallVecLine<Row>,
    pub columns: SmallVecLine<Column>,
}

impl Layout {
    /// Computes the layout for a square canvas split into `rows` x `columns` cells.
    ///
    /// `rows` and `columns` must be non-zero and `header_size` smaller than
    /// `canvas_size`; [`GridOptions::resolve`](crate::config::GridOptions::resolve)
    /// guarantees both.
    pub fn new(canvas_size: u32, header_size: u32, rows: usize, columns: usize) -> Self {
        let content_width = canvas_size - header_size;
        let content_height = canvas_size - header_size;
        let cell_width = content_width / columns as u32;
        let cell_height = content_height / rows as u32;
        debug!(
            "Layout {}x{} cells of {}x{} pixels",
            rows, columns, cell_width, cell_height
        );

        let rows = (0..rows as u32)
            .map(|r| Row {
                y: header_size + r * cell_height,
                height: cell_height,
            })
            .collect();
        let columns = (0..columns as u32)
            .map(|c| Column {
                x: header_size + c * cell_width,
                width: cell_width,
            })
            .collect();

        Self {
            canvas_size,
            header_size,
            cell_width,
            cell_height,
            rows,
            columns,
        }
    }

    /// Computes the layout described by a resolved spec.
    pub fn from_spec(spec: &GridSpec) -> Self {
        Self::new(
            spec.canvas_size,
            spec.header_size,
            spec.rows(),
            spec.columns(),
        )
    }

    pub fn content_width(&self) -> u32 {
        self.canvas_size - self.header_size
    }

    pub fn content_height(&self) -> u32 {
        self.canvas_size - self.header_size
    }

    /// Returns the cell at `(row, column)`.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    pub fn cell(&self, row: usize, column: usize) -> Cell<'_> {
        Cell {
            row: &self.rows[row],
            column: &self.columns[column],
        }
    }

    /// Iterates over all cells in row-major order as `(row, column, cell)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Cell<'_>)> {
        self.rows.iter().enumerate().flat_map(move |(r, row)| {
            self.columns
                .iter()
                .enumerate()
                .map(move |(c, column)| (r, c, Cell { row, column }))
        })
    }

    /// Anchor of the column label for column `c`: centered over the column,
    /// halfway down the header band.
    pub fn column_label_anchor(&self, c: usize) -> (f32, f32) {
        let column = &self.columns[c];
        (
            column.x as f32 + column.width as f32 / 2.0,
            self.header_size as f32 / 2.0,
        )
    }

    /// Anchor of the row label for row `r`: centered on the row, halfway
    /// across the header band.
    pub fn row_label_anchor(&self, r: usize) -> (f32, f32) {
        let row = &self.rows[r];
        (
            self.header_size as f32 / 2.0,
            row.y as f32 + row.height as f32 / 2.0,
        )
    }

    /// The boundary mesh: one vertical line per column boundary followed by
    /// one horizontal line per row boundary.
    pub fn gridlines(&self) -> SmallVecLine<GridLine> {
        let vertical = (0..=self.columns.len() as u32).map(|c| {
            GridLine::new(
                Orientation::Vertical,
                self.header_size + c * self.cell_width,
                self.header_size,
                self.canvas_size,
            )
        });
        let horizontal = (0..=self.rows.len() as u32).map(|r| {
            GridLine::new(
                Orientation::Horizontal,
                self.header_size + r * self.cell_height,
                self.header_size,
                self.canvas_size,
            )
        });
        vertical.chain(horizontal).collect()
    }

    /// The two lines separating the header bands from the grid, spanning the
    /// whole canvas.
    pub fn separators(&self) -> [GridLine; 2] {
        [
            GridLine::new(
                Orientation::Vertical,
                self.header_size,
                0,
                self.canvas_size,
            ),
            GridLine::new(
                Orientation::Horizontal,
                self.header_size,
                0,
                self.canvas_size,
            ),
        ]
    }
}
