use super::*;

/// Represents a row band of the grid.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Row {
    pub y: u32,
    pub height: u32,
}

/// Represents a column band of the grid.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Column {
    pub x: u32,
    pub width: u32,
}

/// Represents a cell in the grid, referencing a row and a column.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub row: &'a Row,
    pub column: &'a Column,
}

impl Cell<'_> {
    /// Top-left corner of the cell in canvas pixels.
    pub fn origin(&self) -> (u32, u32) {
        (self.column.x, self.row.y)
    }

    /// Center of the cell; halves are kept so odd sizes center exactly.
    pub fn center(&self) -> (f32, f32) {
        (
            self.column.x as f32 + self.column.width as f32 / 2.0,
            self.row.y as f32 + self.row.height as f32 / 2.0,
        )
    }

    pub fn width(&self) -> u32 {
        self.column.width
    }

    pub fn height(&self) -> u32 {
        self.row.height
    }
}

impl From<&Cell<'_>> for Rect {
    fn from(cell: &Cell) -> Self {
        Rect::at(cell.column.x as i32, cell.row.y as i32)
            .of_size(cell.column.width, cell.row.height)
    }
}
