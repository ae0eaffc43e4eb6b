/// Direction a grid line runs in.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// A straight, axis-aligned line of the grid mesh.
///
/// `position` is the x coordinate of a vertical line or the y coordinate of a
/// horizontal one; `start`/`end` bound it along the other axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridLine {
    pub orientation: Orientation,
    pub position: u32,
    pub start: u32,
    pub end: u32,
}

impl GridLine {
    /// Creates a new `GridLine`.
    ///
    /// # Example
    /// ```
    /// use gridcomposer::grid::{GridLine, Orientation};
    ///
    /// let line = GridLine::new(Orientation::Vertical, 80, 80, 4096);
    /// assert_eq!(line.endpoints(), ((80.0, 80.0), (80.0, 4096.0)));
    /// ```
    pub fn new(orientation: Orientation, position: u32, start: u32, end: u32) -> Self {
        Self {
            orientation,
            position,
            start,
            end,
        }
    }

    /// Both endpoints as `(x, y)` canvas coordinates.
    pub fn endpoints(&self) -> ((f32, f32), (f32, f32)) {
        let p = self.position as f32;
        let (s, e) = (self.start as f32, self.end as f32);
        match self.orientation {
            Orientation::Vertical => ((p, s), (p, e)),
            Orientation::Horizontal => ((s, p), (e, p)),
        }
    }
}
