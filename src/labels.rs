//! Row and column headers plus the gridline mesh.
use tracing::*;

use crate::config::GridSpec;
use crate::drawing::{Drawable, GridDrawingConfig, Surface};
use crate::grid::{GridLine, Layout};

/// Draws the column labels across the top band and the row labels, rotated a
/// quarter turn counter-clockwise, down the left band.
///
/// Text uses the surface's current fill and font; the row label rotation is
/// scoped so the surface state is unchanged on return.
pub fn draw_labels(surface: &mut Surface, layout: &Layout, spec: &GridSpec) {
    for (c, label) in spec.col_labels.iter().enumerate() {
        let (x, y) = layout.column_label_anchor(c);
        trace!("Column label {:?} at ({}, {})", label, x, y);
        surface.fill_text(label, x, y);
    }

    for (r, label) in spec.row_labels.iter().enumerate() {
        let (x, y) = layout.row_label_anchor(r);
        trace!("Row label {:?} at ({}, {})", label, x, y);
        surface.with_saved_state(|s| {
            s.translate(x, y);
            s.rotate_quarter_turns(-1);
            s.fill_text(label, 0.0, 0.0);
        });
    }
}

fn stroke_all<'a>(surface: &mut Surface, lines: impl IntoIterator<Item = &'a GridLine>) {
    for line in lines {
        let (from, to) = line.endpoints();
        surface.stroke_line(from, to);
    }
}

/// The mesh goes down first in thin muted strokes; the header separators are
/// drawn over it.
impl Drawable for Layout {
    fn draw(&self, surface: &mut Surface, config: &GridDrawingConfig) {
        surface.with_saved_state(|s| {
            s.set_stroke(config.gridline_color, config.gridline_thickness);
            stroke_all(s, self.gridlines().iter());

            s.set_stroke(config.separator_color, config.separator_thickness);
            stroke_all(s, self.separators().iter());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridOptions;
    use crate::fonts::LabelFonts;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    fn spec() -> GridSpec {
        GridOptions {
            output: Some("out.jpg".into()),
            rows: Some("A,B".into()),
            cols: Some("X,Y".into()),
            images: Some("1,2,3,4".into()),
            size: Some(512),
            header: Some(32),
            ..GridOptions::default()
        }
        .resolve()
        .unwrap()
    }

    #[test]
    fn test_mesh_and_separator_pixels() {
        let spec = spec();
        let layout = Layout::from_spec(&spec);
        let mut surface = Surface::for_spec(&spec, LabelFonts::none());
        layout.draw(&mut surface, &spec.drawing);
        let img = surface.image();
        let config = &spec.drawing;

        // Interior boundary at 272 is two pixels wide: 271 and 272.
        assert_eq!(img.get_pixel(271, 100), &config.gridline_color);
        assert_eq!(img.get_pixel(272, 100), &config.gridline_color);
        assert_eq!(img.get_pixel(270, 100), &config.background_color);
        assert_eq!(img.get_pixel(273, 100), &config.background_color);
        assert_eq!(img.get_pixel(100, 272), &config.gridline_color);

        // The mesh stops at the header band.
        assert_eq!(img.get_pixel(271, 10), &config.background_color);

        // Separators span the whole canvas and cover the first mesh lines.
        assert_eq!(img.get_pixel(32, 5), &config.separator_color);
        assert_eq!(img.get_pixel(32, 300), &config.separator_color);
        assert_eq!(img.get_pixel(300, 32), &config.separator_color);
        assert_eq!(img.get_pixel(5, 32), &config.separator_color);
    }

    type Bounds = (u32, u32, u32, u32);

    fn ink_bounds(
        img: &RgbaImage,
        xs: std::ops::Range<u32>,
        ys: std::ops::Range<u32>,
        background: Rgba<u8>,
    ) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for y in ys {
            for x in xs.clone() {
                if img.get_pixel(x, y) == &background {
                    continue;
                }
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bounds
    }

    fn assert_centered((x0, y0, x1, y1): Bounds, (x, y): (f32, f32)) {
        let center_x = (x0 + x1 + 1) as f32 / 2.0;
        let center_y = (y0 + y1 + 1) as f32 / 2.0;
        assert!(
            (center_x - x).abs() <= 2.0 && (center_y - y).abs() <= 2.0,
            "ink centered at ({center_x}, {center_y}), anchor ({x}, {y})"
        );
    }

    /// Labels drawn with a system font, or `None` when the host has none.
    fn rendered_labels() -> Option<(GridSpec, Layout, RgbaImage)> {
        let fonts = LabelFonts::discover(None).unwrap();
        if !fonts.is_available() {
            return None;
        }
        let spec = GridOptions {
            output: Some("out.jpg".into()),
            rows: Some("Alpha,Beta".into()),
            cols: Some("Wide,Long".into()),
            images: Some("1,2,3,4".into()),
            size: Some(512),
            header: Some(32),
            font_size: Some(20),
            ..GridOptions::default()
        }
        .resolve()
        .unwrap();
        let layout = Layout::from_spec(&spec);
        let mut surface = Surface::for_spec(&spec, fonts);
        draw_labels(&mut surface, &layout, &spec);
        Some((spec, layout, surface.into_image()))
    }

    #[test]
    fn test_column_labels_centered_on_anchor() {
        let Some((spec, layout, img)) = rendered_labels() else {
            return;
        };
        for (c, column) in layout.columns.iter().enumerate() {
            let bounds = ink_bounds(
                &img,
                column.x..column.x + column.width,
                0..layout.header_size,
                spec.drawing.background_color,
            )
            .unwrap_or_else(|| panic!("no ink for column label {c}"));
            assert_centered(bounds, layout.column_label_anchor(c));
            let (x0, y0, x1, y1) = bounds;
            assert!(x1 - x0 > y1 - y0, "column label {c} is not horizontal");
        }
    }

    #[test]
    fn test_row_labels_rotated_and_centered_on_anchor() {
        let Some((spec, layout, img)) = rendered_labels() else {
            return;
        };
        for (r, row) in layout.rows.iter().enumerate() {
            let bounds = ink_bounds(
                &img,
                0..layout.header_size,
                row.y..row.y + row.height,
                spec.drawing.background_color,
            )
            .unwrap_or_else(|| panic!("no ink for row label {r}"));
            assert_centered(bounds, layout.row_label_anchor(r));
            let (x0, y0, x1, y1) = bounds;
            assert!(y1 - y0 > x1 - x0, "row label {r} is not rotated");
        }
    }

    #[test]
    fn test_labels_leave_state_untouched() {
        let spec = spec();
        let layout = Layout::from_spec(&spec);
        let mut surface = Surface::for_spec(&spec, LabelFonts::discover(None).unwrap());
        let before = *surface.state();
        draw_labels(&mut surface, &layout, &spec);
        assert_eq!(surface.state(), &before);
    }

    #[test]
    fn test_labels_stay_in_header_bands() {
        let spec = spec();
        let layout = Layout::from_spec(&spec);
        let mut surface = Surface::for_spec(&spec, LabelFonts::discover(None).unwrap());
        let background: Rgba<u8> = spec.drawing.background_color;
        draw_labels(&mut surface, &layout, &spec);
        let img = surface.image();
        for (x, y, pixel) in img.enumerate_pixels() {
            if x >= 32 && y >= 32 {
                assert_eq!(pixel, &background, "label ink at ({x}, {y})");
            }
        }
    }
}
