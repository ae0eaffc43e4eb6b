//! Loads the source images and fits each one into its cell.
use std::path::{Path, PathBuf};

use image::DynamicImage;
use rayon::prelude::*;
use tracing::*;

use crate::config::GridSpec;
use crate::drawing::{Drawable, GridDrawingConfig, Surface};
use crate::fonts::FontWeight;
use crate::grid::{Cell, Layout};
use crate::GridError;

/// Text shown in cells whose image could not be loaded.
pub const PLACEHOLDER_LABEL: &str = "Error";

/// Outcome of loading one cell's image. Consumed once, never cached.
pub type CellImage = Result<DynamicImage, GridError>;

/// Rectangle an image is drawn into, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DrawRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fits an `image_width` x `image_height` image into `cell`, preserving its
/// aspect ratio and keeping `padding` pixels free on the constrained axis.
///
/// Images relatively wider than the cell span the cell width and are centered
/// vertically; all others span the cell height and are centered horizontally.
///
/// # Example
/// ```
/// use gridcomposer::{compositor::fit_rect, grid::Layout};
///
/// let layout = Layout::new(512, 32, 2, 2);
/// let rect = fit_rect(200, 100, &layout.cell(0, 0), 2);
/// assert_eq!((rect.x, rect.y, rect.width, rect.height), (34.0, 93.0, 236.0, 118.0));
/// ```
pub fn fit_rect(image_width: u32, image_height: u32, cell: &Cell<'_>, padding: u32) -> DrawRect {
    let (cell_x, cell_y) = cell.origin();
    let (cell_x, cell_y) = (cell_x as f32, cell_y as f32);
    let (cell_width, cell_height) = (cell.width() as f32, cell.height() as f32);
    let padding = padding as f32;

    let image_aspect = image_width as f32 / image_height as f32;
    let cell_aspect = cell_width / cell_height;

    if image_aspect > cell_aspect {
        let width = cell_width - 2.0 * padding;
        let height = width / image_aspect;
        DrawRect {
            x: cell_x + padding,
            y: cell_y + (cell_height - height) / 2.0,
            width,
            height,
        }
    } else {
        let height = cell_height - 2.0 * padding;
        let width = height * image_aspect;
        DrawRect {
            x: cell_x + (cell_width - width) / 2.0,
            y: cell_y + padding,
            width,
            height,
        }
    }
}

/// Decodes one source image.
///
/// # Errors
/// Returns [`GridError::ImageLoad`] if the file is missing, unreadable or in an
/// unsupported format.
pub fn load_image(path: &Path) -> CellImage {
    image::open(path).map_err(|source| GridError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes every source image, optionally on the rayon pool. The result is
/// always in the order of `paths`.
pub fn load_cells(paths: &[PathBuf], parallel: bool) -> Vec<CellImage> {
    let total = paths.len();
    let load = |(index, path): (usize, &PathBuf)| {
        info!("Loading image {}/{}: {}", index + 1, total, path.display());
        load_image(path)
    };

    if parallel {
        paths.par_iter().enumerate().map(&load).collect()
    } else {
        paths.iter().enumerate().map(&load).collect()
    }
}

/// A cell paired with whatever loading its image produced.
pub struct PlacedCell<'a> {
    pub cell: Cell<'a>,
    pub content: &'a CellImage,
    /// Size of the placeholder label if `content` is an error.
    pub error_font_size: f32,
}

impl Drawable for PlacedCell<'_> {
    fn draw(&self, surface: &mut Surface, config: &GridDrawingConfig) {
        match self.content {
            Ok(image) => {
                let rect = fit_rect(image.width(), image.height(), &self.cell, config.padding);
                trace!("Drawing image at {:?}", rect);
                surface.draw_image(image, rect.x, rect.y, rect.width, rect.height);
            }
            Err(_) => draw_placeholder(surface, &self.cell, self.error_font_size, config),
        }
    }
}

fn draw_placeholder(
    surface: &mut Surface,
    cell: &Cell<'_>,
    font_size: f32,
    config: &GridDrawingConfig,
) {
    let (x, y) = cell.origin();
    let padding = config.padding as f32;
    let (center_x, center_y) = cell.center();

    surface.with_saved_state(|s| {
        s.set_fill(config.placeholder_color);
        s.fill_rect(
            x as f32 + padding,
            y as f32 + padding,
            cell.width() as f32 - 2.0 * padding,
            cell.height() as f32 - 2.0 * padding,
        );

        s.set_fill(config.placeholder_text_color);
        s.set_font(font_size, FontWeight::Regular);
        s.fill_text(PLACEHOLDER_LABEL, center_x, center_y);
    });
}

/// Draws every cell in row-major order. Cells whose image failed to load get
/// a placeholder and a warning; the others are unaffected.
///
/// Returns the number of placeholders drawn.
pub fn composite_cells(
    surface: &mut Surface,
    layout: &Layout,
    images: &[CellImage],
    spec: &GridSpec,
) -> usize {
    let error_font_size = spec.error_font_size();
    let mut failed = 0;
    for ((row, column, cell), content) in layout.cells().zip(images) {
        if let Err(e) = content {
            warn!("{} (row {}, column {})", e, row, column);
            failed += 1;
        }
        PlacedCell {
            cell,
            content,
            error_font_size,
        }
        .draw(surface, &spec.drawing);
    }
    failed
}
