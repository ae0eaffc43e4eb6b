//! This crate composes a set of images into a single labeled grid.
//! It uses the `image` and `imageproc` crates for raster work and `ab_glyph` for label text.
//!
//! The pipeline runs in one direction: options are resolved into a
//! [`GridSpec`](config::GridSpec), a [`Layout`](grid::Layout) is derived from
//! it, labels, gridlines and images are drawn onto one
//! [`Surface`](drawing::Surface) and the result is written as a JPEG.
//!
//! # Example
//! ```no_run
//! use gridcomposer::config::GridOptions;
//!
//! let spec = GridOptions {
//!     output: Some("grid.jpg".into()),
//!     rows: Some("Cyberpunk,Goth".into()),
//!     cols: Some("Coffeeshop,Boardroom".into()),
//!     images: Some("1.png,2.png,3.png,4.png".into()),
//!     ..GridOptions::default()
//! }
//! .resolve()
//! .unwrap();
//!
//! gridcomposer::create_grid(&spec).unwrap();
//! ```

/// Resolution of raw options into a validated grid spec.
pub mod config;
/// Image loading, aspect fitting and placeholders.
pub mod compositor;
/// Raster surface with a canvas-style save/restore state stack.
///
/// The main components of this module are:
/// - [`GridDrawingConfig`](drawing::GridDrawingConfig): colors, strokes and padding.
/// - [`Surface`](drawing::Surface): the canvas everything is drawn on.
/// - [`Drawable`](drawing::Drawable): implemented by the parts of the grid.
pub mod drawing;
pub mod encoder;
pub mod fonts;
pub mod grid;
/// Header labels and the gridline mesh.
pub mod labels;

use std::path::PathBuf;

use drawing::{Drawable, Surface};
use fonts::LabelFonts;
use grid::Layout;
use image::RgbaImage;
use thiserror::Error;
use tracing::*;

pub use config::{ConfigError, GridOptions, GridSpec};

#[derive(Error, Debug)]
pub enum GridError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Error loading image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to load font {}: {reason}", path.display())]
    FontLoad { path: PathBuf, reason: String },

    #[error("Failed to encode grid: {0}")]
    Encode(image::ImageError),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Draws the complete grid for `spec`: background, labels, gridlines and
/// every cell, in that order.
pub fn compose(spec: &GridSpec, fonts: LabelFonts) -> RgbaImage {
    let size = spec.canvas_size;
    info!(
        "Creating {}x{} grid with {} rows and {} cols",
        size,
        size,
        spec.rows(),
        spec.columns()
    );

    let layout = Layout::from_spec(spec);
    info!("Cell size: {}x{}", layout.cell_width, layout.cell_height);

    let images = compositor::load_cells(&spec.image_paths, spec.parallel_decode);

    let mut surface = Surface::for_spec(spec, fonts);
    labels::draw_labels(&mut surface, &layout, spec);
    layout.draw(&mut surface, &spec.drawing);
    let failed = compositor::composite_cells(&mut surface, &layout, &images, spec);
    if failed > 0 {
        warn!("{} of {} images replaced by placeholders", failed, images.len());
    }

    surface.into_image()
}

/// Composes the grid described by `spec` and writes it to `spec.output`.
///
/// Returns the path written.
///
/// # Errors
/// Returns [`GridError::FontLoad`] if an explicit font cannot be loaded, and
/// [`GridError::Encode`] or [`GridError::Io`] if the output cannot be
/// produced. Images that fail to load are not errors.
pub fn create_grid(spec: &GridSpec) -> Result<PathBuf, GridError> {
    let fonts = LabelFonts::discover(spec.font_path.as_deref())?;
    let canvas = compose(spec, fonts);
    encoder::save_jpeg(&canvas, spec.quality_fraction(), &spec.output)?;
    info!("Grid saved to: {}", spec.output.display());
    Ok(spec.output.clone())
}
