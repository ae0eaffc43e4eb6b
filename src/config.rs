use std::path::PathBuf;

use thiserror::Error;
use tracing::*;

use crate::drawing::GridDrawingConfig;

pub const DEFAULT_CANVAS_SIZE: u32 = 4096;
pub const DEFAULT_HEADER_SIZE: u32 = 80;
pub const DEFAULT_FONT_SIZE: u32 = 32;
pub const DEFAULT_QUALITY: u8 = 90;
/// Inset between a cell boundary and the image or placeholder drawn inside it.
pub const CELL_PADDING: u32 = 2;

/// Reasons a set of [`GridOptions`] cannot be turned into a [`GridSpec`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Output file path required")]
    MissingOutput,

    #[error("Both --rows and --cols are required")]
    MissingLabels,

    #[error("Expected {expected} images ({rows} rows x {cols} cols), got {actual}")]
    ImageCountMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
        actual: usize,
    },

    #[error("Quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("{name} must be greater than zero")]
    InvalidDimension { name: &'static str },

    #[error("Header size {header} must be smaller than the grid size {size}")]
    HeaderTooLarge { header: u32, size: u32 },

    #[error("Cells of {width}x{height} pixels leave no room for images")]
    CellTooSmall { width: u32, height: u32 },
}

/// Raw, unvalidated grid options as they arrive from the command line.
///
/// List fields hold the comma-separated flag value verbatim; `None` means the
/// flag was not given.
///
/// # Example
/// ```
/// use gridcomposer::config::GridOptions;
///
/// let options = GridOptions {
///     output: Some("grid.jpg".into()),
///     rows: Some("A, B".into()),
///     cols: Some("X,Y".into()),
///     images: Some("1.png,2.png,3.png,4.png".into()),
///     ..GridOptions::default()
/// };
/// let spec = options.resolve().unwrap();
/// assert_eq!(spec.row_labels, vec!["A", "B"]);
/// assert_eq!(spec.canvas_size, 4096);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridOptions {
    pub output: Option<PathBuf>,
    pub rows: Option<String>,
    pub cols: Option<String>,
    pub images: Option<String>,
    pub size: Option<u32>,
    pub header: Option<u32>,
    pub font_size: Option<u32>,
    pub quality: Option<u8>,
    pub font_path: Option<PathBuf>,
    /// Decode source images on the rayon pool (default: true)
    pub parallel_decode: Option<bool>,
}

/// Fully resolved grid configuration. Immutable once built.
#[derive(Debug, Clone)]
pub struct GridSpec {
    pub output: PathBuf,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// Source image paths in row-major order.
    pub image_paths: Vec<PathBuf>,
    /// Side of the square output canvas in pixels (default: 4096)
    pub canvas_size: u32,
    /// Thickness of the label bands along the top and left edges (default: 80)
    pub header_size: u32,
    /// Label font size in pixels (default: 32)
    pub font_size: u32,
    /// JPEG quality 1-100 (default: 90)
    pub quality: u8,
    pub font_path: Option<PathBuf>,
    pub parallel_decode: bool,
    pub drawing: GridDrawingConfig,
}

/// Splits a comma-separated flag value and trims every entry.
///
/// # Example
/// ```
/// use gridcomposer::config::split_list;
///
/// assert_eq!(split_list(Some(" a ,b,c ")), vec!["a", "b", "c"]);
/// assert!(split_list(None).is_empty());
/// ```
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default()
}

impl GridOptions {
    /// Validates the options and applies defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the output path or labels are missing, when
    /// the image count differs from `rows * cols`, or when the numeric options
    /// cannot produce a usable layout.
    pub fn resolve(&self) -> Result<GridSpec, ConfigError> {
        let output = self.output.clone().ok_or(ConfigError::MissingOutput)?;

        let row_labels = split_list(self.rows.as_deref());
        let col_labels = split_list(self.cols.as_deref());
        if row_labels.is_empty() || col_labels.is_empty() {
            return Err(ConfigError::MissingLabels);
        }

        let image_paths: Vec<PathBuf> = split_list(self.images.as_deref())
            .into_iter()
            .map(PathBuf::from)
            .collect();
        let expected = row_labels.len() * col_labels.len();
        if image_paths.len() != expected {
            error!(
                "Image count mismatch: expected {}, got {}",
                expected,
                image_paths.len()
            );
            return Err(ConfigError::ImageCountMismatch {
                expected,
                rows: row_labels.len(),
                cols: col_labels.len(),
                actual: image_paths.len(),
            });
        }

        let canvas_size = self.size.unwrap_or(DEFAULT_CANVAS_SIZE);
        let header_size = self.header.unwrap_or(DEFAULT_HEADER_SIZE);
        let font_size = self.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        let quality = self.quality.unwrap_or(DEFAULT_QUALITY);

        for (name, value) in [
            ("Grid size", canvas_size),
            ("Header size", header_size),
            ("Font size", font_size),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidDimension { name });
            }
        }
        if !(1..=100).contains(&quality) {
            return Err(ConfigError::InvalidQuality(quality));
        }
        if header_size >= canvas_size {
            return Err(ConfigError::HeaderTooLarge {
                header: header_size,
                size: canvas_size,
            });
        }

        let content = canvas_size - header_size;
        let cell_width = content / col_labels.len() as u32;
        let cell_height = content / row_labels.len() as u32;
        if cell_width <= 2 * CELL_PADDING || cell_height <= 2 * CELL_PADDING {
            return Err(ConfigError::CellTooSmall {
                width: cell_width,
                height: cell_height,
            });
        }

        let spec = GridSpec {
            output,
            row_labels,
            col_labels,
            image_paths,
            canvas_size,
            header_size,
            font_size,
            quality,
            font_path: self.font_path.clone(),
            parallel_decode: self.parallel_decode.unwrap_or(true),
            drawing: GridDrawingConfig::default(),
        };
        debug!("Resolved grid spec: {:?}", spec);
        Ok(spec)
    }
}

impl GridSpec {
    /// Number of rows in the grid.
    pub fn rows(&self) -> usize {
        self.row_labels.len()
    }

    /// Number of columns in the grid.
    pub fn columns(&self) -> usize {
        self.col_labels.len()
    }

    /// Quality as the 0-1 fraction handed to the encoder.
    ///
    /// # Example
    /// ```
    /// use gridcomposer::config::GridOptions;
    ///
    /// let spec = GridOptions {
    ///     output: Some("out.jpg".into()),
    ///     rows: Some("A".into()),
    ///     cols: Some("X".into()),
    ///     images: Some("a.png".into()),
    ///     ..GridOptions::default()
    /// }
    /// .resolve()
    /// .unwrap();
    /// assert_eq!(spec.quality_fraction(), 0.9);
    /// ```
    pub fn quality_fraction(&self) -> f32 {
        f32::from(self.quality) / 100.0
    }

    /// Font size of the placeholder label drawn in cells whose image failed to load.
    pub fn error_font_size(&self) -> f32 {
        self.font_size as f32 * self.drawing.error_label_scale
    }
}
