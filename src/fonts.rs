//! Label font discovery.
//!
//! Fonts are looked up once per run: an explicit path wins, otherwise the
//! first readable file from a list of common system locations is used. A run
//! without any usable font still renders every line, cell and image; only the
//! text is skipped.
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use tracing::*;

use crate::GridError;

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/gnu-free/FreeSansBold.otf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/gnu-free/FreeSans.otf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Weight of the label font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// The pair of fonts used for labels. Either may be missing.
#[derive(Clone, Default)]
pub struct LabelFonts {
    bold: Option<FontArc>,
    regular: Option<FontArc>,
}

impl std::fmt::Debug for LabelFonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFonts")
            .field("bold", &self.bold.is_some())
            .field("regular", &self.regular.is_some())
            .finish()
    }
}

impl LabelFonts {
    /// No fonts at all; text drawing becomes a no-op.
    pub fn none() -> Self {
        Self::default()
    }

    /// Uses a single font for both weights.
    pub fn single(font: FontArc) -> Self {
        Self {
            bold: Some(font.clone()),
            regular: Some(font),
        }
    }

    /// Loads the explicit font when given, otherwise searches the system.
    ///
    /// # Errors
    /// Returns [`GridError::FontLoad`] only when an explicit path cannot be
    /// read or parsed. A failed system search is logged and yields
    /// [`LabelFonts::none`].
    pub fn discover(explicit: Option<&Path>) -> Result<Self, GridError> {
        if let Some(path) = explicit {
            info!("Using label font {}", path.display());
            return load_font(path).map(Self::single);
        }

        let bold = first_available(BOLD_CANDIDATES);
        let regular = first_available(REGULAR_CANDIDATES);
        let fonts = Self { bold, regular };
        if !fonts.is_available() {
            warn!("No usable system font found, labels will not be drawn (pass --font to choose one)");
        }
        Ok(fonts)
    }

    /// Whether any text can be drawn.
    pub fn is_available(&self) -> bool {
        self.bold.is_some() || self.regular.is_some()
    }

    /// The font for `weight`, falling back to the other weight.
    pub fn get(&self, weight: FontWeight) -> Option<&FontArc> {
        let (preferred, fallback) = match weight {
            FontWeight::Bold => (&self.bold, &self.regular),
            FontWeight::Regular => (&self.regular, &self.bold),
        };
        preferred.as_ref().or(fallback.as_ref())
    }
}

/// Reads and parses a TrueType/OpenType font file.
///
/// # Errors
/// Returns [`GridError::FontLoad`] if the file is unreadable or not a font.
pub fn load_font(path: &Path) -> Result<FontArc, GridError> {
    let data = std::fs::read(path).map_err(|e| GridError::FontLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    FontArc::try_from_vec(data).map_err(|e| GridError::FontLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn first_available(candidates: &[&str]) -> Option<FontArc> {
    candidates.iter().map(PathBuf::from).find_map(|path| {
        if !path.is_file() {
            return None;
        }
        match load_font(&path) {
            Ok(font) => {
                debug!("Found system font {}", path.display());
                Some(font)
            }
            Err(e) => {
                trace!("Skipping font candidate: {}", e);
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_has_no_fonts() {
        let fonts = LabelFonts::none();
        assert!(!fonts.is_available());
        assert!(fonts.get(FontWeight::Bold).is_none());
        assert!(fonts.get(FontWeight::Regular).is_none());
    }

    #[test]
    fn test_explicit_missing_font_is_an_error() {
        let result = LabelFonts::discover(Some(Path::new("does/not/exist.ttf")));
        assert!(matches!(result, Err(GridError::FontLoad { .. })));
    }

    #[test]
    fn test_explicit_invalid_font_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        let result = load_font(&path);
        assert!(matches!(result, Err(GridError::FontLoad { .. })));
    }

    #[test]
    fn test_system_search_never_fails() {
        assert!(LabelFonts::discover(None).is_ok());
    }
}
