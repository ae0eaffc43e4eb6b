//! Raster surface the grid is composed on.
//!
//! [`Surface`] wraps an [`RgbaImage`] together with a stack of draw states in
//! the style of a 2D canvas context: fill and stroke settings, the label font
//! and a transform made of a translation plus quarter-turn rotations. Callers
//! push the current state with [`Surface::save`] (or scope a change with
//! [`Surface::with_saved_state`]) and get it back with [`Surface::restore`].
//!
//! # Examples
//!
//! ```rust
//! use gridcomposer::{drawing::*, fonts::LabelFonts};
//! use image::Rgba;
//!
//! let mut surface = Surface::new(64, 64, LabelFonts::none());
//! surface.with_saved_state(|s| {
//!     s.set_fill(Rgba([255, 0, 0, 255]));
//!     s.translate(10.0, 10.0);
//!     s.fill_rect(0.0, 0.0, 4.0, 4.0);
//! });
//! assert_eq!(surface.image().get_pixel(11, 11), &Rgba([255, 0, 0, 255]));
//! assert_eq!(surface.state().transform, Transform::identity());
//! ```

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{imageops, DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::*;

use crate::config::GridSpec;
use crate::fonts::{FontWeight, LabelFonts};

/// Colors, strokes and padding used when composing a grid.
///
/// # Examples
///
/// ```
/// use gridcomposer::drawing::GridDrawingConfig;
/// use image::Rgba;
///
/// let config = GridDrawingConfig {
///     separator_color: Rgba([255, 255, 255, 255]),
///     separator_thickness: 4,
///     ..GridDrawingConfig::default()
/// };
/// assert_eq!(config.padding, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridDrawingConfig {
    /// Inset between a cell edge and its image or placeholder.
    pub padding: u32,
    pub background_color: Rgba<u8>,
    pub label_color: Rgba<u8>,
    /// Color of the thin boundary mesh between cells.
    pub gridline_color: Rgba<u8>,
    pub gridline_thickness: u32,
    /// Color of the two lines bordering the header bands.
    pub separator_color: Rgba<u8>,
    pub separator_thickness: u32,
    /// Fill of the rectangle drawn in place of an image that failed to load.
    pub placeholder_color: Rgba<u8>,
    pub placeholder_text_color: Rgba<u8>,
    /// Placeholder label size relative to the label font size.
    pub error_label_scale: f32,
}

impl Default for GridDrawingConfig {
    fn default() -> Self {
        GridDrawingConfig {
            padding: crate::config::CELL_PADDING,
            background_color: Rgba([0x1a, 0x1a, 0x2e, 255]),
            label_color: Rgba([0xff, 0xff, 0xff, 255]),
            gridline_color: Rgba([0x33, 0x33, 0x55, 255]),
            gridline_thickness: 2,
            separator_color: Rgba([0x55, 0x55, 0x77, 255]),
            separator_thickness: 3,
            placeholder_color: Rgba([0x44, 0x22, 0x22, 255]),
            placeholder_text_color: Rgba([0xff, 0x66, 0x66, 255]),
            error_label_scale: 0.6,
        }
    }
}

/// Trait for parts of the grid that can be drawn on a [`Surface`].
pub trait Drawable {
    /// Draws the object using the given configuration. Implementations must
    /// leave the surface state as they found it.
    fn draw(&self, surface: &mut Surface, config: &GridDrawingConfig);
}

/// Translation followed by a rotation in quarter turns (clockwise on screen).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub dx: f32,
    pub dy: f32,
    pub quarter_turns: u8,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            quarter_turns: 0,
        }
    }

    /// Maps a point from user space to canvas pixels.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let (rx, ry) = rotate_point(x, y, self.quarter_turns);
        (rx + self.dx, ry + self.dy)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Crops a coverage mask to the bounding box of its non-zero pixels.
fn crop_to_ink(mask: &GrayImage) -> Option<GrayImage> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, coverage) in mask.enumerate_pixels() {
        if coverage[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    let (x0, y0, x1, y1) = bounds?;
    Some(imageops::crop_imm(mask, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image())
}

fn rotate_point(x: f32, y: f32, quarter_turns: u8) -> (f32, f32) {
    match quarter_turns % 4 {
        0 => (x, y),
        1 => (-y, x),
        2 => (-x, -y),
        _ => (y, -x),
    }
}

/// Font settings of a draw state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub weight: FontWeight,
}

/// Everything [`Surface::save`] pushes and [`Surface::restore`] pops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub transform: Transform,
    pub fill: Rgba<u8>,
    pub stroke: Rgba<u8>,
    pub line_width: u32,
    pub font: FontSpec,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            fill: Rgba([0, 0, 0, 255]),
            stroke: Rgba([0, 0, 0, 255]),
            line_width: 1,
            font: FontSpec {
                size: 10.0,
                weight: FontWeight::Regular,
            },
        }
    }
}

/// A mutable raster with canvas-style drawing state.
pub struct Surface {
    image: RgbaImage,
    fonts: LabelFonts,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl Surface {
    /// Creates a transparent surface of the given size.
    pub fn new(width: u32, height: u32, fonts: LabelFonts) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            fonts,
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    /// Creates the square canvas for `spec`, filled with its background and
    /// with the bold label font selected.
    pub fn for_spec(spec: &GridSpec, fonts: LabelFonts) -> Self {
        let size = spec.canvas_size;
        let mut surface = Self::new(size, size, fonts);
        surface.set_fill(spec.drawing.background_color);
        surface.fill_rect(0.0, 0.0, size as f32, size as f32);
        surface.set_fill(spec.drawing.label_color);
        surface.set_font(spec.font_size as f32, FontWeight::Bold);
        surface
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// Pushes the current draw state.
    pub fn save(&mut self) {
        self.stack.push(self.state);
    }

    /// Pops the last saved draw state. Unbalanced calls leave the state as is.
    pub fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => warn!("restore called without a matching save"),
        }
    }

    /// Runs `f` between a [`save`](Self::save) and a [`restore`](Self::restore).
    pub fn with_saved_state<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.save();
        let result = f(self);
        self.restore();
        result
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        let t = &mut self.state.transform;
        let (rx, ry) = rotate_point(dx, dy, t.quarter_turns);
        t.dx += rx;
        t.dy += ry;
    }

    /// Rotates by `turns` quarter turns; negative values turn counter-clockwise.
    pub fn rotate_quarter_turns(&mut self, turns: i32) {
        let t = &mut self.state.transform;
        t.quarter_turns = (i32::from(t.quarter_turns) + turns).rem_euclid(4) as u8;
    }

    pub fn set_fill(&mut self, color: Rgba<u8>) {
        self.state.fill = color;
    }

    pub fn set_stroke(&mut self, color: Rgba<u8>, line_width: u32) {
        self.state.stroke = color;
        self.state.line_width = line_width;
    }

    pub fn set_font(&mut self, size: f32, weight: FontWeight) {
        self.state.font = FontSpec { size, weight };
    }

    /// Maps a user-space rectangle to the pixel rectangle it covers, or `None`
    /// when it rounds to nothing.
    fn device_rect(&self, x: f32, y: f32, width: f32, height: f32) -> Option<Rect> {
        let t = self.state.transform;
        let (x0, y0) = t.apply(x, y);
        let (x1, y1) = t.apply(x + width, y + height);
        let left = x0.min(x1).round() as i32;
        let top = y0.min(y1).round() as i32;
        let right = x0.max(x1).round() as i32;
        let bottom = y0.max(y1).round() as i32;
        (right > left && bottom > top)
            .then(|| Rect::at(left, top).of_size((right - left) as u32, (bottom - top) as u32))
    }

    /// Fills a rectangle with the current fill color.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if let Some(rect) = self.device_rect(x, y, width, height) {
            draw_filled_rect_mut(&mut self.image, rect, self.state.fill);
        }
    }

    /// Strokes a segment with the current stroke color and width.
    ///
    /// Axis-aligned segments become filled rectangles of the line width
    /// centered on the segment; anything else is drawn one pixel wide.
    pub fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32)) {
        let t = self.state.transform;
        let (x0, y0) = t.apply(from.0, from.1);
        let (x1, y1) = t.apply(to.0, to.1);
        let width = self.state.line_width;
        if width == 0 {
            return;
        }
        let half = width as f32 / 2.0;

        let rect = if x0 == x1 {
            let top = y0.min(y1).round() as i32;
            let bottom = y0.max(y1).round() as i32;
            (bottom > top).then(|| {
                Rect::at((x0 - half).round() as i32, top).of_size(width, (bottom - top) as u32)
            })
        } else if y0 == y1 {
            let left = x0.min(x1).round() as i32;
            let right = x0.max(x1).round() as i32;
            (right > left).then(|| {
                Rect::at(left, (y0 - half).round() as i32).of_size((right - left) as u32, width)
            })
        } else {
            draw_line_segment_mut(&mut self.image, (x0, y0), (x1, y1), self.state.stroke);
            return;
        };

        if let Some(rect) = rect {
            draw_filled_rect_mut(&mut self.image, rect, self.state.stroke);
        }
    }

    /// Draws `text` centered horizontally and vertically on `(x, y)`, in the
    /// current fill color and font, rotated by the current transform.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        if text.is_empty() {
            return;
        }
        let FontSpec { size, weight } = self.state.font;
        let Some(font) = self.fonts.get(weight) else {
            trace!("No font available, skipping label {:?}", text);
            return;
        };

        let scale = PxScale::from(size);
        let (text_width, _) = text_size(scale, font, text);
        let scaled = font.as_scaled(scale);
        let line_height = (scaled.ascent() - scaled.descent()).ceil().max(1.0) as u32;
        let pad = (size / 4.0).ceil() as u32 + 1;
        let mut mask = GrayImage::new(text_width + 2 * pad, line_height + 2 * pad);
        draw_text_mut(&mut mask, Luma([255]), pad as i32, pad as i32, scale, font, text);
        let Some(mask) = crop_to_ink(&mask) else {
            return;
        };

        let t = self.state.transform;
        let mask = match t.quarter_turns % 4 {
            0 => mask,
            1 => imageops::rotate90(&mask),
            2 => imageops::rotate180(&mask),
            _ => imageops::rotate270(&mask),
        };
        let (ax, ay) = t.apply(x, y);
        let left = (ax - mask.width() as f32 / 2.0).round() as i64;
        let top = (ay - mask.height() as f32 / 2.0).round() as i64;
        self.blend_mask(&mask, left, top, self.state.fill);
    }

    /// Blends `color` into the canvas using `mask` as per-pixel coverage.
    fn blend_mask(&mut self, mask: &GrayImage, left: i64, top: i64, color: Rgba<u8>) {
        let (width, height) = self.image.dimensions();
        let color_alpha = f32::from(color[3]) / 255.0;
        for (mx, my, coverage) in mask.enumerate_pixels() {
            let (x, y) = (left + i64::from(mx), top + i64::from(my));
            if coverage[0] == 0 || x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height)
            {
                continue;
            }
            let alpha = f32::from(coverage[0]) / 255.0 * color_alpha;
            let dst = self.image.get_pixel_mut(x as u32, y as u32);
            for channel in 0..3 {
                let blended =
                    f32::from(dst[channel]) * (1.0 - alpha) + f32::from(color[channel]) * alpha;
                dst[channel] = blended.round().clamp(0.0, 255.0) as u8;
            }
            let out_alpha = f32::from(dst[3]) / 255.0 * (1.0 - alpha) + alpha;
            dst[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }

    /// Draws `source` scaled into the given user-space rectangle.
    pub fn draw_image(&mut self, source: &DynamicImage, x: f32, y: f32, width: f32, height: f32) {
        let Some(rect) = self.device_rect(x, y, width, height) else {
            debug!("Image rectangle {}x{} is empty, skipping", width, height);
            return;
        };
        let rgba = source.to_rgba8();
        let oriented = match self.state.transform.quarter_turns % 4 {
            0 => rgba,
            1 => imageops::rotate90(&rgba),
            2 => imageops::rotate180(&rgba),
            _ => imageops::rotate270(&rgba),
        };
        let scaled = imageops::resize(
            &oriented,
            rect.width(),
            rect.height(),
            imageops::FilterType::Triangle,
        );
        imageops::overlay(
            &mut self.image,
            &scaled,
            i64::from(rect.left()),
            i64::from(rect.top()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn surface(size: u32) -> Surface {
        Surface::new(size, size, LabelFonts::none())
    }

    #[test_case(0, (3.0, 5.0) => (3.0, 5.0); "identity")]
    #[test_case(1, (3.0, 5.0) => (-5.0, 3.0); "clockwise")]
    #[test_case(2, (3.0, 5.0) => (-3.0, -5.0); "half turn")]
    #[test_case(3, (3.0, 5.0) => (5.0, -3.0); "counter clockwise")]
    fn test_rotate_point(turns: u8, point: (f32, f32)) -> (f32, f32) {
        rotate_point(point.0, point.1, turns)
    }

    #[test]
    fn test_save_restore_transform() {
        let mut s = surface(10);
        s.save();
        s.translate(4.0, 6.0);
        s.rotate_quarter_turns(-1);
        assert_eq!(s.state().transform.quarter_turns, 3);
        assert_eq!(s.state().transform.apply(0.0, 0.0), (4.0, 6.0));
        assert_eq!(s.state().transform.apply(2.0, 0.0), (4.0, 4.0));
        s.restore();
        assert_eq!(s.state().transform, Transform::identity());
    }

    #[test]
    fn test_translate_after_rotate_uses_rotated_axes() {
        let mut s = surface(10);
        s.rotate_quarter_turns(1);
        s.translate(2.0, 0.0);
        assert_eq!(s.state().transform.apply(0.0, 0.0), (0.0, 2.0));
    }

    #[test]
    fn test_with_saved_state_restores_fill_and_font() {
        let mut s = surface(10);
        s.set_fill(RED);
        s.set_font(32.0, FontWeight::Bold);
        s.with_saved_state(|s| {
            s.set_fill(BLUE);
            s.set_font(19.2, FontWeight::Regular);
        });
        assert_eq!(s.state().fill, RED);
        assert_eq!(s.state().font.weight, FontWeight::Bold);
        assert_eq!(s.state().font.size, 32.0);
    }

    #[test]
    fn test_unbalanced_restore_keeps_state() {
        let mut s = surface(10);
        s.set_fill(RED);
        s.restore();
        assert_eq!(s.state().fill, RED);
    }

    #[test]
    fn test_fill_rect_exact_pixels() {
        let mut s = surface(10);
        s.set_fill(RED);
        s.fill_rect(2.0, 3.0, 4.0, 2.0);
        let img = s.image();
        assert_eq!(img.get_pixel(2, 3), &RED);
        assert_eq!(img.get_pixel(5, 4), &RED);
        assert_eq!(img.get_pixel(6, 4), &Rgba([0, 0, 0, 0]));
        assert_eq!(img.get_pixel(2, 5), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_vertical_stroke_is_centered() {
        let mut s = surface(10);
        s.set_stroke(BLUE, 2);
        s.stroke_line((5.0, 0.0), (5.0, 10.0));
        let img = s.image();
        assert_eq!(img.get_pixel(3, 5), &Rgba([0, 0, 0, 0]));
        assert_eq!(img.get_pixel(4, 5), &BLUE);
        assert_eq!(img.get_pixel(5, 5), &BLUE);
        assert_eq!(img.get_pixel(6, 5), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_horizontal_stroke_is_clipped() {
        let mut s = surface(10);
        s.set_stroke(BLUE, 3);
        s.stroke_line((0.0, 10.0), (10.0, 10.0));
        let img = s.image();
        assert_eq!(img.get_pixel(0, 9), &BLUE);
        assert_eq!(img.get_pixel(0, 8), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_image_scales_into_rect() {
        let mut s = surface(20);
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, RED));
        s.draw_image(&source, 5.0, 5.0, 10.0, 6.0);
        let img = s.image();
        assert_eq!(img.get_pixel(5, 5), &RED);
        assert_eq!(img.get_pixel(14, 10), &RED);
        assert_eq!(img.get_pixel(15, 10), &Rgba([0, 0, 0, 0]));
        assert_eq!(img.get_pixel(14, 11), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_text_without_font_is_noop() {
        let mut s = surface(10);
        s.set_fill(RED);
        s.fill_text("Error", 5.0, 5.0);
        assert!(s.image().pixels().all(|p| p == &Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_crop_to_ink() {
        let mut mask = GrayImage::new(8, 8);
        mask.put_pixel(2, 3, Luma([10]));
        mask.put_pixel(5, 4, Luma([200]));
        let cropped = crop_to_ink(&mask).unwrap();
        assert_eq!(cropped.dimensions(), (4, 2));
        assert_eq!(cropped.get_pixel(0, 0), &Luma([10]));
        assert!(crop_to_ink(&GrayImage::new(3, 3)).is_none());
    }

    #[test]
    fn test_blend_mask_full_coverage() {
        let mut s = surface(4);
        let mask = GrayImage::from_pixel(2, 2, Luma([255]));
        s.blend_mask(&mask, -1, 3, RED);
        assert_eq!(s.image().get_pixel(0, 3), &RED);
        assert_eq!(s.image().get_pixel(1, 3), &Rgba([0, 0, 0, 0]));
    }
}
