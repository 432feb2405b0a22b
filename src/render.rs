//! Burning detections into the image.
//!
//! Each detection gets a hollow rectangle in its class colour and its label
//! ("toolbox 0.73") in black on a filled strip of the same colour just above the
//! box. A font shipped with the binary is used when no system font is found.

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::DetectorConfig;
use crate::error::{DetectError, DetectResult};
use crate::models::Detection;

const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

const LABEL_PADDING: u32 = 5;

static BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

const SYSTEM_FONTS: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub struct Annotator {
    /// Label font. If None, only boxes are drawn.
    pub font: Option<FontVec>,
    pub font_scale: f32,
    pub thickness: u32,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("font", &self.font.is_some())
            .field("font_scale", &self.font_scale)
            .field("thickness", &self.thickness)
            .finish()
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::with_bundled_font()
    }
}

impl Annotator {
    /// Boxes without label text
    pub fn boxes_only() -> Self {
        Self {
            font: None,
            font_scale: 20.0,
            thickness: 3,
        }
    }

    fn with_font(font: FontVec) -> Self {
        Self {
            font: Some(font),
            ..Self::boxes_only()
        }
    }

    pub fn with_font_path(font_path: &Path) -> DetectResult<Self> {
        let data = std::fs::read(font_path)?;
        let font = FontVec::try_from_vec(data)
            .map_err(|_| DetectError::Font(format!("cannot parse {}", font_path.display())))?;
        Ok(Self::with_font(font))
    }

    /// Label with the DejaVu Sans Bold face compiled into the binary
    pub fn with_bundled_font() -> Self {
        match FontVec::try_from_vec(BUNDLED_FONT.to_vec()) {
            Ok(font) => Self::with_font(font),
            Err(e) => {
                warn!("Bundled label font is unreadable ({}), drawing boxes only", e);
                Self::boxes_only()
            }
        }
    }

    /// Try a few well-known font locations, then the bundled font
    pub fn with_system_font() -> Self {
        for path in SYSTEM_FONTS {
            if let Ok(data) = std::fs::read(path)
                && let Ok(font) = FontVec::try_from_vec(data)
            {
                info!("Loaded label font: {}", path);
                return Self::with_font(font);
            }
        }
        debug!("No system font found, using the bundled one");
        Self::with_bundled_font()
    }

    pub fn from_config(config: &DetectorConfig) -> DetectResult<Self> {
        match &config.font {
            Some(path) => Self::with_font_path(path),
            None => Ok(Self::with_system_font()),
        }
    }

    /// Copy of `image` with every detection drawn on it
    pub fn annotate(&self, image: &DynamicImage, detections: &[Detection]) -> RgbImage {
        let mut canvas = image.to_rgb8();
        let (width, height) = canvas.dimensions();

        for det in detections {
            let Some(rect) = det.bbox.clamp(width, height).to_rect() else {
                debug!("Skipping empty box for {}", det.label());
                continue;
            };
            let color = det.class.color();
            self.draw_box(&mut canvas, rect, color);

            if let Some(font) = &self.font {
                self.draw_label(&mut canvas, font, rect, color, &det.label());
            }
        }

        canvas
    }

    fn draw_box(&self, canvas: &mut RgbImage, rect: Rect, color: Rgb<u8>) {
        // Grow inwards so the outer edge stays on the detected box
        for i in 0..self.thickness {
            let w = rect.width().saturating_sub(2 * i);
            let h = rect.height().saturating_sub(2 * i);
            if w == 0 || h == 0 {
                break;
            }
            let inset = Rect::at(rect.left() + i as i32, rect.top() + i as i32).of_size(w, h);
            draw_hollow_rect_mut(canvas, inset, color);
        }
    }

    fn draw_label(
        &self,
        canvas: &mut RgbImage,
        font: &FontVec,
        rect: Rect,
        color: Rgb<u8>,
        label: &str,
    ) {
        let scale = PxScale::from(self.font_scale);
        let (text_w, text_h) = text_size(scale, font, label);
        let strip_h = text_h + 2 * LABEL_PADDING;
        let strip_w = text_w + 2 * LABEL_PADDING;

        // Above the box when it fits, otherwise hanging inside the top edge
        let top = if rect.top() >= strip_h as i32 {
            rect.top() - strip_h as i32
        } else {
            rect.top()
        };
        let left = rect.left().min(canvas.width() as i32 - strip_w as i32).max(0);

        draw_filled_rect_mut(canvas, Rect::at(left, top).of_size(strip_w, strip_h), color);
        draw_text_mut(
            canvas,
            TEXT_COLOR,
            left + LABEL_PADDING as i32,
            top + LABEL_PADDING as i32,
            scale,
            font,
            label,
        );
    }
}
