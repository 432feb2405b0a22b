use image::{DynamicImage, Rgb, RgbImage, imageops::FilterType};

use crate::models::BoundingBox;

const PAD_VALUE: u8 = 114;

/// How a source image was fitted into the model's square input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterbox {
    /// Compute the fit of a `width` x `height` image into a `size` square
    pub fn fit(width: u32, height: u32, size: u32) -> Self {
        let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
        let new_w = (width as f32 * scale).round();
        let new_h = (height as f32 * scale).round();
        Self {
            scale,
            pad_x: ((size as f32 - new_w) / 2.0).floor(),
            pad_y: ((size as f32 - new_h) / 2.0).floor(),
        }
    }

    /// Map a box from model input space back to source pixels
    pub fn unmap(&self, bbox: BoundingBox) -> BoundingBox {
        BoundingBox {
            x1: (bbox.x1 - self.pad_x) / self.scale,
            y1: (bbox.y1 - self.pad_y) / self.scale,
            x2: (bbox.x2 - self.pad_x) / self.scale,
            y2: (bbox.y2 - self.pad_y) / self.scale,
        }
    }
}

/// Resize keeping aspect ratio and pad to a `size` square
pub fn letterbox(img: &DynamicImage, size: u32) -> (RgbImage, Letterbox) {
    let rgb = img.to_rgb8();
    let fit = Letterbox::fit(rgb.width(), rgb.height(), size);
    let new_w = ((rgb.width() as f32 * fit.scale).round() as u32).clamp(1, size);
    let new_h = ((rgb.height() as f32 * fit.scale).round() as u32).clamp(1, size);

    let resized = image::imageops::resize(&rgb, new_w, new_h, FilterType::Triangle);
    let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));
    image::imageops::overlay(&mut canvas, &resized, fit.pad_x as i64, fit.pad_y as i64);

    (canvas, fit)
}

/// Planar NCHW float tensor data in [0, 1]
pub fn to_nchw(img: &RgbImage) -> Vec<f32> {
    let (w, h) = img.dimensions();
    let plane = (w * h) as usize;
    let mut data = vec![0.0f32; plane * 3];
    for (x, y, pixel) in img.enumerate_pixels() {
        let idx = (y * w + x) as usize;
        data[idx] = pixel[0] as f32 / 255.0;
        data[plane + idx] = pixel[1] as f32 / 255.0;
        data[2 * plane + idx] = pixel[2] as f32 / 255.0;
    }
    data
}
