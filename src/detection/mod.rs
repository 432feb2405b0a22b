pub mod nms;
pub mod preprocessing;
pub mod yolo;

use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use std::fmt::Debug;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{DetectError, DetectResult};
use crate::models::{Detection, DetectionClass};
use crate::render::Annotator;

/// Minimum score for a detection to be reported
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Image formats accepted from uploads and file pickers
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// A pretrained model that can be asked for detections
pub trait Detector: Send + Sync + Debug {
    fn predict(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> DetectResult<Vec<Detection>>;
}

/// Annotated image plus what was found in it
#[derive(Debug, Clone)]
pub struct DetectionReport {
    pub image: RgbImage,
    pub detections: Vec<Detection>,
    pub summary: DetectionSummary,
}

/// Per-class counts in the order classes were first seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionSummary {
    counts: Vec<(DetectionClass, usize)>,
}

impl DetectionSummary {
    pub fn from_detections(detections: &[Detection]) -> Self {
        let mut counts: Vec<(DetectionClass, usize)> = Vec::new();
        for det in detections {
            match counts.iter_mut().find(|(class, _)| *class == det.class) {
                Some((_, count)) => *count += 1,
                None => counts.push((det.class, 1)),
            }
        }
        Self { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn count(&self, class: DetectionClass) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn counts(&self) -> &[(DetectionClass, usize)] {
        &self.counts
    }

    /// One-line result shown under the image
    pub fn headline(&self) -> String {
        if self.counts.is_empty() {
            return "SCAN COMPLETE - NO OBJECTS DETECTED".to_string();
        }
        let parts: Vec<String> = self
            .counts
            .iter()
            .map(|(class, count)| format!("{}: {}", class, count))
            .collect();
        format!("DETECTION COMPLETE | {}", parts.join(" | "))
    }
}

/// Drop anything the model reported under `threshold`
pub fn filter_confident(detections: Vec<Detection>, threshold: f32) -> Vec<Detection> {
    let before = detections.len();
    let kept: Vec<Detection> = detections
        .into_iter()
        .filter(|d| d.confidence >= threshold)
        .collect();
    if kept.len() < before {
        warn!(
            "Discarded {} detections below confidence {:.2}",
            before - kept.len(),
            threshold
        );
    }
    kept
}

/// Predict, filter, draw. The whole detection flow every front-end uses.
pub fn run_detection(
    detector: &dyn Detector,
    annotator: &Annotator,
    image: &DynamicImage,
) -> DetectResult<DetectionReport> {
    debug!("Running inference on {}x{} image", image.width(), image.height());
    let detections = detector.predict(image, CONFIDENCE_THRESHOLD)?;
    let detections = filter_confident(detections, CONFIDENCE_THRESHOLD);

    for det in &detections {
        debug!("  {} at ({:.0}, {:.0})", det.label(), det.bbox.x1, det.bbox.y1);
    }

    let summary = DetectionSummary::from_detections(&detections);
    info!("{}", summary.headline());

    Ok(DetectionReport {
        image: annotator.annotate(image, &detections),
        detections,
        summary,
    })
}

fn check_format(format: Option<ImageFormat>) -> DetectResult<()> {
    match format {
        Some(f) if SUPPORTED_FORMATS.contains(&f) => Ok(()),
        _ => Err(DetectError::UnsupportedFormat),
    }
}

/// Decode an uploaded image, rejecting formats the front-ends do not offer
pub fn decode_image(bytes: &[u8]) -> DetectResult<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    check_format(reader.format())?;
    Ok(reader.decode()?)
}

/// Open an image file picked by the user
pub fn open_image(path: &Path) -> DetectResult<DynamicImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    check_format(reader.format())?;
    Ok(reader.decode()?)
}
