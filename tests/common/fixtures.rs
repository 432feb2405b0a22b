use astroguard::{BoundingBox, DetectError, DetectResult, Detection, DetectionClass, Detector};
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::sync::Mutex;
use tempfile::NamedTempFile;

pub const BACKGROUND: Rgb<u8> = Rgb([40, 40, 40]);

/// Detector that returns the same detections every call and counts calls.
/// It ignores the threshold on purpose so client-side filtering can be tested.
#[derive(Debug, Default)]
pub struct ScriptedDetector {
    pub detections: Vec<Detection>,
    pub calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(detections: Vec<Detection>) -> Arc<Self> {
        Arc::new(Self {
            detections,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for ScriptedDetector {
    fn predict(&self, _image: &DynamicImage, _threshold: f32) -> DetectResult<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.detections.clone())
    }
}

/// Detector whose every prediction fails like a runtime error in the model
#[derive(Debug)]
pub struct FailingDetector;

impl Detector for FailingDetector {
    fn predict(&self, _image: &DynamicImage, _threshold: f32) -> DetectResult<Vec<Detection>> {
        Err(DetectError::OutputShape(vec![1, 2]))
    }
}

/// Detector that blocks inside `predict` until the test releases it
#[derive(Debug)]
pub struct GatedDetector {
    pub calls: AtomicUsize,
    gate: Mutex<Receiver<()>>,
}

impl GatedDetector {
    pub fn new() -> (Arc<Self>, SyncSender<()>) {
        let (tx, rx) = sync_channel(1);
        (
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Mutex::new(rx),
            }),
            tx,
        )
    }
}

impl Detector for GatedDetector {
    fn predict(&self, _image: &DynamicImage, _threshold: f32) -> DetectResult<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.gate.lock().expect("gate lock").recv();
        Ok(Vec::new())
    }
}

/// Uniform dark test image
pub fn gray_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, BACKGROUND))
}

/// Creates a 100x100 test image on disk and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    let img = ImageBuffer::from_fn(100, 100, |_, _| BACKGROUND);
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// PNG bytes of a small test image, as a browser would upload them
pub fn test_png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    gray_image(100, 100)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("Failed to encode test image");
    buf
}

pub fn detection(class: DetectionClass, confidence: f32, bbox: (f32, f32, f32, f32)) -> Detection {
    Detection::new(class, confidence, BoundingBox::new(bbox.0, bbox.1, bbox.2, bbox.3))
}

/// The single toolbox at (10,10)-(50,50) used across tests
pub fn toolbox_073() -> Detection {
    detection(DetectionClass::ToolBox, 0.73, (10.0, 10.0, 50.0, 50.0))
}
