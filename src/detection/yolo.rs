use image::{DynamicImage, GenericImageView};
use ndarray::{ArrayView2, Axis};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::Detector;
use super::nms::non_max_suppression;
use super::preprocessing::{self, Letterbox};
use crate::config::DetectorConfig;
use crate::error::{DetectError, DetectResult};
use crate::models::{BoundingBox, Detection, DetectionClass};

/// YOLOv8-style detector running an ONNX export of the trained weights
pub struct YoloDetector {
    session: Mutex<Session>,
    input_size: u32,
    iou_threshold: f32,
    max_detections: usize,
}

impl fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_size", &self.input_size)
            .field("iou_threshold", &self.iou_threshold)
            .field("max_detections", &self.max_detections)
            .finish()
    }
}

impl YoloDetector {
    /// Load weights from `config.weights`. A missing or corrupt file is an error, never a panic.
    pub fn load(config: &DetectorConfig) -> DetectResult<Self> {
        let path = &config.weights;
        if !path.is_file() {
            return Err(DetectError::WeightsNotFound(path.clone()));
        }

        info!("Loading model weights from {}", path.display());
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(config.intra_threads))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|source| DetectError::ModelLoad {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            session: Mutex::new(session),
            input_size: config.input_size,
            iou_threshold: config.iou_threshold,
            max_detections: config.max_detections,
        })
    }

    fn run_session(&self, input: Vec<f32>) -> DetectResult<(Vec<usize>, Vec<f32>)> {
        let size = self.input_size as usize;
        let tensor = Tensor::from_array(([1usize, 3, size, size], input))?;

        let mut session = self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let outputs = session.run(ort::inputs![tensor])?;
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims = shape.iter().map(|&d| d.max(0) as usize).collect();
        Ok((dims, data.to_vec()))
    }
}

impl Detector for YoloDetector {
    fn predict(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> DetectResult<Vec<Detection>> {
        let (width, height) = image.dimensions();
        let (canvas, fit) = preprocessing::letterbox(image, self.input_size);
        let (dims, data) = self.run_session(preprocessing::to_nchw(&canvas))?;

        // [batch, 4 + classes, candidates]
        if dims.len() != 3 || dims[0] < 1 || dims[1] < 5 {
            return Err(DetectError::OutputShape(dims));
        }
        let (rows, candidates) = (dims[1], dims[2]);
        if data.len() < rows * candidates {
            return Err(DetectError::OutputShape(dims));
        }
        let view = ArrayView2::from_shape((rows, candidates), &data[..rows * candidates])
            .map_err(|_| DetectError::OutputShape(dims.clone()))?;

        let raw = decode_predictions(view, &fit, width, height, confidence_threshold);
        debug!("{} candidates above threshold before NMS", raw.len());
        Ok(non_max_suppression(raw, self.iou_threshold, self.max_detections))
    }
}

/// Turn one image's `[4 + classes, candidates]` output into detections in source pixels
pub fn decode_predictions(
    output: ArrayView2<'_, f32>,
    fit: &Letterbox,
    width: u32,
    height: u32,
    confidence_threshold: f32,
) -> Vec<Detection> {
    let mut detections = Vec::new();

    for candidate in output.axis_iter(Axis(1)) {
        let Some((class_id, score)) = candidate
            .iter()
            .skip(4)
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };
        if score < confidence_threshold {
            continue;
        }
        let Some(class) = DetectionClass::from_id(class_id) else {
            warn!("Ignoring detection with unknown class id {}", class_id);
            continue;
        };

        let bbox = BoundingBox::from_center(candidate[0], candidate[1], candidate[2], candidate[3]);
        let bbox = fit.unmap(bbox).clamp(width, height);
        detections.push(Detection::new(class, score, bbox));
    }

    detections
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn output(candidates: &[[f32; 7]]) -> Array2<f32> {
        let mut out = Array2::<f32>::zeros((7, candidates.len()));
        for (i, c) in candidates.iter().enumerate() {
            for (row, v) in c.iter().enumerate() {
                out[[row, i]] = *v;
            }
        }
        out
    }

    #[test]
    fn decodes_best_class_and_unmaps_box() {
        let fit = Letterbox::fit(640, 640, 640);
        let out = output(&[[30.0, 30.0, 40.0, 40.0, 0.1, 0.73, 0.2]]);

        let dets = decode_predictions(out.view(), &fit, 640, 640, 0.5);

        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].class, DetectionClass::ToolBox);
        assert_eq!(dets[0].confidence, 0.73);
        assert_eq!(dets[0].bbox, BoundingBox::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn drops_candidates_below_threshold() {
        let fit = Letterbox::fit(640, 640, 640);
        let out = output(&[
            [30.0, 30.0, 40.0, 40.0, 0.49, 0.0, 0.0],
            [100.0, 100.0, 20.0, 20.0, 0.0, 0.0, 0.5],
        ]);

        let dets = decode_predictions(out.view(), &fit, 640, 640, 0.5);

        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].class, DetectionClass::OxygenTank);
    }

    #[test]
    fn boxes_are_clamped_to_source_image() {
        let fit = Letterbox::fit(320, 320, 640);
        let out = output(&[[630.0, 10.0, 40.0, 40.0, 0.9, 0.0, 0.0]]);

        let dets = decode_predictions(out.view(), &fit, 320, 320, 0.5);

        assert_eq!(dets[0].bbox, BoundingBox::new(305.0, 0.0, 320.0, 15.0));
    }

    #[test]
    fn missing_weights_is_an_error() {
        let config = DetectorConfig::with_weights("/definitely/not/here/best.onnx");
        let err = YoloDetector::load(&config).unwrap_err();
        assert!(matches!(err, DetectError::WeightsNotFound(_)));
    }

    #[test]
    fn corrupt_weights_is_a_load_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("corrupt.onnx");
        std::fs::write(&path, b"this is not an onnx graph").unwrap();

        let err = YoloDetector::load(&DetectorConfig::with_weights(&path)).unwrap_err();

        match err {
            DetectError::ModelLoad { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("expected ModelLoad, got {:?}", other),
        }
    }
}
