use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Model and rendering options shared by every front-end
#[derive(Debug, Clone, Args, Serialize)]
pub struct DetectorConfig {
    /// Path to the ONNX weights exported from the trained model
    #[arg(long, short, global = true, value_name = "FILE", default_value = "best.onnx")]
    pub weights: PathBuf,

    /// Square input size the model was exported with
    #[arg(long, global = true, default_value_t = 640)]
    pub input_size: u32,

    /// IoU above which overlapping boxes of the same class are suppressed
    #[arg(long, global = true, default_value_t = 0.7)]
    pub iou_threshold: f32,

    /// Upper bound on boxes kept per image
    #[arg(long, global = true, default_value_t = 300)]
    pub max_detections: usize,

    /// Threads used by the inference session
    #[arg(long, global = true, default_value_t = 4)]
    pub intra_threads: usize,

    /// TrueType font for labels (falls back to a system font)
    #[arg(long, global = true, value_name = "FILE")]
    pub font: Option<PathBuf>,
}

impl DetectorConfig {
    pub fn with_weights(weights: impl Into<PathBuf>) -> Self {
        Self {
            weights: weights.into(),
            ..Self::default()
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            weights: PathBuf::from("best.onnx"),
            input_size: 640,
            iou_threshold: 0.7,
            max_detections: 300,
            intra_threads: 4,
            font: None,
        }
    }
}
