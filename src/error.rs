use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("weights file not found: {}", .0.display())]
    WeightsNotFound(PathBuf),
    #[error("failed to load model from {}: {source}", .path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ort::Error,
    },
    #[error("inference failed: {0}")]
    Ort(#[from] ort::Error),
    #[error("unexpected model output shape {0:?}")]
    OutputShape(Vec<usize>),
    #[error("failed to read image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unsupported image format (expected PNG, JPEG, BMP or TIFF)")]
    UnsupportedFormat,
    #[error("failed to load font: {0}")]
    Font(String),
}

pub type DetectResult<T> = Result<T, DetectError>;
