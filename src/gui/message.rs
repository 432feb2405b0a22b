use std::path::PathBuf;
use std::sync::Arc;

use crate::detection::{DetectionReport, Detector};

#[derive(Debug, Clone)]
pub enum Message {
    ModelLoaded(Result<Arc<dyn Detector>, String>),
    Browse,
    ImagePicked(Option<PathBuf>),
    DetectionFinished(Result<Arc<DetectionReport>, String>),
    Tick,
    DialogClosed,
}
