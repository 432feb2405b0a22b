pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod web;
pub mod worker;

pub use config::DetectorConfig;
pub use detection::{
    CONFIDENCE_THRESHOLD, DetectionReport, DetectionSummary, Detector, run_detection,
};
pub use error::{DetectError, DetectResult};
pub use models::{BoundingBox, Detection, DetectionClass};
pub use render::Annotator;
pub use session::{Session, SessionError, SessionState};

#[cfg(feature = "gui")]
pub mod gui;
