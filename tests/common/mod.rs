mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from astroguard for tests
pub use astroguard::{
    Annotator, BoundingBox, Detection, DetectionClass, DetectionReport, DetectionSummary,
    Detector, Session, SessionError, SessionState,
};
