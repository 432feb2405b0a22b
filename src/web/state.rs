use std::sync::Arc;

use crate::detection::Detector;
use crate::render::Annotator;

/// Shared state for the axum handlers: one model, loaded once at startup.
#[derive(Clone)]
pub struct WebState {
    pub detector: Arc<dyn Detector>,
    pub annotator: Arc<Annotator>,
}

impl WebState {
    pub fn new(detector: Arc<dyn Detector>, annotator: Annotator) -> Self {
        Self {
            detector,
            annotator: Arc::new(annotator),
        }
    }
}
