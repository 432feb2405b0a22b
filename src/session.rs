use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::detection::{DetectionReport, DetectionSummary, Detector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("detection systems are still initializing")]
    NotReady,
    #[error("a detection is already in progress")]
    Busy,
}

/// Where a front-end is in the idle -> loading -> ready -> detecting -> done/error cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Detecting,
    Done(DetectionSummary),
    DetectionFailed(String),
    LoadFailed(String),
}

/// Model handle plus the single in-flight guard a UI needs
#[derive(Debug)]
pub struct Session {
    detector: Option<Arc<dyn Detector>>,
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            detector: None,
            state: SessionState::Idle,
        }
    }

    /// Session that already holds a loaded model
    pub fn with_detector(detector: Arc<dyn Detector>) -> Self {
        Self {
            detector: Some(detector),
            state: SessionState::Ready,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn begin_loading(&mut self) {
        self.detector = None;
        self.state = SessionState::Loading;
    }

    pub fn model_loaded(&mut self, result: Result<Arc<dyn Detector>, String>) {
        match result {
            Ok(detector) => {
                info!("Detection systems online");
                self.detector = Some(detector);
                self.state = SessionState::Ready;
            }
            Err(e) => {
                warn!("Model loading failed: {}", e);
                self.detector = None;
                self.state = SessionState::LoadFailed(e);
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SessionState::Detecting)
    }

    /// Whether the detect action should be enabled
    pub fn can_detect(&self) -> bool {
        self.detector.is_some() && !self.is_busy()
    }

    /// Claim the in-flight slot. Rejected while loading or while another detection runs.
    pub fn begin_detection(&mut self) -> Result<Arc<dyn Detector>, SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        let detector = self.detector.clone().ok_or(SessionError::NotReady)?;
        self.state = SessionState::Detecting;
        Ok(detector)
    }

    /// Release the in-flight slot with the outcome of the detection
    pub fn finish_detection(&mut self, result: Result<&DetectionReport, String>) {
        if !self.is_busy() {
            warn!("Detection finished without being started");
        }
        self.state = match result {
            Ok(report) => SessionState::Done(report.summary.clone()),
            Err(e) => SessionState::DetectionFailed(e),
        };
    }

    pub fn status_line(&self) -> String {
        match &self.state {
            SessionState::Idle | SessionState::Loading => {
                "INITIALIZING DETECTION SYSTEMS...".to_string()
            }
            SessionState::Ready => "DETECTION SYSTEMS ONLINE".to_string(),
            SessionState::Detecting => "SCANNING TARGET...".to_string(),
            SessionState::Done(summary) => summary.headline(),
            SessionState::DetectionFailed(e) => format!("DETECTION FAILED: {}", e),
            SessionState::LoadFailed(e) => format!("SYSTEM ERROR: {}", e),
        }
    }
}
