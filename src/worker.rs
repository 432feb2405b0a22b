//! Background jobs for UI front-ends.
//!
//! Each job runs on its own OS thread and reports back over a oneshot channel.
//! The receiver is a future, so a UI can hand it to its own event loop (e.g.
//! `iced::Task::perform`) and the blocking model call never touches the UI thread.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::detection::{self, DetectionReport, Detector};
use crate::render::Annotator;

pub type LoadResult = Result<Arc<dyn Detector>, String>;
pub type DetectionResult = Result<DetectionReport, String>;

fn spawn_job<T, F>(name: &str, job: F) -> oneshot::Receiver<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name(format!("astroguard-{}", name))
        .spawn(move || {
            // Receiver gone means the UI was closed
            let _ = tx.send(job());
        });
    if let Err(e) = spawned {
        // Dropping the sender resolves the receiver with an error
        error!("Failed to spawn {} worker: {}", name, e);
    }
    rx
}

/// Load a model off the UI thread
pub fn spawn_load<F, D>(loader: F) -> oneshot::Receiver<LoadResult>
where
    F: FnOnce() -> anyhow::Result<D> + Send + 'static,
    D: Detector + 'static,
{
    spawn_job("load", move || {
        loader()
            .map(|d| Arc::new(d) as Arc<dyn Detector>)
            .map_err(|e| format!("{:#}", e))
    })
}

/// Decode `path`, run detection and draw the result off the UI thread
pub fn spawn_detection(
    detector: Arc<dyn Detector>,
    annotator: Arc<Annotator>,
    path: PathBuf,
) -> oneshot::Receiver<DetectionResult> {
    spawn_job("detect", move || {
        debug!("Detecting objects in {}", path.display());
        let image = detection::open_image(&path).map_err(|e| e.to_string())?;
        detection::run_detection(detector.as_ref(), &annotator, &image).map_err(|e| e.to_string())
    })
}

/// Flatten a worker reply, treating a vanished worker as a failure
pub fn settle<T>(reply: Result<Result<T, String>, oneshot::error::RecvError>) -> Result<T, String> {
    reply.unwrap_or_else(|_| Err("worker stopped before reporting a result".to_string()))
}
