use iced::widget::image::Handle;
use std::path::PathBuf;
use std::sync::Arc;

use crate::gui::widgets::Tone;
use crate::render::Annotator;
use crate::session::Session;

#[derive(Debug)]
pub struct AppState {
    pub session: Session,
    pub annotator: Arc<Annotator>,
    pub image_path: Option<PathBuf>,
    /// Picked image while scanning, then the annotated result
    pub display: Option<Handle>,
    pub info: Option<(String, Tone)>,
    pub clock: String,
}

impl AppState {
    pub fn new(annotator: Annotator) -> Self {
        Self {
            session: Session::new(),
            annotator: Arc::new(annotator),
            image_path: None,
            display: None,
            info: None,
            clock: String::new(),
        }
    }

    /// Preview a freshly picked image while it is being scanned
    pub fn show_picked(&mut self, path: PathBuf) {
        self.display = Some(Handle::from_path(&path));
        self.image_path = Some(path);

        let name = self.file_name();
        let loaded = match self.image_path.as_deref().map(image::image_dimensions) {
            Some(Ok((w, h))) => format!("Loaded: {} | Size: {}x{}", name, w, h),
            _ => format!("Loaded: {}", name),
        };
        self.info = Some((format!("{} | Scanning...", loaded), Tone::Neutral));
    }

    pub fn file_name(&self) -> String {
        self.image_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
