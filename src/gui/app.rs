use iced::widget::image::{Handle, Image};
use iced::widget::{button, column, container, row, text};
use iced::{Alignment::Center, ContentFit, Element, Length, Subscription, Task, Theme};
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageLevel};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::warn;

use super::widgets::{self, Tone};
use super::{AppState, Message};
use crate::config::DetectorConfig;
use crate::detection::yolo::YoloDetector;
use crate::render::Annotator;
use crate::session::{SessionError, SessionState};
use crate::worker;

const CLOCK_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second] UTC";

const PLACEHOLDER: &str = "AWAITING TARGET IMAGE FOR ANALYSIS\n\n\
    Upload an image to detect:\n\
    Fire Extinguishers\n\
    Tool Boxes\n\
    Oxygen Tanks";

pub struct AstroGuardApp {
    state: AppState,
}

impl AstroGuardApp {
    /// Build the window state and start loading the model in the background
    pub fn new(config: DetectorConfig) -> (Self, Task<Message>) {
        let annotator = Annotator::from_config(&config).unwrap_or_else(|e| {
            warn!("{}; using a system font instead", e);
            Annotator::with_system_font()
        });

        let mut state = AppState::new(annotator);
        state.session.begin_loading();
        state.clock = utc_clock();

        let reply = worker::spawn_load(move || Ok(YoloDetector::load(&config)?));
        (
            Self { state },
            Task::perform(reply, |r| Message::ModelLoaded(worker::settle(r))),
        )
    }

    pub fn title(&self) -> String {
        "AstroGuard Orbital Defense System".to_string()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn subscription(&self) -> Subscription<Message> {
        iced::time::every(Duration::from_secs(1)).map(|_| Message::Tick)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ModelLoaded(result) => {
                let failure = result.as_ref().err().cloned();
                self.state.session.model_loaded(result);
                match failure {
                    Some(e) => dialog(
                        MessageLevel::Error,
                        "Model Loading Error",
                        format!("Failed to load detection model:\n{}", e),
                    ),
                    None => Task::none(),
                }
            }
            Message::Browse => {
                if !self.state.session.can_detect() {
                    return self.reject(self.not_ready_reason());
                }
                Task::perform(
                    AsyncFileDialog::new()
                        .set_title("Select Target Image for Analysis")
                        .add_filter("Image files", &["png", "jpg", "jpeg", "bmp", "tif", "tiff"])
                        .add_filter("All files", &["*"])
                        .pick_file(),
                    |handle| Message::ImagePicked(handle.map(|h| h.path().to_path_buf())),
                )
            }
            Message::ImagePicked(None) => Task::none(),
            Message::ImagePicked(Some(path)) => match self.state.session.begin_detection() {
                Ok(detector) => {
                    self.state.show_picked(path.clone());
                    let reply =
                        worker::spawn_detection(detector, self.state.annotator.clone(), path);
                    Task::perform(reply, |r| {
                        Message::DetectionFinished(worker::settle(r).map(Arc::new))
                    })
                }
                Err(e) => self.reject(e),
            },
            Message::DetectionFinished(Ok(report)) => {
                self.state.session.finish_detection(Ok(report.as_ref()));
                let (w, h) = report.image.dimensions();
                let rgba = image::DynamicImage::ImageRgb8(report.image.clone()).into_rgba8();
                self.state.display = Some(Handle::from_rgba(w, h, rgba.into_raw()));
                let tone = if report.summary.is_empty() {
                    Tone::Warning
                } else {
                    Tone::Success
                };
                self.state.info = Some((report.summary.headline(), tone));
                Task::none()
            }
            Message::DetectionFinished(Err(e)) => {
                self.state.session.finish_detection(Err(e.clone()));
                self.state.info = Some((format!("DETECTION FAILED: {}", e), Tone::Danger));
                dialog(
                    MessageLevel::Error,
                    "Detection Error",
                    format!("Detection failed:\n{}", e),
                )
            }
            Message::Tick => {
                self.state.clock = utc_clock();
                Task::none()
            }
            Message::DialogClosed => Task::none(),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let session = &self.state.session;

        let header = column![
            text("ASTROGUARD ORBITAL DEFENSE SYSTEM").size(28),
            text("Advanced Space Station Object Detection & Classification")
                .size(14)
                .color(Tone::Neutral.color()),
        ]
        .spacing(5)
        .align_x(Center);

        let status_tone = match session.state() {
            SessionState::Idle | SessionState::Loading | SessionState::Detecting => Tone::Warning,
            SessionState::LoadFailed(_) => Tone::Danger,
            _ => Tone::Success,
        };
        let status = row![
            widgets::toned(session.status_line(), status_tone),
            container(widgets::toned(self.state.clock.as_str(), Tone::Neutral))
                .align_right(Length::Fill),
        ];

        // Stays clickable while loading so the user gets told to wait
        let scan_enabled =
            !session.is_busy() && !matches!(session.state(), SessionState::LoadFailed(_));
        let scan = button(text("INITIATE SCAN").size(18))
            .padding([10, 30])
            .on_press_maybe(scan_enabled.then_some(Message::Browse));

        let mut controls = column![scan].spacing(10).align_x(Center);
        if let Some((info, tone)) = &self.state.info {
            controls = controls.push(widgets::toned(info.as_str(), *tone));
        }

        let display: Element<'_, Message> = match &self.state.display {
            Some(handle) => Image::new(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => text(PLACEHOLDER)
                .size(16)
                .color(Tone::Neutral.color())
                .into(),
        };

        column![
            header,
            widgets::panel(status),
            widgets::panel(container(controls).center_x(Length::Fill)),
            widgets::viewport(display),
        ]
        .spacing(10)
        .padding(20)
        .into()
    }

    fn not_ready_reason(&self) -> SessionError {
        if self.state.session.is_busy() {
            SessionError::Busy
        } else {
            SessionError::NotReady
        }
    }

    fn reject(&self, reason: SessionError) -> Task<Message> {
        match reason {
            SessionError::NotReady => dialog(
                MessageLevel::Warning,
                "System Not Ready",
                "Detection systems are still initializing. Please wait...".to_string(),
            ),
            SessionError::Busy => dialog(
                MessageLevel::Info,
                "Detection In Progress",
                "Please wait for current detection to complete.".to_string(),
            ),
        }
    }
}

fn dialog(level: MessageLevel, title: &str, description: String) -> Task<Message> {
    Task::perform(
        AsyncMessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(description)
            .show(),
        |_| Message::DialogClosed,
    )
}

fn utc_clock() -> String {
    let Ok(format) = time::format_description::parse(CLOCK_FORMAT) else {
        return String::new();
    };
    OffsetDateTime::now_utc().format(&format).unwrap_or_default()
}
