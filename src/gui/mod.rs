mod app;
mod message;
mod state;
mod widgets;

pub use app::AstroGuardApp;
pub use message::Message;
pub use state::AppState;

use crate::config::DetectorConfig;

/// Open the desktop window and block until it is closed
pub fn run(config: DetectorConfig) -> iced::Result {
    iced::application(
        move || AstroGuardApp::new(config.clone()),
        AstroGuardApp::update,
        AstroGuardApp::view,
    )
    .title(AstroGuardApp::title)
    .theme(AstroGuardApp::theme)
    .subscription(AstroGuardApp::subscription)
    .window_size((1000.0, 800.0))
    .run()
}
