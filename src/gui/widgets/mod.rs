use iced::{
    Color, Element, Length, Theme, border,
    widget::{container, container::Style, text},
};
use iced_widget::container::bordered_box;

pub const BG_PRIMARY: Color = Color::from_rgb(0.039, 0.039, 0.102);
pub const BG_SECONDARY: Color = Color::from_rgb(0.102, 0.102, 0.180);
pub const ACCENT: Color = Color::from_rgb(0.227, 0.227, 0.361);

/// Colour of a status or info line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Success,
    Warning,
    Danger,
}

impl Tone {
    pub fn color(self) -> Color {
        match self {
            Tone::Neutral => Color::from_rgb8(0xb0, 0xb0, 0xd0),
            Tone::Success => Color::from_rgb8(0x00, 0xff, 0x88),
            Tone::Warning => Color::from_rgb8(0xff, 0xaa, 0x00),
            Tone::Danger => Color::from_rgb8(0xff, 0x44, 0x44),
        }
    }
}

fn panel_style(background: Color) -> impl Fn(&Theme) -> Style {
    move |theme: &Theme| {
        bordered_box(theme)
            .border(border::width(2).color(ACCENT))
            .background(background)
    }
}

/// Bordered full-width box used for each section of the window
pub fn panel<'a, Message>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message>
where
    Message: 'a,
{
    container(content)
        .padding(10)
        .width(Length::Fill)
        .style(panel_style(BG_SECONDARY))
        .into()
}

/// Panel that grows to fill the remaining height, for the image
pub fn viewport<'a, Message>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message>
where
    Message: 'a,
{
    container(content)
        .padding(10)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(panel_style(BG_PRIMARY))
        .into()
}

pub fn toned<'a, Message>(content: impl text::IntoFragment<'a>, tone: Tone) -> Element<'a, Message>
where
    Message: 'a,
{
    text(content).size(14).color(tone.color()).into()
}
