/// The slide area: current image, caption and status banners
use iced::widget::image::Handle;
use iced::widget::{column, container, image, text, Column};
use iced::{Alignment, Color, ContentFit, Element, Length};

use super::Message;
use crate::slideshow::Snapshot;

/// What the slide area can show for the image under the cursor
#[derive(Debug, Clone)]
pub enum Display {
    /// Decoded and ready
    Image(Handle),
    /// Still loading
    Pending,
    /// Could not be loaded
    Failed,
}

/// "filename · 3 of 25", with a note while more of the ordering is unknown
pub fn caption(snapshot: &Snapshot) -> Option<String> {
    let descriptor = snapshot.descriptor.as_ref()?;
    let index = snapshot.index?;

    let mut caption = format!(
        "{} · {} of {}",
        descriptor.filename,
        index + 1,
        snapshot.total_count
    );
    if snapshot.is_paused {
        caption.push_str(" (paused)");
    }
    Some(caption)
}

/// Banner text for a slideshow with nothing to display
pub fn banner(snapshot: &Snapshot) -> Option<String> {
    if let Some(error) = &snapshot.error {
        return Some(format!("❌ Failed to load images: {}", error));
    }
    if snapshot.descriptor.is_some() {
        return None;
    }
    if snapshot.is_loading {
        Some("Loading images...".to_string())
    } else {
        Some("No images found.".to_string())
    }
}

pub fn view<'a>(snapshot: &Snapshot, display: Display) -> Element<'a, Message> {
    if let Some(banner) = banner(snapshot) {
        let color = if snapshot.error.is_some() {
            Color::from_rgb(0.9, 0.4, 0.4)
        } else {
            Color::from_rgb(0.7, 0.7, 0.7)
        };
        return container(text(banner).size(20).color(color))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    }

    let picture: Element<'a, Message> = match display {
        Display::Image(handle) => image(handle)
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        Display::Pending => centered(text("Loading image...").size(16)),
        Display::Failed => centered(
            text("⚠️ This image could not be displayed")
                .size(16)
                .color(Color::from_rgb(0.9, 0.6, 0.3)),
        ),
    };

    let mut content: Column<'a, Message> = column![picture]
        .spacing(10)
        .align_x(Alignment::Center);
    if let Some(caption) = caption(snapshot) {
        content = content.push(text(caption).size(14));
    }
    if snapshot.is_loading {
        content = content.push(text("Fetching more images...").size(12));
    }

    content.width(Length::Fill).height(Length::Fill).into()
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
