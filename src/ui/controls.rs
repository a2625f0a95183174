use iced::widget::{button, row, text, Row};
use iced::{Alignment, Element};

use super::Message;
use crate::catalog::OrderingMode;
use crate::slideshow::Snapshot;

/// Button label for an ordering
pub fn ordering_label(mode: OrderingMode) -> &'static str {
    match mode {
        OrderingMode::DateAsc => "Oldest first",
        OrderingMode::DateDesc => "Newest first",
        OrderingMode::NameAsc => "Name A-Z",
        OrderingMode::NameDesc => "Name Z-A",
        OrderingMode::Random => "Shuffle",
    }
}

pub fn pause_label(is_paused: bool) -> &'static str {
    if is_paused {
        "▶ Play"
    } else {
        "⏸ Pause"
    }
}

/// Ordering buttons; the active one is highlighted and inert
fn orderings<'a>(current: OrderingMode) -> Row<'a, Message> {
    OrderingMode::ALL
        .iter()
        .fold(row![].spacing(6), |row, &mode| {
            let selected = mode == current;
            let choice = button(text(ordering_label(mode)).size(14))
                .padding([6, 10])
                .style(if selected {
                    button::primary
                } else {
                    button::secondary
                })
                .on_press_maybe((!selected).then_some(Message::SetOrdering(mode)));
            row.push(choice)
        })
}

/// Navigation row: previous, pause/play, next and refresh
fn navigation<'a>(snapshot: &Snapshot) -> Row<'a, Message> {
    let has_image = snapshot.descriptor.is_some();

    row![
        button(text("◀").size(16))
            .padding([6, 12])
            .on_press_maybe(has_image.then_some(Message::Previous)),
        button(text(pause_label(snapshot.is_paused)).size(14))
            .padding([6, 12])
            .on_press(Message::TogglePause),
        button(text("▶").size(16))
            .padding([6, 12])
            .on_press_maybe(has_image.then_some(Message::Next)),
        button(text("⟳ Refresh").size(14))
            .padding([6, 12])
            .style(button::secondary)
            .on_press(Message::Refresh),
    ]
    .spacing(6)
}

/// The toolbar shown above the slide
pub fn toolbar<'a>(snapshot: &Snapshot) -> Element<'a, Message> {
    row![orderings(snapshot.ordering), navigation(snapshot)]
        .spacing(24)
        .align_y(Alignment::Center)
        .into()
}
