/// Viewer UI
///
/// This module draws the slideshow snapshot with iced:
/// - Ordering, navigation and refresh buttons (controls.rs)
/// - The current image, its caption and the status banners (slide.rs)
///
/// Every button and key maps to exactly one slideshow operation.

pub mod controls;
pub mod slide;

use iced::keyboard::{self, key, Key};

use crate::catalog::OrderingMode;
use crate::error::PreloadError;
use crate::slideshow::Event;

/// Viewer messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Outcome of work the slideshow started, or a timer tick
    Slideshow(Event),
    Next,
    Previous,
    TogglePause,
    SetOrdering(OrderingMode),
    Refresh,
    /// On-demand load of the displayed image finished
    Displayed(String, Result<(), PreloadError>),
    /// Stop the slideshow and close the window
    Exit,
}

/// Key bindings, for `keyboard::on_key_press`
pub fn key_binding(key: Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key.as_ref() {
        Key::Named(key::Named::Space) => Some(Message::TogglePause),
        Key::Named(key::Named::ArrowRight) => Some(Message::Next),
        Key::Named(key::Named::ArrowLeft) => Some(Message::Previous),
        Key::Named(key::Named::Escape) => Some(Message::Exit),
        Key::Character("r") | Key::Character("R") => Some(Message::Refresh),
        _ => None,
    }
}
