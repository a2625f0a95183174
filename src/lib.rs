//! Photo frame: a slideshow over a remote image catalog that is too large to
//! load in one request.
//!
//! - `catalog` talks to the catalog service (pages of image descriptors)
//! - `slideshow` owns the navigation window, prefetching, preloading and the
//!   persisted position
//! - `config` holds user settings
//! - `ui` draws the current state with iced

use std::future::Future;
use std::pin::Pin;

pub mod catalog;
pub mod config;
pub mod error;
pub mod slideshow;
pub mod ui;

/// Owned, sendable future handed from the slideshow to whatever runtime drives it
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;
