/// Slideshow module
///
/// This module holds the paginated navigation and prefetch controller:
/// - The local window of the catalog ordering (window.rs)
/// - The owned advance timer handle (timer.rs)
/// - The controller state machine itself (controller.rs)
/// - Payload preloading and its cache (preload.rs)
/// - The persisted last-viewed position (position.rs)

pub mod controller;
pub mod position;
pub mod preload;
pub mod timer;
pub mod window;


pub use controller::{Event, FetchTag, Pending, Phase, Slideshow, Snapshot, WarmTag};
pub use position::{MemoryPositionStore, PositionStore, SqlitePositionStore};
pub use preload::{NoopPreloader, Payload, PayloadCache, PayloadPreloader, Preloader};
pub use timer::Timer;
pub use window::{PreloadSet, Window};
