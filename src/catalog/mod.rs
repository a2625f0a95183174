/// Catalog module
///
/// This module handles everything that comes from the catalog service:
/// - The client-side data model (data.rs)
/// - Page requests over HTTP and response decoding (fetcher.rs)

pub mod data;
pub mod fetcher;

pub use data::{ImageDescriptor, Locator, OrderingMode, Page, PageRequest};
pub use fetcher::{HttpPageFetcher, PageFetcher};
