/// Payload preloading
///
/// The slideshow asks a `Preloader` to warm the descriptors just ahead of the
/// cursor. `PayloadPreloader` resolves the locator, decodes the image on a
/// blocking thread (downscaled like the editor's cache tiers) and keeps the RGBA
/// result in a `PayloadCache` the viewer reads from, so showing a warmed image
/// costs nothing.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::FilterType;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::catalog::{ImageDescriptor, Locator};
use crate::error::PreloadError;
use crate::BoxFuture;

/// Makes a descriptor's payload ready for display ahead of time
///
/// Never fails synchronously; the outcome is the future's output.
pub trait Preloader {
    fn warm(&self, descriptor: ImageDescriptor) -> BoxFuture<Result<(), PreloadError>>;
}

impl<T: Preloader + ?Sized> Preloader for Box<T> {
    fn warm(&self, descriptor: ImageDescriptor) -> BoxFuture<Result<(), PreloadError>> {
        (**self).warm(descriptor)
    }
}

impl<T: Preloader + ?Sized> Preloader for Arc<T> {
    fn warm(&self, descriptor: ImageDescriptor) -> BoxFuture<Result<(), PreloadError>> {
        (**self).warm(descriptor)
    }
}

/// Preloader that does nothing, for a slideshow without look-ahead
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPreloader;

impl Preloader for NoopPreloader {
    fn warm(&self, _descriptor: ImageDescriptor) -> BoxFuture<Result<(), PreloadError>> {
        Box::pin(async { Ok(()) })
    }
}

/// A decoded image, RGBA8, ready for the renderer
#[derive(Debug, Clone)]
pub struct Payload {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<Vec<u8>>,
}

/// Bounded, shared map from filename to decoded payload
///
/// Oldest insertions are evicted first once `capacity` is exceeded. `clear`
/// starts a new generation; payloads decoded for an older one are refused.
#[derive(Debug, Clone)]
pub struct PayloadCache {
    inner: Arc<Mutex<CacheInner>>,
}

#[derive(Debug)]
struct CacheInner {
    capacity: usize,
    generation: u64,
    entries: HashMap<String, Payload>,
    order: VecDeque<String>,
}

impl PayloadCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                capacity: capacity.max(1),
                generation: 0,
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        // A panicking decoder cannot leave the map half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, filename: &str) -> Option<Payload> {
        self.lock().entries.get(filename).cloned()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.lock().entries.contains_key(filename)
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn insert(&self, filename: String, payload: Payload) {
        let generation = self.generation();
        self.insert_for(generation, filename, payload);
    }

    /// Insert only if the cache has not been cleared since `generation`
    pub fn insert_for(&self, generation: u64, filename: String, payload: Payload) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            return false;
        }

        if inner.entries.insert(filename.clone(), payload).is_none() {
            inner.order.push_back(filename);
        }

        while inner.entries.len() > inner.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.entries.clear();
        inner.order.clear();
    }
}

/// Warms payloads into a `PayloadCache`
#[derive(Debug, Clone)]
pub struct PayloadPreloader {
    client: reqwest::Client,
    cache: PayloadCache,
    /// Longest edge kept after decoding
    max_edge: u32,
}

impl PayloadPreloader {
    pub fn new(client: reqwest::Client, cache: PayloadCache, max_edge: u32) -> Self {
        Self {
            client,
            cache,
            max_edge: max_edge.max(1),
        }
    }

    pub fn cache(&self) -> &PayloadCache {
        &self.cache
    }
}

impl Preloader for PayloadPreloader {
    fn warm(&self, descriptor: ImageDescriptor) -> BoxFuture<Result<(), PreloadError>> {
        let client = self.client.clone();
        let cache = self.cache.clone();
        let max_edge = self.max_edge;
        let generation = cache.generation();

        Box::pin(async move {
            if cache.contains(&descriptor.filename) {
                return Ok(());
            }

            let encoded = read_payload(&client, &descriptor.locator).await?;

            // Spawn blocking because decoding is CPU-intensive
            let payload = tokio::task::spawn_blocking(move || decode_payload(&encoded, max_edge))
                .await
                .map_err(|e| PreloadError::Decode(format!("Task join error: {}", e)))??;

            debug!(
                "🖼️  Warmed {} ({}x{})",
                descriptor.filename, payload.width, payload.height
            );
            if !cache.insert_for(generation, descriptor.filename.clone(), payload) {
                debug!("Cache cleared while warming {}, dropping it", descriptor.filename);
            }
            Ok(())
        })
    }
}

/// Fetch the still-encoded bytes behind a locator
async fn read_payload(client: &reqwest::Client, locator: &Locator) -> Result<Vec<u8>, PreloadError> {
    match locator {
        Locator::Embedded(data) => {
            // Tolerate data-URL form ("data:image/png;base64,....")
            let data = data.split_once("base64,").map_or(data.as_str(), |(_, b64)| b64);
            STANDARD
                .decode(data.trim())
                .map_err(|e| PreloadError::Decode(format!("bad base64 payload: {}", e)))
        }
        Locator::Remote(url) => {
            let transport = |e: reqwest::Error| PreloadError::Transport(e.to_string());
            let response = client
                .get(url.as_str())
                .send()
                .await
                .map_err(transport)?
                .error_for_status()
                .map_err(transport)?;
            let bytes = response.bytes().await.map_err(transport)?;
            Ok(bytes.to_vec())
        }
        Locator::Local(path) => tokio::fs::read(path)
            .await
            .map_err(|e| PreloadError::Read(format!("{}: {}", path.display(), e))),
    }
}

/// Decode and bound the size of one image
fn decode_payload(encoded: &[u8], max_edge: u32) -> Result<Payload, PreloadError> {
    let img = image::load_from_memory(encoded).map_err(|e| PreloadError::Decode(e.to_string()))?;

    // Resize maintaining aspect ratio
    let img = if img.width() > max_edge || img.height() > max_edge {
        img.resize(max_edge, max_edge, FilterType::Triangle)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    Ok(Payload {
        width: rgba.width(),
        height: rgba.height(),
        pixels: Arc::new(rgba.into_raw()),
    })
}
