/// Slideshow controller
///
/// Owns the window of descriptors, the cursor, the pause flag, the advance timer
/// and the preload bookkeeping. It never awaits anything itself: every operation
/// returns the work it started (`Pending` futures) and whoever drives the
/// slideshow runs that work and feeds the resulting `Event` back into
/// `Slideshow::handle`. Between those calls the state is always consistent.
///
/// At most one page fetch is outstanding per window. Each fetch is tagged with the
/// ordering and window epoch it was issued for, so a page that arrives after the
/// window was reset is dropped on the floor.

use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::sync::watch;

use super::position::PositionStore;
use super::preload::Preloader;
use super::timer::Timer;
use super::window::{PreloadSet, Window};
use crate::catalog::{ImageDescriptor, OrderingMode, Page, PageFetcher, PageRequest};
use crate::config::Options;
use crate::error::{FetchError, PreloadError};
use crate::BoxFuture;

/// Lifecycle of the slideshow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, nothing requested yet
    Empty,
    /// Waiting for the first page of an ordering
    Loading,
    /// Window materialized (possibly empty if the catalog is)
    Ready,
    /// The first page could not be fetched
    Error(String),
}

/// Identifies the window a page fetch was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTag {
    pub ordering: OrderingMode,
    pub epoch: u64,
}

/// Identifies the window slot a warm was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmTag {
    pub epoch: u64,
    pub index: usize,
}

/// Something the slideshow was waiting for has happened
#[derive(Debug, Clone)]
pub enum Event {
    PageLoaded {
        tag: FetchTag,
        result: Result<Page, FetchError>,
    },
    Warmed {
        tag: WarmTag,
        result: Result<(), PreloadError>,
    },
    /// The advance timer fired
    Tick { generation: u64 },
}

/// Work started by the slideshow; run it and hand the event back
pub type Pending = BoxFuture<Event>;

/// Everything a renderer needs, published after every change
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub descriptor: Option<ImageDescriptor>,
    pub index: Option<usize>,
    pub total_count: usize,
    pub loaded_count: usize,
    pub ordering: OrderingMode,
    pub is_paused: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct Slideshow<F, P, S> {
    fetcher: F,
    preloader: P,
    store: S,
    options: Options,

    phase: Phase,
    ordering: OrderingMode,
    window: Window,
    preload: PreloadSet,
    cursor: usize,
    paused: bool,
    timer: Timer,
    /// Set by `shutdown`; the timer never starts again
    shut_down: bool,

    /// Bumped on every window reset
    epoch: u64,
    /// The one page fetch allowed in flight for the current epoch
    in_flight: Option<FetchTag>,
    /// Cursor an advance was issued from while it waits on a page
    pending_advance: Option<usize>,

    state: watch::Sender<Snapshot>,
}

impl<F, P, S> Slideshow<F, P, S>
where
    F: PageFetcher,
    P: Preloader,
    S: PositionStore,
{
    pub fn new(fetcher: F, preloader: P, store: S, options: Options) -> Self {
        let ordering = options.default_ordering;
        let (state, _) = watch::channel(Snapshot {
            ordering,
            ..Snapshot::default()
        });

        Self {
            fetcher,
            preloader,
            store,
            options,
            phase: Phase::Empty,
            ordering,
            window: Window::new(),
            preload: PreloadSet::new(),
            cursor: 0,
            paused: false,
            timer: Timer::new(),
            shut_down: false,
            epoch: 0,
            in_flight: None,
            pending_advance: None,
            state,
        }
    }

    // ========== Observation ==========

    /// Receive a new snapshot whenever the observable state changes
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        let descriptor = match self.phase {
            Phase::Ready => self.window.get(self.cursor).cloned(),
            _ => None,
        };

        Snapshot {
            index: descriptor.as_ref().map(|_| self.cursor),
            descriptor,
            total_count: self.window.total_count(),
            loaded_count: self.window.len(),
            ordering: self.ordering,
            is_paused: self.paused,
            is_loading: self.in_flight.is_some(),
            error: match &self.phase {
                Phase::Error(message) => Some(message.clone()),
                _ => None,
            },
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn ordering(&self) -> OrderingMode {
        self.ordering
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn preload_set(&self) -> &PreloadSet {
        &self.preload
    }

    /// Index of the displayed descriptor, if anything is displayed
    pub fn cursor(&self) -> Option<usize> {
        (self.phase == Phase::Ready && self.cursor < self.window.len()).then_some(self.cursor)
    }

    pub fn current(&self) -> Option<&ImageDescriptor> {
        self.cursor().and_then(|index| self.window.get(index))
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Generation and period of the running timer; the driver should deliver
    /// `Event::Tick { generation }` every `period` while this is `Some`
    pub fn ticker(&self) -> Option<(u64, Duration)> {
        self.timer
            .period()
            .map(|period| (self.timer.generation(), period))
    }

    // ========== Operations ==========

    /// Fetch the first page of the default ordering
    pub fn initialize(&mut self) -> Vec<Pending> {
        if self.phase != Phase::Empty {
            debug!("Slideshow already initialized, ignoring");
            return Vec::new();
        }

        info!("🎞️  Starting slideshow ({})", self.ordering);
        let jobs = self.reload();
        self.publish();
        jobs
    }

    /// Switch to another ordering, discarding the window
    pub fn set_ordering(&mut self, mode: OrderingMode) -> Vec<Pending> {
        if mode == self.ordering {
            return Vec::new();
        }

        info!("🔀 Ordering {} -> {}", self.ordering, mode);
        self.ordering = mode;
        let jobs = self.reload();
        self.publish();
        jobs
    }

    /// Discard the window and load the current ordering from scratch
    pub fn refresh(&mut self) -> Vec<Pending> {
        info!("🔄 Refreshing {}", self.ordering);
        let jobs = self.reload();
        self.publish();
        jobs
    }

    /// Show the next image, fetching the next page first when close to the end
    ///
    /// When that fetch is issued the cursor does not move yet: it moves once the
    /// page settles (through `handle`), unless something else moved it meanwhile.
    /// A non-empty result with an unchanged cursor is therefore a deferred move.
    pub fn advance(&mut self) -> Vec<Pending> {
        let jobs = self.step_forward();
        self.publish();
        jobs
    }

    /// Show the previous image, wrapping to the last loaded one
    ///
    /// Never fetches: when the ordering is only partly loaded, the wrap lands on
    /// the last descriptor held, not the true end of the ordering.
    pub fn retreat(&mut self) -> Vec<Pending> {
        if self.phase != Phase::Ready || self.window.is_empty() {
            return Vec::new();
        }

        let target = match self.cursor.checked_sub(1) {
            Some(prev) => prev,
            None => self.window.len() - 1,
        };
        let jobs = self.move_to(target);
        self.publish();
        jobs
    }

    /// Pause or resume automatic advancing
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;

        if self.paused {
            info!("⏸️  Paused");
            self.timer.stop();
        } else {
            info!("▶️  Resumed");
            self.start_timer();
        }
        self.publish();
    }

    /// Stop the advance timer for good
    ///
    /// Manual navigation keeps working; pages that land later and resuming from
    /// pause no longer restart the timer.
    pub fn shutdown(&mut self) {
        if self.timer.is_running() {
            info!("⏹️  Stopping slideshow timer");
        }
        self.shut_down = true;
        self.timer.stop();
        self.publish();
    }

    /// Feed back the outcome of pending work (or a timer tick)
    pub fn handle(&mut self, event: Event) -> Vec<Pending> {
        let jobs = match event {
            Event::PageLoaded { tag, result } => self.page_loaded(tag, result),
            Event::Warmed { tag, result } => {
                self.warmed(tag, result);
                Vec::new()
            }
            Event::Tick { generation } => self.tick(generation),
        };
        self.publish();
        jobs
    }

    // ========== Navigation ==========

    fn tick(&mut self, generation: u64) -> Vec<Pending> {
        if self.paused || !self.timer.accepts(generation) {
            debug!("Ignoring tick from timer generation {}", generation);
            return Vec::new();
        }
        self.step_forward()
    }

    fn step_forward(&mut self) -> Vec<Pending> {
        if self.phase != Phase::Ready || self.window.is_empty() {
            return Vec::new();
        }

        let next = self.cursor + 1;

        if self.should_fetch_more(next) {
            info!(
                "📥 Approaching end of window ({}/{}), fetching next page",
                next + 1,
                self.window.len()
            );
            let last_image = self.window.last().map(|d| d.filename.clone());
            self.pending_advance = Some(self.cursor);
            return vec![self.issue_fetch(last_image)];
        }

        if self.in_flight.is_some() {
            debug!("Page fetch already in flight, advancing on resident data");
        }
        self.resolve_advance(next)
    }

    fn should_fetch_more(&self, next: usize) -> bool {
        next.saturating_add(self.options.trigger_distance) >= self.window.len()
            && !self.window.is_complete()
            && self.in_flight.is_none()
    }

    fn resolve_advance(&mut self, next: usize) -> Vec<Pending> {
        if next < self.window.len() {
            self.move_to(next)
        } else if self.window.is_complete() {
            debug!("End of ordering, wrapping to the first image");
            self.move_to(0)
        } else {
            debug!("Next image not loaded yet, staying on {}", self.cursor);
            Vec::new()
        }
    }

    /// Settle the cursor on `index` (which must be inside the window)
    fn move_to(&mut self, index: usize) -> Vec<Pending> {
        self.cursor = index;
        self.pending_advance = None;
        self.remember_position();
        self.schedule_warms()
    }

    fn start_timer(&mut self) {
        if !self.shut_down && !self.paused && self.phase == Phase::Ready && !self.window.is_empty()
        {
            self.timer.start(self.options.slide_interval);
        }
    }

    // ========== Pagination ==========

    fn reload(&mut self) -> Vec<Pending> {
        self.epoch += 1;
        self.window.clear();
        self.preload.clear();
        self.cursor = 0;
        self.pending_advance = None;
        self.in_flight = None;
        self.timer.stop();
        self.phase = Phase::Loading;

        vec![self.issue_fetch(None)]
    }

    fn issue_fetch(&mut self, last_image: Option<String>) -> Pending {
        let tag = FetchTag {
            ordering: self.ordering,
            epoch: self.epoch,
        };
        self.in_flight = Some(tag);

        let fetch = self.fetcher.fetch_page(PageRequest {
            ordering: self.ordering,
            last_image,
            count: self.options.batch_size,
        });

        Box::pin(async move {
            Event::PageLoaded {
                tag,
                result: fetch.await,
            }
        })
    }

    fn page_loaded(&mut self, tag: FetchTag, result: Result<Page, FetchError>) -> Vec<Pending> {
        if tag.epoch != self.epoch || tag.ordering != self.ordering {
            debug!(
                "🗑️  Discarding stale page for {} (epoch {}, now {})",
                tag.ordering, tag.epoch, self.epoch
            );
            return Vec::new();
        }

        self.in_flight = None;

        match self.phase {
            Phase::Loading => self.first_page_loaded(result),
            Phase::Ready => self.next_page_loaded(result),
            Phase::Empty | Phase::Error(_) => Vec::new(),
        }
    }

    fn first_page_loaded(&mut self, result: Result<Page, FetchError>) -> Vec<Pending> {
        let page = match result {
            Ok(page) => page,
            Err(err) => {
                error!("❌ Failed to load images: {}", err);
                self.timer.stop();
                self.phase = Phase::Error(err.to_string());
                return Vec::new();
            }
        };

        self.window.replace(page);
        self.phase = Phase::Ready;
        info!(
            "✅ Loaded initial batch: {} of {} images",
            self.window.len(),
            self.window.total_count()
        );

        if self.window.is_empty() {
            return Vec::new();
        }

        let start = self.restore_position();
        self.start_timer();
        self.move_to(start)
    }

    fn next_page_loaded(&mut self, result: Result<Page, FetchError>) -> Vec<Pending> {
        let mut jobs = Vec::new();

        match result {
            Ok(page) => {
                let added = self.window.append(page);
                if added == 0 && !self.window.is_complete() {
                    warn!(
                        "⚠️  Next page added nothing new; treating {} images as the whole ordering",
                        self.window.len()
                    );
                    self.window.seal();
                }
                info!(
                    "📥 Loaded next batch: {} new images (have {}/{})",
                    added,
                    self.window.len(),
                    self.window.total_count()
                );
                jobs.extend(self.schedule_warms());
            }
            Err(err) => {
                warn!(
                    "⚠️  Failed to fetch next page, staying on {} resident images: {}",
                    self.window.len(),
                    err
                );
            }
        }

        // Only if nothing moved the cursor while the page was in flight
        if let Some(from) = self.pending_advance.take() {
            if from == self.cursor {
                jobs.extend(self.resolve_advance(from + 1));
            }
        }

        jobs
    }

    // ========== Preloading ==========

    /// Request warming for (cursor, cursor + K] where not already requested
    fn schedule_warms(&mut self) -> Vec<Pending> {
        if self.window.is_empty() {
            return Vec::new();
        }

        let last = self
            .cursor
            .saturating_add(self.options.lookahead)
            .min(self.window.len() - 1);
        let mut jobs: Vec<Pending> = Vec::new();

        for index in self.cursor + 1..=last {
            if self.preload.is_warmed(index) || !self.preload.request(index) {
                continue;
            }
            let Some(descriptor) = self.window.get(index).cloned() else {
                continue;
            };

            let tag = WarmTag {
                epoch: self.epoch,
                index,
            };
            let warm = self.preloader.warm(descriptor);
            jobs.push(Box::pin(async move {
                Event::Warmed {
                    tag,
                    result: warm.await,
                }
            }));
        }

        jobs
    }

    fn warmed(&mut self, tag: WarmTag, result: Result<(), PreloadError>) {
        if tag.epoch != self.epoch {
            return;
        }

        match result {
            Ok(()) => self.preload.mark_warmed(tag.index),
            Err(err) => {
                let name = self
                    .window
                    .get(tag.index)
                    .map_or("?", |d| d.filename.as_str());
                warn!("⚠️  Could not preload {}: {}", name, err);
            }
        }
    }

    // ========== Position ==========

    fn remember_position(&self) {
        let Some(descriptor) = self.window.get(self.cursor) else {
            return;
        };
        if let Err(err) = self.store.save(&descriptor.filename) {
            warn!("⚠️  Could not save position {}: {}", descriptor.filename, err);
        }
    }

    /// Index of the persisted last image in the fresh window, else 0
    fn restore_position(&self) -> usize {
        match self.store.load() {
            Ok(Some(filename)) => match self.window.position(&filename) {
                Some(index) => {
                    info!("📍 Restored position to {} (index {})", filename, index);
                    index
                }
                None => {
                    info!("📍 Last image {} not in this batch, starting from the first", filename);
                    0
                }
            },
            Ok(None) => 0,
            Err(err) => {
                warn!("⚠️  Could not load saved position: {}", err);
                0
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.state.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

impl<F, P, S> std::fmt::Debug for Slideshow<F, P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slideshow")
            .field("phase", &self.phase)
            .field("ordering", &self.ordering)
            .field("cursor", &self.cursor)
            .field("loaded", &self.window.len())
            .field("total", &self.window.total_count())
            .field("paused", &self.paused)
            .field("shut_down", &self.shut_down)
            .field("epoch", &self.epoch)
            .finish()
    }
}
