use iced::widget::image::Handle;
use iced::widget::{column, container};
use iced::{keyboard, time, Element, Length, Subscription, Task, Theme};
use log::{error, info, warn};
use tokio::sync::watch;

use photo_frame::catalog::HttpPageFetcher;
use photo_frame::config::Settings;
use photo_frame::error::ConfigError;
use photo_frame::slideshow::{
    Event, MemoryPositionStore, PayloadCache, PayloadPreloader, Pending, PositionStore, Preloader,
    Slideshow, Snapshot, SqlitePositionStore,
};
use photo_frame::ui::{self, slide::Display, Message};

type Show = Slideshow<HttpPageFetcher, PayloadPreloader, Box<dyn PositionStore>>;

/// Main application state
struct PhotoFrame {
    slideshow: Show,
    /// Published slideshow state
    updates: watch::Receiver<Snapshot>,
    /// Last snapshot taken from `updates`, drawn by `view`
    current: Snapshot,
    /// Shares its payload cache with the slideshow's preloader
    preloader: PayloadPreloader,
    /// Decoded texture of the image on screen
    shown: Option<(String, Handle)>,
    /// Image loaded on demand because it was not warmed in time
    requested: Option<String>,
    /// Image whose on-demand load failed
    failed: Option<String>,
}

impl PhotoFrame {
    /// Wire up the catalog client, preloader and position store
    fn new(settings: &Settings) -> Result<Self, ConfigError> {
        let client = reqwest::Client::new();
        let fetcher = HttpPageFetcher::with_client(client.clone(), settings.api_url()?);
        info!("🌐 Catalog service at {}", fetcher.base());

        let cache = PayloadCache::new(settings.cache_capacity);
        let preloader = PayloadPreloader::new(client, cache, settings.preload_max_edge);

        // Without a durable store the position only lives for this session
        let store: Box<dyn PositionStore> = match SqlitePositionStore::open_default() {
            Ok(store) => Box::new(store),
            Err(err) => {
                warn!("⚠️  {}; the last image will not be remembered", err);
                Box::new(MemoryPositionStore::new())
            }
        };

        let slideshow = Slideshow::new(fetcher, preloader.clone(), store, settings.options());
        let updates = slideshow.subscribe();
        let current = updates.borrow().clone();

        Ok(Self {
            slideshow,
            current,
            updates,
            preloader,
            shown: None,
            requested: None,
            failed: None,
        })
    }

    /// Initial task: fetch the first page
    fn start(mut self) -> (Self, Task<Message>) {
        let jobs = self.slideshow.initialize();
        let task = perform(jobs);
        (self, task)
    }

    fn title(&self) -> String {
        match &self.current.descriptor {
            Some(descriptor) => format!("Photo Frame - {}", descriptor.filename),
            None => "Photo Frame".to_string(),
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let jobs = match message {
            Message::Slideshow(event) => self.slideshow.handle(event),
            Message::Next => self.slideshow.advance(),
            Message::Previous => self.slideshow.retreat(),
            Message::TogglePause => {
                self.slideshow.toggle_pause();
                Vec::new()
            }
            Message::SetOrdering(mode) => self.slideshow.set_ordering(mode),
            Message::Refresh => {
                self.preloader.cache().clear();
                self.shown = None;
                self.requested = None;
                self.failed = None;
                self.slideshow.refresh()
            }
            Message::Displayed(filename, result) => {
                if let Err(err) = result {
                    warn!("⚠️  Could not display {}: {}", filename, err);
                    self.failed = Some(filename);
                }
                Vec::new()
            }
            Message::Exit => {
                self.slideshow.shutdown();
                info!("👋 Closing photo frame");
                return iced::exit();
            }
        };

        Task::batch([perform(jobs), self.sync_display()])
    }

    /// Take the latest snapshot and make sure its image is on its way to the screen
    fn sync_display(&mut self) -> Task<Message> {
        self.current = self.updates.borrow_and_update().clone();

        let Some(descriptor) = self.current.descriptor.clone() else {
            self.shown = None;
            return Task::none();
        };

        if self.is_shown(&descriptor.filename) {
            return Task::none();
        }

        if let Some(payload) = self.preloader.cache().get(&descriptor.filename) {
            let handle = Handle::from_rgba(payload.width, payload.height, payload.pixels.to_vec());
            self.shown = Some((descriptor.filename, handle));
            return Task::none();
        }

        if self.requested.as_deref() == Some(descriptor.filename.as_str()) {
            return Task::none();
        }

        // Not warmed in time; load it now
        let filename = descriptor.filename.clone();
        self.requested = Some(filename.clone());
        self.failed = None;
        Task::perform(self.preloader.warm(descriptor), move |result| {
            Message::Displayed(filename.clone(), result)
        })
    }

    fn is_shown(&self, filename: &str) -> bool {
        self.shown.as_ref().is_some_and(|(name, _)| name == filename)
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let display = match (&self.current.descriptor, &self.shown) {
            (Some(descriptor), Some((name, handle))) if *name == descriptor.filename => {
                Display::Image(handle.clone())
            }
            (Some(descriptor), _) if self.failed.as_deref() == Some(descriptor.filename.as_str()) => {
                Display::Failed
            }
            _ => Display::Pending,
        };

        let content = column![
            ui::controls::toolbar(&self.current),
            ui::slide::view(&self.current, display),
        ]
        .spacing(16)
        .padding(20);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Keyboard shortcuts, plus the advance timer while it runs
    fn subscription(&self) -> Subscription<Message> {
        let keys = keyboard::on_key_press(ui::key_binding);

        match self.slideshow.ticker() {
            // Keyed by generation so a restarted timer replaces the old one
            Some((generation, period)) => Subscription::batch([
                keys,
                time::every(period)
                    .with(generation)
                    .map(|(generation, _)| Message::Slideshow(Event::Tick { generation })),
            ]),
            None => keys,
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Hand the slideshow's pending work to the iced runtime
fn perform(jobs: Vec<Pending>) -> Task<Message> {
    Task::batch(
        jobs.into_iter()
            .map(|job| Task::perform(job, Message::Slideshow)),
    )
}

fn load_settings() -> Settings {
    match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            warn!("⚠️  {}; using default settings", err);
            Settings::default()
        }
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = load_settings();
    let frame = match PhotoFrame::new(&settings) {
        Ok(frame) => frame,
        Err(err) => {
            error!("❌ Cannot start photo frame: {}", err);
            std::process::exit(1);
        }
    };

    iced::application(PhotoFrame::title, PhotoFrame::update, PhotoFrame::view)
        .subscription(PhotoFrame::subscription)
        .theme(PhotoFrame::theme)
        .centered()
        .run_with(move || frame.start())
}
