/// Catalog data model
///
/// These types describe the remote catalog as the client knows it. They flow
/// from the page fetcher into the slideshow controller and out to the viewer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::str::FromStr;

/// Where the bytes of an image can be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Base64 payload shipped inside the page itself
    Embedded(String),
    /// Absolute URL of the payload
    Remote(String),
    /// Path on a filesystem this process can read
    Local(PathBuf),
}

/// One catalog entry
///
/// Immutable once received. Equality and hashing only look at `filename`,
/// which is the stable identity key (and the pagination cursor).
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    /// Filename only (e.g., "IMG_0042.jpg")
    pub filename: String,
    /// How to resolve the payload
    pub locator: Locator,
    pub mime_type: String,
    /// Payload size in bytes as reported by the catalog
    pub size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub modified_date: DateTime<Utc>,
}

impl PartialEq for ImageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.filename == other.filename
    }
}

impl Eq for ImageDescriptor {}

impl Hash for ImageDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.filename.hash(state);
    }
}

/// Server-side total order over the catalog
///
/// Pagination cursors are only meaningful within one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    NameAsc,
    NameDesc,
    #[default]
    DateAsc,
    DateDesc,
    Random,
}

impl OrderingMode {
    pub const ALL: [OrderingMode; 5] = [
        OrderingMode::NameAsc,
        OrderingMode::NameDesc,
        OrderingMode::DateAsc,
        OrderingMode::DateDesc,
        OrderingMode::Random,
    ];

    /// Wire name, as used in the `ordering` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            OrderingMode::NameAsc => "name_asc",
            OrderingMode::NameDesc => "name_desc",
            OrderingMode::DateAsc => "date_asc",
            OrderingMode::DateDesc => "date_desc",
            OrderingMode::Random => "random",
        }
    }
}

impl fmt::Display for OrderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderingMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unknown ordering mode: {}", s))
    }
}

/// Parameters of a single page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub ordering: OrderingMode,
    /// Filename of the last descriptor already held; `None` asks for the first page
    pub last_image: Option<String>,
    pub count: usize,
}

/// One batch of descriptors plus the size of the whole ordering
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub descriptors: Vec<ImageDescriptor>,
    pub total_count: usize,
}
