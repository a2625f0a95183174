/// Page fetcher for the catalog service
///
/// The catalog answers `GET /images?count=N&ordering=MODE[&last_image=NAME]` with
/// either `{images: [...], total_count}` or `{error, code}`. Every kind of failure
/// (transport, status, error shape, undecodable body) becomes a `FetchError`.

use chrono::{DateTime, Utc};
use log::debug;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::data::{ImageDescriptor, Locator, Page, PageRequest};
use crate::error::FetchError;
use crate::BoxFuture;

/// Source of ordered pages of image descriptors
///
/// Implementations must not borrow from `self` in the returned future: the
/// slideshow hands it to its driver and keeps going.
pub trait PageFetcher {
    fn fetch_page(&self, request: PageRequest) -> BoxFuture<Result<Page, FetchError>>;
}

impl<T: PageFetcher + ?Sized> PageFetcher for Box<T> {
    fn fetch_page(&self, request: PageRequest) -> BoxFuture<Result<Page, FetchError>> {
        (**self).fetch_page(request)
    }
}

impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    fn fetch_page(&self, request: PageRequest) -> BoxFuture<Result<Page, FetchError>> {
        (**self).fetch_page(request)
    }
}

/// Fetches pages from the catalog service over HTTP
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    /// Service root, always ending in '/' so joins stay below it
    base: Url,
}

impl HttpPageFetcher {
    pub fn new(base: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base)
    }

    /// Share an existing client (connection pool) with the fetcher
    pub fn with_client(client: reqwest::Client, mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { client, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Build the request URL for one page
    pub fn page_url(&self, request: &PageRequest) -> Result<Url, FetchError> {
        let mut url = self
            .base
            .join("images")
            .map_err(|e| FetchError::Transport(format!("invalid catalog URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("count", &request.count.to_string());
            query.append_pair("ordering", request.ordering.as_str());
            if let Some(last_image) = &request.last_image {
                query.append_pair("last_image", last_image);
            }
        }

        Ok(url)
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch_page(&self, request: PageRequest) -> BoxFuture<Result<Page, FetchError>> {
        let client = self.client.clone();
        let base = self.base.clone();
        let url = self.page_url(&request);

        Box::pin(async move {
            let url = url?;
            debug!("🌐 GET {}", url);

            let response = client.get(url).send().await?;
            let status = response.status();
            let body = response.bytes().await?;

            decode_page(status, &body, &base)
        })
    }
}

/// Response body as sent by the catalog service
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Failure {
        error: String,
        #[serde(default)]
        code: i64,
    },
    Page {
        // The service sends `null` rather than `[]` past the end of an ordering
        images: Option<Vec<WireImage>>,
        total_count: usize,
    },
}

#[derive(Debug, Deserialize)]
struct WireImage {
    filename: String,
    data: Option<String>,
    url: Option<String>,
    file_path: Option<String>,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    size: u64,
    width: Option<u32>,
    height: Option<u32>,
    modified_date: DateTime<Utc>,
}

impl WireImage {
    fn into_descriptor(self, base: &Url) -> Result<ImageDescriptor, FetchError> {
        let locator = self.locator(base).ok_or_else(|| {
            FetchError::Malformed(format!("image {} has no payload locator", self.filename))
        })?;

        let mime_type = if self.mime_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            self.mime_type
        };

        Ok(ImageDescriptor {
            filename: self.filename,
            locator,
            mime_type,
            size: self.size,
            // Zero means "unknown" on the wire
            width: self.width.filter(|w| *w > 0),
            height: self.height.filter(|h| *h > 0),
            modified_date: self.modified_date,
        })
    }

    /// Embedded payload wins, then a URL (relative to the service), then a path
    fn locator(&self, base: &Url) -> Option<Locator> {
        if let Some(data) = non_empty(&self.data) {
            return Some(Locator::Embedded(data.to_string()));
        }

        if let Some(url) = non_empty(&self.url).and_then(|url| base.join(url).ok()) {
            return Some(Locator::Remote(url.to_string()));
        }

        non_empty(&self.file_path).map(|path| Locator::Local(PathBuf::from(path)))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Turn a raw HTTP answer into a page
pub fn decode_page(status: StatusCode, body: &[u8], base: &Url) -> Result<Page, FetchError> {
    if !status.is_success() {
        let message = match serde_json::from_slice::<WireResponse>(body) {
            Ok(WireResponse::Failure { error, .. }) => error,
            _ => status.canonical_reason().unwrap_or("request failed").to_string(),
        };
        return Err(FetchError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let response: WireResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    match response {
        WireResponse::Failure { error, code } => Err(FetchError::Api {
            code,
            message: error,
        }),
        WireResponse::Page {
            images,
            total_count,
        } => {
            let descriptors = images
                .unwrap_or_default()
                .into_iter()
                .map(|image| image.into_descriptor(base))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Page {
                descriptors,
                total_count,
            })
        }
    }
}
