/// Error types for the photo frame
///
/// Only `FetchError` can change controller state (and only during a fresh load).
/// Preload and persistence failures are warnings: they are logged where they
/// happen and the slideshow carries on.
///
/// The controller-facing errors are `Clone` because they travel inside
/// controller events and UI messages.

use thiserror::Error;

/// A page request to the catalog service failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response (connection refused, DNS, reset...)
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered with its `{error, code}` shape
    #[error("{message} (code {code})")]
    Api { code: i64, message: String },

    /// The body could not be understood as a page
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// A single image could not be warmed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreloadError {
    #[error("failed to download payload: {0}")]
    Transport(String),

    #[error("failed to read payload: {0}")]
    Read(String),

    #[error("failed to decode payload: {0}")]
    Decode(String),
}

/// The last-viewed position could not be saved or loaded
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("position database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("position store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine user data directory")]
    NoDataDir,
}

/// The settings file exists but cannot be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages() {
        let status = FetchError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(status.to_string(), "HTTP 503: Service Unavailable");

        let api = FetchError::Api {
            code: 400,
            message: "invalid ordering parameter".to_string(),
        };
        assert_eq!(api.to_string(), "invalid ordering parameter (code 400)");
    }
}
