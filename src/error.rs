/// Error types for the APOD pipeline
use thiserror::Error;

/// Everything that can stop a run
#[derive(Debug, Error)]
pub enum AppError {
    /// The metadata service answered with a non-success status
    #[error("APOD service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The image URL answered with anything other than 200 OK
    #[error("Failed to download {url}: HTTP {status}")]
    Download { url: String, status: u16 },

    /// The APOD entry for the date is not a still image (e.g. a video)
    #[error("APOD entry is a {media_type}, not an image: {url}")]
    UnsupportedMedia { media_type: String, url: String },

    /// The image URL has no file name to save under
    #[error("Cannot derive a file name from image URL: {0}")]
    InvalidImageUrl(String),

    /// Setting the desktop background failed
    #[error("Failed to set desktop background: {0}")]
    Wallpaper(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid APOD response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, AppError>;
