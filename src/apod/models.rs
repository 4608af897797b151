use serde::Deserialize;
use serde_json::{Map, Value};

/// Metadata record returned by the APOD service for one date.
///
/// Only `url` is required. Keys without a typed field are kept in `extra`,
/// so nothing in the response is dropped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApodInfo {
    pub url: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub hdurl: Option<String>,
    /// "image" or "video"
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApodInfo {
    /// One-line description for the logs: title, date and credit when present
    pub fn summary(&self) -> String {
        let mut summary = self.title.clone().unwrap_or_else(|| "Untitled".to_string());
        if let Some(date) = &self.date {
            summary.push_str(&format!(" ({})", date));
        }
        if let Some(copyright) = &self.copyright {
            summary.push_str(&format!(", credit: {}", copyright.trim()));
        }
        summary
    }

    /// False only when the service says the entry is something other than an image.
    /// A missing media_type is treated as an image.
    pub fn is_image(&self) -> bool {
        self.media_type
            .as_deref()
            .map_or(true, |media_type| media_type.eq_ignore_ascii_case("image"))
    }
}
