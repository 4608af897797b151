use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::models::ApodInfo;
use crate::config::DATE_FORMAT;
use crate::error::{AppError, Result};

/// Raw body of a successful image download
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub bytes: Vec<u8>,
    pub size_bytes: u64,
}

/// Client for the APOD metadata endpoint and the image URLs it hands out
pub struct ApodClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ApodClient {
    /// Create an ApodClient with a reqwest Client.
    pub fn new(client: Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Get the APOD metadata for one date
    ///
    /// GET {api_url}?api_key=...&date=YYYY-MM-DD
    pub async fn fetch_info(&self, date: NaiveDate) -> Result<ApodInfo> {
        let date = date.format(DATE_FORMAT).to_string();
        debug!("Requesting APOD info for {}", date);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("api_key", self.api_key.as_str()), ("date", date.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Download the image at `url`. Anything but 200 OK is an error.
    pub async fn download_image(&self, url: &str) -> Result<DownloadedImage> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?.to_vec();
        let size_bytes = bytes.len() as u64;
        debug!("Downloaded {} bytes from {}", size_bytes, url);

        Ok(DownloadedImage { bytes, size_bytes })
    }
}
