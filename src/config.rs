/// Command line options
///
/// Arguments are parsed once into [`Options`] and handed to the pipeline.
/// Validation of the image directory and the date happens here, so a bad
/// invocation exits before any network call is made.

use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Default NASA APOD endpoint
pub const DEFAULT_API_URL: &str = "https://api.nasa.gov/planetary/apod";

/// Record store file created inside the image directory
pub const DB_FILE_NAME: &str = "apod_images.db";

/// Date format accepted on the command line and sent to the API
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Download NASA's Astronomy Picture of the Day and set it as the desktop background
#[derive(Parser, Debug, Clone)]
#[command(name = "apod-desktop")]
#[command(version, about, long_about = None)]
pub struct Options {
    /// Directory in which APOD images are stored
    #[arg(value_name = "IMAGE_DIR", value_parser = parse_image_dir)]
    pub image_dir: PathBuf,

    /// APOD date (format: YYYY-MM-DD), defaults to today
    #[arg(value_name = "APOD_DATE", value_parser = parse_apod_date)]
    pub date: Option<NaiveDate>,

    /// NASA API key
    #[arg(long, env = "NASA_API_KEY", default_value = "DEMO_KEY", hide_env_values = true)]
    pub api_key: String,

    /// APOD metadata endpoint
    #[arg(long, env = "APOD_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Download and record the image without touching the desktop background
    #[arg(long)]
    pub no_wallpaper: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Options {
    /// Path of the record store file
    pub fn db_path(&self) -> PathBuf {
        self.image_dir.join(DB_FILE_NAME)
    }

    /// The requested date, or today's local date if none was given
    pub fn resolved_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

fn parse_image_dir(value: &str) -> Result<PathBuf, String> {
    let path = Path::new(value);
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else {
        Err(format!("Non-existent directory {}", value))
    }
}

fn parse_apod_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| "Incorrect date format; should be YYYY-MM-DD".to_string())
}
