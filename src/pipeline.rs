/// Download-dedup-persist pipeline
///
/// One run: fetch the APOD record for a date, download the image, fingerprint
/// it, save it only if the record store has not seen that fingerprint, then
/// set it as the desktop background. Every step happens in order, one after
/// the other.

use reqwest::Url;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::apod::ApodClient;
use crate::config::{Options, DATE_FORMAT};
use crate::error::{AppError, Result};
use crate::fingerprint::fingerprint;
use crate::state::data::ImageRecord;
use crate::state::library::ImageStore;
use crate::wallpaper::WallpaperSetter;

/// What a run did
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub record: ImageRecord,
    /// False when the fingerprint was already in the store and the write was skipped
    pub newly_saved: bool,
}

/// Run the whole pipeline once.
///
/// The store connection lives for the duration of this call and is closed on
/// every return path. A failure between writing the file and inserting the
/// row leaves the file on disk without a record.
pub async fn run(
    options: &Options,
    client: &ApodClient,
    wallpaper: &dyn WallpaperSetter,
) -> Result<RunOutcome> {
    let image_dir = &options.image_dir;
    let store = ImageStore::open(options.db_path())?;
    println!("Images directory: {}", image_dir.display());

    let date = options.resolved_date();
    println!("APOD date: {}", date.format(DATE_FORMAT));

    store.ensure_schema()?;
    debug!(
        "{} images recorded in {}",
        store.image_count()?,
        store.path().display()
    );

    let apod = client.fetch_info(date).await?;
    info!("{}", apod.summary());
    if let Some(hdurl) = &apod.hdurl {
        debug!("High resolution version: {}", hdurl);
    }
    if let Some(explanation) = &apod.explanation {
        debug!("{}", explanation);
    }
    if !apod.is_image() {
        return Err(AppError::UnsupportedMedia {
            media_type: apod.media_type.clone().unwrap_or_default(),
            url: apod.url,
        });
    }

    let image = client.download_image(&apod.url).await?;
    log_image_details(&image.bytes);

    let destination = image_path(&apod.url, image_dir)?;
    let fingerprint = fingerprint(&image.bytes);

    let (local_path, newly_saved) = if store.exists(&fingerprint)? {
        info!("This image has already been downloaded. Remove its entry from the database to redownload.");
        let local_path = existing_copy(&store, &fingerprint, destination, &image.bytes).await?;
        (local_path, false)
    } else {
        info!("Saving image");
        tokio::fs::write(&destination, &image.bytes).await?;
        store.insert(&destination.to_string_lossy(), image.size_bytes, &fingerprint)?;
        (destination, true)
    };

    let record = ImageRecord {
        url: apod.url,
        local_path,
        size_bytes: image.size_bytes,
        fingerprint,
    };
    print_apod_info(&record);

    // The wallpaper always points at a file that exists on disk
    wallpaper.set_wallpaper(&record.local_path)?;
    info!("Desktop background set to {}", record.local_path.display());

    Ok(RunOutcome { record, newly_saved })
}

/// Where an already-recorded image lives.
///
/// The same bytes may have been saved earlier under another file name, so the
/// recorded path wins over `destination`. If the recorded file is gone from
/// disk the bytes are written to `destination`; no row is added.
async fn existing_copy(
    store: &ImageStore,
    fingerprint: &str,
    destination: PathBuf,
    bytes: &[u8],
) -> Result<PathBuf> {
    if let Some(recorded) = store.path_for(fingerprint)? {
        let recorded = PathBuf::from(recorded);
        if tokio::fs::try_exists(&recorded).await? {
            return Ok(recorded);
        }
        warn!("Recorded copy {} is missing", recorded.display());
    }

    tokio::fs::write(&destination, bytes).await?;
    Ok(destination)
}

/// Local path for an image: the URL's last path segment inside `dir`.
pub fn image_path(image_url: &str, dir: &Path) -> Result<PathBuf> {
    let url = Url::parse(image_url).map_err(|_| AppError::InvalidImageUrl(image_url.to_string()))?;

    let file_name = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::InvalidImageUrl(image_url.to_string()))?;

    Ok(dir.join(file_name))
}

/// Retrieval details shown to the user
fn print_apod_info(record: &ImageRecord) {
    println!("Retrieving image from {}", record.url);
    println!("Image location: {}", record.local_path.display());
    println!("Image size: {} bytes", record.size_bytes);
    println!("Calculated SHA256 value: {}", record.fingerprint);
}

fn log_image_details(bytes: &[u8]) {
    match image::guess_format(bytes) {
        Ok(format) => debug!("Image format: {:?}", format),
        Err(_) => {
            warn!("Downloaded content is not a recognized image format");
            return;
        }
    }

    let dimensions = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());
    if let Some((width, height)) = dimensions {
        debug!("Image dimensions: {}x{}", width, height);
    }
}
