/// Shared data structures for the application state
/// 
/// These structs represent the data model that flows between
/// the download pipeline and the record store.

use std::path::PathBuf;

/// One downloaded APOD image
///
/// Built once per run after the download and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// URL the image was retrieved from
    pub url: String,
    /// Where the image lives (or will live) on disk
    pub local_path: PathBuf,
    /// Size of the downloaded body in bytes
    pub size_bytes: u64,
    /// SHA-256 of the image bytes, hex encoded
    pub fingerprint: String,
}
