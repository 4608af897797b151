/// NASA APOD service access
///
/// This module handles:
/// - Fetching the metadata record for a given date
/// - Downloading the image it points at

pub mod client;
pub mod models;

pub use client::ApodClient;
