use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod apod;
mod config;
mod error;
mod fingerprint;
mod pipeline;
mod state;
mod wallpaper;

#[cfg(test)]
mod testing;

use apod::ApodClient;
use config::Options;
use wallpaper::{NoopWallpaper, WallpaperSetter};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Invalid arguments exit here, before anything touches the network
    let options = Options::parse();
    init_tracing(options.verbose);

    let http = match reqwest::Client::builder().user_agent(USER_AGENT).build() {
        Ok(http) => http,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let client = ApodClient::new(http, &options.api_url, &options.api_key);

    let wallpaper: Box<dyn WallpaperSetter> = if options.no_wallpaper {
        Box::new(NoopWallpaper)
    } else {
        wallpaper::platform_setter()
    };

    match pipeline::run(&options, &client, wallpaper.as_ref()).await {
        Ok(outcome) => {
            if outcome.newly_saved {
                info!("Saved new image to {}", outcome.record.local_path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr. RUST_LOG wins over --verbose when set.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
