//! Fetch command - download one installer into the cache.

use std::path::PathBuf;

use clap::Args;

use multipy::fetch::{Fetcher, HttpDownloader};

use super::common::{load_config, resolve_path};
use crate::error::CliError;
use crate::output;

/// Arguments for the fetch command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Installer package URL
    pub url: String,

    /// Expected SHA-256 of the package; enables cache reuse
    #[arg(long)]
    pub sha256: Option<String>,

    /// Download cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Configuration file (default: ~/.multipy/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the fetch command.
pub fn run(args: FetchArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let cache_dir = resolve_path(args.cache_dir, &config.provision.cache_dir);

    let bar = output::download_bar();
    let fetcher = Fetcher::new(HttpDownloader::new()?, cache_dir)
        .with_progress(output::byte_progress(bar.clone()));

    let outcome = fetcher.fetch(&args.url, args.sha256.as_deref())?;
    bar.finish_and_clear();

    if outcome.cache_hit {
        println!("Using cached {}", outcome.path.display());
    } else {
        println!(
            "Downloaded {} ({} bytes)",
            outcome.path.display(),
            outcome.bytes_downloaded
        );
    }
    Ok(())
}
