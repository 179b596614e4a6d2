//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use imgur_downloader::DEFAULT_MAX_RETRIES;
use imgur_downloader::download::constants::{DEFAULT_CONCURRENCY, DEFAULT_RATE_LIMIT_MS};

/// Download Imgur albums into local folders.
///
/// Each album is written to its own folder, named after the album title, with
/// one file per image plus text files holding titles and descriptions. With
/// `--recursive`, albums linked from album or image descriptions are
/// downloaded as well.
#[derive(Parser, Debug)]
#[command(name = "imgur")]
#[command(author, version, about)]
pub struct Args {
    /// Album URL (e.g. https://imgur.com/a/Z0lda) or bare album id
    #[arg(value_name = "URL")]
    pub url: String,

    /// Directory that receives one folder per album
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    /// Follow album links found in album and image descriptions
    #[arg(long, overrides_with = "no_recursive")]
    pub recursive: bool,

    /// Download only the given album (default)
    #[arg(long = "no-recursive", overrides_with = "recursive")]
    pub no_recursive: bool,

    /// Prefix image file names with their position in the album
    #[arg(long, overrides_with = "not_ordered")]
    pub ordered: bool,

    /// Name image files by title only (default)
    #[arg(long = "not-ordered", overrides_with = "ordered")]
    pub not_ordered: bool,

    /// Deepest discovered album to download; the starting album is depth 0
    #[arg(long, value_name = "N")]
    pub max_depth: Option<u32>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum concurrent image downloads per album (1-32)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub concurrency: u8,

    /// Maximum retry attempts for transient failures (0-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// Minimum delay between requests to same domain in milliseconds (0 to disable, max 60000)
    #[arg(short = 'l', long, default_value_t = DEFAULT_RATE_LIMIT_MS, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub rate_limit: u64,

    /// Imgur application client id (register one at https://api.imgur.com/oauth2/addclient)
    #[arg(long, env = "IMGUR_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Whether recursive discovery is enabled after flag overrides.
    #[must_use]
    pub fn recursive_enabled(&self) -> bool {
        self.recursive && !self.no_recursive
    }

    /// Whether ordered naming is enabled after flag overrides.
    #[must_use]
    pub fn ordered_enabled(&self) -> bool {
        self.ordered && !self.not_ordered
    }
}
