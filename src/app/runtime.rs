use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use imgur_downloader::{
    AlbumId, CrawlOptions, CrawlStats, Crawler, HttpClient, ImgurClient, ImgurClientConfig,
    RateLimiter, RetryPolicy, parse_album_input,
};

use crate::ProcessExit;
use crate::app::{config_manager, config_runtime, exit_handler, progress_manager, terminal};

/// Where to register an application and obtain a client id.
pub(crate) const CLIENT_REGISTRATION_URL: &str = "https://api.imgur.com/oauth2/addclient";

pub(crate) async fn run_downloader() -> Result<ProcessExit> {
    let (args, cli_sources) = config_runtime::parse_cli_with_sources();
    let resolved = config_manager::resolve_config(args, &cli_sources)?;
    let args = resolved.args;

    let default_level = config_runtime::resolve_default_log_level(&args);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    let no_color = terminal::is_no_color_requested(&args);
    terminal::init_tracing(default_level, force_cli_log_level, no_color);

    if let Some(path) = &resolved.config_path {
        debug!(path = %path.display(), "Loaded config file");
    }
    debug!(
        url = %args.url,
        destination = %args.destination.display(),
        recursive = args.recursive_enabled(),
        ordered = args.ordered_enabled(),
        max_depth = ?args.max_depth,
        concurrency = args.concurrency,
        max_retries = args.max_retries,
        rate_limit_ms = args.rate_limit,
        "CLI arguments resolved"
    );

    let root = resolve_root_album(&args.url)?;
    let client_id = require_client_id(args.client_id.as_deref())?;

    if !args.destination.exists() {
        std::fs::create_dir_all(&args.destination).with_context(|| {
            format!(
                "Failed to create destination directory '{}'",
                args.destination.display()
            )
        })?;
        info!(dir = %args.destination.display(), "Created destination directory");
    }

    let rate_limiter = if args.rate_limit == 0 {
        debug!("rate limiting disabled");
        Arc::new(RateLimiter::disabled())
    } else {
        debug!(rate_limit_ms = args.rate_limit, "rate limiting enabled");
        Arc::new(RateLimiter::new(Duration::from_millis(args.rate_limit)))
    };
    let retry_policy = RetryPolicy::from_retry_count(u32::from(args.max_retries));

    let mut api_config = ImgurClientConfig::new(client_id);
    api_config.connect_timeout_secs = resolved.http_timeouts.connect_secs;
    api_config.retry_policy = retry_policy.clone();
    if let Some(base_url) = resolved.api_base_url {
        api_config = api_config.with_base_url(base_url);
    }
    let source = ImgurClient::new(api_config, Arc::clone(&rate_limiter))
        .context("Failed to set up the Imgur API client")?;

    let client = HttpClient::with_timeouts(
        resolved.http_timeouts.connect_secs,
        resolved.http_timeouts.read_secs,
    )
    .context("Failed to set up the download HTTP client")?;

    let mut options = CrawlOptions::new(args.destination.clone());
    options.recursive = args.recursive_enabled();
    options.ordered = args.ordered_enabled();
    options.max_depth = args.max_depth;
    options.concurrency = usize::from(args.concurrency);

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_signal = Arc::clone(&interrupted);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupted_signal.store(true, Ordering::SeqCst);
        }
    });

    let crawler = Crawler::new(
        Arc::new(source),
        client,
        retry_policy,
        rate_limiter,
        options,
    )?
    .with_interrupt_flag(Arc::clone(&interrupted));

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let (progress_handle, progress_stop) =
        progress_manager::spawn_progress_ui(use_spinner, crawler.stats());

    info!(album = %root, recursive = args.recursive_enabled(), "Downloader starting");
    let stats = crawler.run(root).await;

    progress_stop.store(true, Ordering::SeqCst);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    info!(
        destination = %args.destination.display(),
        "{}",
        completion_summary_line(&stats)
    );

    if stats.was_interrupted() || interrupted.load(Ordering::SeqCst) {
        warn!(
            albums_completed = stats.albums_completed(),
            "Interrupted. Run again to download the rest."
        );
        return Ok(ProcessExit::Failure);
    }

    Ok(exit_handler::exit_outcome_for_stats(&stats))
}

fn resolve_root_album(input: &str) -> Result<AlbumId> {
    let Some(id) = parse_album_input(input) else {
        bail!(
            "'{input}' is not an Imgur album link.\n  \
             Expected something like https://imgur.com/a/Z0lda or a bare album id"
        );
    };
    Ok(id)
}

fn require_client_id(client_id: Option<&str>) -> Result<String> {
    match client_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => bail!(
            "No Imgur client id configured.\n  \
             Register an application at {CLIENT_REGISTRATION_URL}, then pass \
             --client-id, set IMGUR_CLIENT_ID, or add client_id to the config file"
        ),
    }
}

pub(crate) fn completion_summary_line(stats: &CrawlStats) -> String {
    let mut line = format!(
        "Downloaded {} images from {} albums",
        stats.images_downloaded(),
        stats.albums_completed()
    );
    if stats.images_failed() > 0 || stats.albums_failed() > 0 {
        line.push_str(&format!(
            " ({} images and {} albums failed)",
            stats.images_failed(),
            stats.albums_failed()
        ));
    }
    if stats.albums_skipped() > 0 {
        line.push_str(&format!(
            "; {} albums beyond the depth limit skipped",
            stats.albums_skipped()
        ));
    }
    if stats.retried() > 0 {
        line.push_str(&format!("; {} retries", stats.retried()));
    }
    line
}
