//! Configuration lifecycle: load file config, merge CLI, resolve timeouts.

use std::path::PathBuf;

use anyhow::Result;

use crate::app::config_runtime::{self, CliValueSources, HttpTimeoutSettings};
use crate::app_config::load_default_file_config;
use crate::cli::Args;

/// Resolved configuration bundle used by the runtime.
pub(crate) struct ResolvedConfig {
    pub(crate) args: Args,
    pub(crate) http_timeouts: HttpTimeoutSettings,
    pub(crate) api_base_url: Option<String>,
    /// Config file that was read, if any.
    pub(crate) config_path: Option<PathBuf>,
}

/// Loads the file config and merges CLI overrides.
pub(crate) fn resolve_config(args: Args, cli_sources: &CliValueSources) -> Result<ResolvedConfig> {
    let loaded_config = load_default_file_config()?;
    let file_config = loaded_config.config.as_ref();
    let args = config_runtime::apply_config_defaults(args, cli_sources, file_config)?;
    let http_timeouts = config_runtime::resolve_http_timeouts(file_config);
    let api_base_url = file_config.and_then(|config| config.api_base_url.clone());
    let config_path = loaded_config.path.filter(|_| file_config.is_some());
    Ok(ResolvedConfig {
        args,
        http_timeouts,
        api_base_url,
        config_path,
    })
}
