//! Optional config file supplying defaults for CLI options.
//!
//! `config.toml` is read when present. Otherwise an older `settings.conf`
//! holding just `clientid = <id>` under `[downloader]` is still honoured.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use imgur_downloader::download::constants::MAX_CONCURRENCY;

/// Section header accepted (and ignored) at the top of the config file.
const SECTION_HEADER: &str = "[downloader]";

const CONFIG_DIR_NAME: &str = "imgurdownloader";
const CONFIG_FILE_NAME: &str = "config.toml";
const LEGACY_CONFIG_FILE_NAME: &str = "settings.conf";

/// Defaults read from `config.toml`; every field is optional.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Imgur application client id.
    pub client_id: Option<String>,
    /// Follow album links in descriptions.
    pub recursive: Option<bool>,
    /// Prefix image names with their position.
    pub ordered: Option<bool>,
    /// Deepest discovered album to download.
    pub max_depth: Option<u32>,
    /// Image downloads in flight per album (same range as CLI).
    pub concurrency: Option<u8>,
    /// Per-domain rate limit in milliseconds.
    pub rate_limit: Option<u64>,
    /// Retry attempts for transient failures.
    pub max_retries: Option<u8>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Image download read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Imgur API base URL (mirrors, tests).
    pub api_base_url: Option<String>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(client_id) = &self.client_id
            && client_id.trim().is_empty()
        {
            bail!("Invalid config value for `client_id`: must not be empty");
        }

        if let Some(concurrency) = self.concurrency
            && !(1..=MAX_CONCURRENCY).contains(&usize::from(concurrency))
        {
            bail!(
                "Invalid config value for `concurrency`: {concurrency}. Expected range: 1..={MAX_CONCURRENCY}"
            );
        }

        if let Some(rate_limit) = self.rate_limit
            && rate_limit > 60_000
        {
            bail!("Invalid config value for `rate_limit`: {rate_limit}. Expected range: 0..=60000");
        }

        if let Some(max_retries) = self.max_retries
            && max_retries > 10
        {
            bail!("Invalid config value for `max_retries`: {max_retries}. Expected range: 0..=10");
        }

        if let Some(base_url) = &self.api_base_url
            && !(base_url.starts_with("http://") || base_url.starts_with("https://"))
        {
            bail!(
                "Invalid config value for `api_base_url`: '{base_url}'. Expected an http(s) URL"
            );
        }

        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;

        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known, whether or not it exists.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves the config directory.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/imgurdownloader`
/// 2. `$HOME/.config/imgurdownloader`
#[must_use]
pub fn resolve_config_dir() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(CONFIG_DIR_NAME));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join(CONFIG_DIR_NAME))
}

/// Resolves the default config file: `config.toml`, or `settings.conf` when
/// only that one exists.
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    let dir = resolve_config_dir()?;
    let primary = dir.join(CONFIG_FILE_NAME);
    let legacy = dir.join(LEGACY_CONFIG_FILE_NAME);
    if !primary.is_file() && legacy.is_file() {
        Some(legacy)
    } else {
        Some(primary)
    }
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present. A missing file is not an error.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.is_file() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() || line == SECTION_HEADER {
            continue;
        }
        if line.starts_with('[') {
            bail!("Unknown configuration section '{line}' on line {line_no}");
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "client_id" | "clientid" => {
                cfg.client_id = parse_client_id(value).with_context(invalid)?;
            }
            "recursive" => cfg.recursive = Some(parse_boolean(value).with_context(invalid)?),
            "ordered" => cfg.ordered = Some(parse_boolean(value).with_context(invalid)?),
            "max_depth" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                let depth = u32::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("max_depth out of range for u32"))
                    .with_context(invalid)?;
                cfg.max_depth = Some(depth);
            }
            "concurrency" => cfg.concurrency = Some(parse_integer_u8(value).with_context(invalid)?),
            "rate_limit" => cfg.rate_limit = Some(parse_integer_u64(value).with_context(invalid)?),
            "max_retries" => cfg.max_retries = Some(parse_integer_u8(value).with_context(invalid)?),
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "api_base_url" => {
                cfg.api_base_url = Some(parse_string_literal(value).with_context(invalid)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

/// Client ids may be quoted or bare; a bare empty value leaves the id unset.
fn parse_client_id(raw_value: &str) -> Result<Option<String>> {
    if raw_value.starts_with('"') {
        return parse_string_literal(raw_value).map(Some);
    }
    if raw_value.is_empty() {
        return Ok(None);
    }
    Ok(Some(raw_value.to_string()))
}

fn parse_integer_u8(raw_value: &str) -> Result<u8> {
    let value = parse_integer_u64(raw_value)?;
    u8::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u8"))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}
