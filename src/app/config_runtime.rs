use anyhow::{Result, bail};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};

use imgur_downloader::download::constants::{
    CONNECT_TIMEOUT_SECS, MAX_CONCURRENCY, READ_TIMEOUT_SECS,
};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Args;

/// Which options were given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) recursive: bool,
    pub(crate) ordered: bool,
    pub(crate) concurrency: bool,
    pub(crate) rate_limit: bool,
    pub(crate) max_retries: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct HttpTimeoutSettings {
    pub(crate) connect_secs: u64,
    pub(crate) read_secs: u64,
}

impl Default for HttpTimeoutSettings {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            read_secs: READ_TIMEOUT_SECS,
        }
    }
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let command = Args::command();
    let matches = command.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = sources_from_matches(&matches);
    (args, sources)
}

fn sources_from_matches(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        recursive: is_commandline_value(matches, "recursive")
            || is_commandline_value(matches, "no_recursive"),
        ordered: is_commandline_value(matches, "ordered")
            || is_commandline_value(matches, "not_ordered"),
        concurrency: is_commandline_value(matches, "concurrency"),
        rate_limit: is_commandline_value(matches, "rate_limit"),
        max_retries: is_commandline_value(matches, "max_retries"),
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Fills options not given on the command line from the config file.
pub(crate) fn apply_config_defaults(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Result<Args> {
    if let Some(file_config) = file_config {
        if args.client_id.is_none()
            && let Some(client_id) = &file_config.client_id
        {
            args.client_id = Some(client_id.clone());
        }

        if !cli_sources.recursive
            && let Some(recursive) = file_config.recursive
        {
            args.recursive = recursive;
            args.no_recursive = !recursive;
        }

        if !cli_sources.ordered
            && let Some(ordered) = file_config.ordered
        {
            args.ordered = ordered;
            args.not_ordered = !ordered;
        }

        if args.max_depth.is_none() {
            args.max_depth = file_config.max_depth;
        }

        if !cli_sources.concurrency
            && let Some(concurrency) = file_config.concurrency
        {
            args.concurrency = concurrency;
        }

        if !cli_sources.rate_limit
            && let Some(rate_limit) = file_config.rate_limit
        {
            args.rate_limit = rate_limit;
        }

        if !cli_sources.max_retries
            && let Some(max_retries) = file_config.max_retries
        {
            args.max_retries = max_retries;
        }

        if !cli_sources.verbose
            && !cli_sources.quiet
            && let Some(verbosity) = file_config.verbosity
        {
            apply_config_verbosity(&mut args, verbosity);
        }
    }

    if !(1..=MAX_CONCURRENCY).contains(&usize::from(args.concurrency)) {
        bail!(
            "Invalid effective concurrency value: {}. Expected range: 1..={MAX_CONCURRENCY}",
            args.concurrency
        );
    }
    if args.rate_limit > 60_000 {
        bail!(
            "Invalid effective rate_limit value: {}. Expected range: 0..=60000",
            args.rate_limit
        );
    }

    Ok(args)
}

fn apply_config_verbosity(args: &mut Args, verbosity: VerbositySetting) {
    match verbosity {
        VerbositySetting::Default => {
            args.quiet = false;
            args.verbose = 0;
        }
        VerbositySetting::Verbose => {
            args.quiet = false;
            args.verbose = 1;
        }
        VerbositySetting::Quiet => {
            args.quiet = true;
            args.verbose = 0;
        }
        VerbositySetting::Debug => {
            args.quiet = false;
            args.verbose = 2;
        }
    }
}

pub(crate) fn resolve_http_timeouts(file_config: Option<&FileConfig>) -> HttpTimeoutSettings {
    let mut settings = HttpTimeoutSettings::default();
    let Some(file_config) = file_config else {
        return settings;
    };

    if let Some(value) = file_config.connect_timeout_secs {
        settings.connect_secs = value;
    }
    if let Some(value) = file_config.read_timeout_secs {
        settings.read_secs = value;
    }
    settings
}

pub(crate) fn resolve_default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_with_sources(extra: &[&str]) -> (Args, CliValueSources) {
        let mut argv = vec!["imgur"];
        argv.extend_from_slice(extra);
        argv.extend_from_slice(&["Z0lda", "out"]);
        let matches = Args::command().get_matches_from(argv);
        let args = Args::from_arg_matches(&matches).expect("args should parse");
        (args, sources_from_matches(&matches))
    }

    #[test]
    fn test_sources_track_command_line_values() {
        let (_, sources) = parse_with_sources(&["--no-recursive", "-c", "2", "-q"]);
        assert!(sources.recursive);
        assert!(sources.concurrency);
        assert!(sources.quiet);
        assert!(!sources.ordered);
        assert!(!sources.rate_limit);
        assert!(!sources.verbose);
    }

    #[test]
    fn test_config_fills_unset_options() {
        let (args, sources) = parse_with_sources(&[]);
        let config = FileConfig {
            client_id: Some("from-file".to_string()),
            recursive: Some(true),
            ordered: Some(true),
            max_depth: Some(2),
            concurrency: Some(8),
            rate_limit: Some(0),
            max_retries: Some(1),
            verbosity: Some(VerbositySetting::Debug),
            ..FileConfig::default()
        };

        let args = apply_config_defaults(args, &sources, Some(&config)).expect("valid config");

        assert!(args.recursive_enabled());
        assert!(args.ordered_enabled());
        assert_eq!(args.max_depth, Some(2));
        assert_eq!(args.concurrency, 8);
        assert_eq!(args.rate_limit, 0);
        assert_eq!(args.max_retries, 1);
        assert_eq!(args.verbose, 2);
        assert_eq!(resolve_default_log_level(&args), "trace");
    }

    #[test]
    fn test_command_line_overrides_config() {
        let (args, sources) = parse_with_sources(&[
            "--no-recursive",
            "--client-id",
            "from-cli",
            "--max-depth",
            "0",
            "-c",
            "3",
            "-v",
        ]);
        let config = FileConfig {
            client_id: Some("from-file".to_string()),
            recursive: Some(true),
            max_depth: Some(5),
            concurrency: Some(8),
            verbosity: Some(VerbositySetting::Quiet),
            ..FileConfig::default()
        };

        let args = apply_config_defaults(args, &sources, Some(&config)).expect("valid config");

        assert_eq!(args.client_id.as_deref(), Some("from-cli"));
        assert!(!args.recursive_enabled());
        assert_eq!(args.max_depth, Some(0));
        assert_eq!(args.concurrency, 3);
        assert!(!args.quiet);
        assert_eq!(resolve_default_log_level(&args), "debug");
        assert!(should_force_cli_log_level(&sources));
    }

    #[test]
    fn test_config_false_turns_flag_off() {
        let (args, sources) = parse_with_sources(&[]);
        let config = FileConfig {
            ordered: Some(false),
            ..FileConfig::default()
        };
        let args = apply_config_defaults(args, &sources, Some(&config)).expect("valid config");
        assert!(!args.ordered_enabled());
    }

    #[test]
    fn test_no_config_keeps_cli_defaults() {
        let (args, sources) = parse_with_sources(&[]);
        let args = apply_config_defaults(args, &sources, None).expect("defaults are valid");
        assert_eq!(args.concurrency, 4);
        assert_eq!(args.rate_limit, 200);
        assert_eq!(resolve_default_log_level(&args), "info");
        assert!(!should_force_cli_log_level(&sources));
    }

    #[test]
    fn test_resolve_http_timeouts() {
        let defaults = resolve_http_timeouts(None);
        assert_eq!(defaults.connect_secs, 30);
        assert_eq!(defaults.read_secs, 300);

        let config = FileConfig {
            connect_timeout_secs: Some(5),
            ..FileConfig::default()
        };
        let resolved = resolve_http_timeouts(Some(&config));
        assert_eq!(resolved.connect_secs, 5);
        assert_eq!(resolved.read_secs, 300);
    }

    #[test]
    fn test_quiet_log_level() {
        let (args, _) = parse_with_sources(&["-q"]);
        assert_eq!(resolve_default_log_level(&args), "error");
    }
}
