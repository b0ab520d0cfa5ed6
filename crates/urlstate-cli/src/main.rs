//! URL query-string state CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;
use urlstate_cli::commands::{run_decode, run_demo, run_encode, run_merge, run_replace};
use urlstate_cli::config::DemoConfig;
use urlstate_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;

use crate::cli::{Cli, Command, DemoArgs, LogFormatArg, LogLevelArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli.command) {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(command: Command) -> Result<String> {
    match command {
        Command::Encode { json } => run_encode(&json),
        Command::Decode { query } => run_decode(&query),
        Command::Merge { url, json } => run_merge(&url, &json),
        Command::Replace { json } => run_replace(&json),
        Command::Demo(args) => {
            let config = demo_config_from_args(&args)?;
            run_demo(config, &args.steps)
        }
    }
}

/// Config file first, then flags.
fn demo_config_from_args(args: &DemoArgs) -> Result<DemoConfig> {
    let mut config = match &args.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    if let Some(url) = &args.url {
        config.start_url.clone_from(url);
    }
    if let Some(debounce) = args.debounce {
        config.search_debounce_ms = debounce;
    }
    if let Some(history) = args.history {
        config.history = history.into();
    }
    Ok(config)
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
