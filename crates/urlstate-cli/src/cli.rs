//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use urlstate_sync::HistoryMode;

#[derive(Parser)]
#[command(
    name = "urlstate",
    version,
    about = "Encode, decode and simulate URL query-string state",
    long_about = "Work with component state stored in the URL query string.\n\n\
                  Encodes and decodes nested state, builds merged or replaced\n\
                  query strings, and replays scripted demo sessions against an\n\
                  in-memory browser history."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -vvv for trace).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the canonical query string for a JSON object.
    Encode {
        #[arg(value_name = "JSON")]
        json: String,
    },

    /// Print a query string decoded as JSON.
    Decode {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Merge a JSON object into a URL's query and print the result.
    Merge {
        /// URL whose query is merged into.
        #[arg(long, value_name = "URL", default_value = "/")]
        url: String,

        #[arg(value_name = "JSON")]
        json: String,
    },

    /// Print the query string for a JSON object, ignoring any current query.
    Replace {
        #[arg(value_name = "JSON")]
        json: String,
    },

    /// Replay a scripted session of the search-box demo page.
    Demo(DemoArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// TOML file with session settings.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Starting address (overrides the config file).
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Debounce for typing, in milliseconds (overrides the config file).
    #[arg(long, value_name = "MS")]
    pub debounce: Option<u64>,

    /// How committed states land in the history (overrides the config file).
    #[arg(long, value_enum)]
    pub history: Option<HistoryArg>,

    /// Steps: type=<text>, set=<key>=<value>, reset, wait=<ms>, back, forward, visit=<url>.
    #[arg(value_name = "STEP", required = true)]
    pub steps: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum HistoryArg {
    Push,
    Replace,
}

impl From<HistoryArg> for HistoryMode {
    fn from(arg: HistoryArg) -> Self {
        match arg {
            HistoryArg::Push => HistoryMode::Push,
            HistoryArg::Replace => HistoryMode::Replace,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
