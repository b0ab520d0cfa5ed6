//! Subcommand implementations.
//!
//! Each command returns its output as a string; `main` prints it.

use anyhow::{Context, Result};
use urlstate_codec::{UrlState, Value, decode, encode};
use urlstate_sync::{MemoryLocation, merge_params, replace_params};

use crate::config::DemoConfig;
use crate::demo::{DemoAction, DemoSession};

/// Parse a JSON object argument into a state.
pub fn parse_state(json: &str) -> Result<UrlState> {
    let value: Value = serde_json::from_str(json).context("parse JSON state")?;
    UrlState::try_from(value).context("state must be a JSON object")
}

/// `encode <JSON>`
pub fn run_encode(json: &str) -> Result<String> {
    Ok(encode(&parse_state(json)?))
}

/// `decode <QUERY>`
pub fn run_decode(query: &str) -> Result<String> {
    serde_json::to_string_pretty(&decode(query)).context("serialize decoded state")
}

/// `merge --url <URL> <JSON>`
pub fn run_merge(url: &str, json: &str) -> Result<String> {
    let partial = parse_state(json)?;
    let location = MemoryLocation::new(url);
    Ok(merge_params(&location, &partial))
}

/// `replace <JSON>`
pub fn run_replace(json: &str) -> Result<String> {
    Ok(replace_params(&parse_state(json)?))
}

/// `demo STEP...`
pub fn run_demo(config: DemoConfig, steps: &[String]) -> Result<String> {
    let actions = steps
        .iter()
        .map(|step| step.parse::<DemoAction>())
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(steps = actions.len(), start_url = %config.start_url, "starting demo");

    let mut session = DemoSession::mount(config)?;
    let frames = session.run(&actions)?;
    Ok(frames
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}
