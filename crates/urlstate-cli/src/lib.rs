//! Library components for the `urlstate` command-line tool.

pub mod commands;
pub mod config;
pub mod demo;
pub mod logging;
