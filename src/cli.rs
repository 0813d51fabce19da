// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every flag can also come from a URL_CHECKER_* environment variable (clap's
// `env` feature) or from the YAML config file. Flags are Options here so that
// config.rs can tell "not given" apart from "given with the default value" and
// apply the precedence: flag > env > config file > default.
// =============================================================================

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Default)]
#[command(
    name = "url-checker",
    version,
    about = "A concurrent URL checker CLI",
    long_about = "url-checker checks the status of many URLs concurrently, with retries, \
                  rate limiting and a global timeout. Exit code 0 means every URL answered 2xx."
)]
pub struct Cli {
    /// Path to the file containing URLs, one per line
    #[arg(short, long, env = "URL_CHECKER_FILE")]
    pub file: Option<PathBuf>,

    /// Number of concurrent workers [default: 5]
    #[arg(short, long, env = "URL_CHECKER_CONCURRENCY", allow_negative_numbers = true)]
    pub concurrency: Option<i64>,

    /// Global timeout for the whole run, e.g. 30s, 1m, 1m30s [default: 30s]
    #[arg(short, long, env = "URL_CHECKER_TIMEOUT", value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Output format [default: text]
    #[arg(short, long, env = "URL_CHECKER_OUTPUT", value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, env = "URL_CHECKER_DEBUG")]
    pub debug: bool,

    /// Number of retries for failed requests [default: 0]
    #[arg(long, env = "URL_CHECKER_RETRIES")]
    pub retries: Option<u32>,

    /// Rate limit in requests per second, 0 = unlimited [default: 0]
    #[arg(long, env = "URL_CHECKER_RATE_LIMIT")]
    pub rate_limit: Option<u32>,

    /// Config file (default is $HOME/.url-checker.yaml or ./.url-checker.yaml)
    #[arg(long, env = "URL_CHECKER_CONFIG")]
    pub config: Option<PathBuf>,
}

// How results are rendered
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Stream each result as a log line, then a summary
    #[default]
    Text,
    /// One JSON document with all results and the summary
    Json,
}
