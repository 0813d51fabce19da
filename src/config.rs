// src/config.rs
// =============================================================================
// Resolves the final settings for a run.
//
// Sources, highest priority first:
// 1. command-line flags
// 2. URL_CHECKER_* environment variables (clap merges these into the flags)
// 3. the YAML config file
// 4. built-in defaults
//
// Config file lookup: --config if given (must exist), otherwise the first of
// $HOME/.url-checker.yaml and ./.url-checker.yaml that exists (optional).
//
// Example .url-checker.yaml:
//
//   file: urls.txt
//   concurrency: 10
//   timeout: 1m
//   output: json
//   retries: 2
//   rate_limit: 5
// =============================================================================

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::checker::RunConfig;
use crate::cli::{Cli, OutputFormat};

const CONFIG_FILE_NAME: &str = ".url-checker.yaml";
const DEFAULT_CONCURRENCY: i64 = 5;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// Contents of the YAML config file; every key is optional
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub file: Option<PathBuf>,
    pub concurrency: Option<i64>,
    #[serde(with = "humantime_serde_opt")]
    pub timeout: Option<Duration>,
    pub output: Option<OutputFormat>,
    pub debug: Option<bool>,
    pub retries: Option<u32>,
    #[serde(alias = "rate-limit")]
    pub rate_limit: Option<u32>,
}

// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub file: PathBuf,
    pub output: OutputFormat,
    pub debug: bool,
    pub timeout: Duration,
    pub run: RunConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        // An empty file is a valid, empty config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    // Finds and loads the config file, if any
    pub fn discover(explicit: Option<&Path>) -> Result<Option<(PathBuf, Self)>> {
        if let Some(path) = explicit {
            return Ok(Some((path.to_path_buf(), Self::load(path)?)));
        }

        let candidates = dirs::home_dir()
            .map(|home| home.join(CONFIG_FILE_NAME))
            .into_iter()
            .chain(std::iter::once(PathBuf::from(CONFIG_FILE_NAME)));

        for path in candidates {
            if path.is_file() {
                let config = Self::load(&path)?;
                return Ok(Some((path, config)));
            }
        }
        Ok(None)
    }
}

impl Settings {
    // Merges flags/env over the config file over the defaults
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let Some(url_file) = cli.file.or(file.file) else {
            bail!("file is required (via --file, config file, or URL_CHECKER_FILE)");
        };

        let requested = cli
            .concurrency
            .or(file.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY);
        let concurrency = if requested < 1 {
            warn!(requested, "Concurrency must be at least 1. Using 1.");
            1
        } else {
            usize::try_from(requested).unwrap_or(usize::MAX)
        };

        Ok(Self {
            file: url_file,
            output: cli.output.or(file.output).unwrap_or_default(),
            debug: cli.debug || file.debug.unwrap_or(false),
            timeout: cli.timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT),
            run: RunConfig {
                concurrency,
                max_retries: cli.retries.or(file.retries).unwrap_or(0),
                rate_limit: cli.rate_limit.or(file.rate_limit).unwrap_or(0),
            },
        })
    }
}

// Lets the config file say `timeout: 1m` instead of a number of seconds
mod humantime_serde_opt {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
