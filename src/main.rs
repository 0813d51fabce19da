// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments (and env vars) using clap
// 2. Load the optional config file and resolve the final settings
// 3. Set up logging to stderr
// 4. Read the URL list and arm the global timeout
// 5. Run the checker and render the results
// 6. Exit with proper code (0 = all OK, 1 = failures or timeout, 2 = error)
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use url_checker::checker::{Checker, Discard, RunContext};
use url_checker::cli::{Cli, OutputFormat};
use url_checker::config::{FileConfig, Settings};
use url_checker::output::{self, TextSink};
use url_checker::input;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Logging may not be set up yet, so go straight to stderr
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every URL answered 2xx
//   Ok(1) = at least one failure, or the global timeout was hit
//   Err   = bad configuration or unreadable input
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let discovered = FileConfig::discover(cli.config.as_deref())?;
    let (config_path, file_config) = match discovered {
        Some((path, config)) => (Some(path), config),
        None => (None, FileConfig::default()),
    };

    init_logging(cli.debug || file_config.debug.unwrap_or(false));
    if let Some(path) = &config_path {
        debug!(file = %path.display(), "Using config file");
    }

    let settings = Settings::resolve(cli, file_config)?;

    let urls = input::read_urls(&settings.file)?;
    if urls.is_empty() {
        info!("The file is empty. Nothing to process.");
        return Ok(0);
    }

    let checker = Checker::new(settings.run).context("Failed to set up the checker")?;
    let ctx = RunContext::with_timeout(settings.timeout);

    // Ctrl-C cancels the run the same way the timeout does
    {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctx.cancel();
            }
        });
    }

    let report = match settings.output {
        OutputFormat::Text => checker.run(&ctx, urls, &mut TextSink).await,
        OutputFormat::Json => checker.run(&ctx, urls, &mut Discard).await,
    };

    output::log_interruption(&report.summary);
    match settings.output {
        OutputFormat::Text => output::log_summary(&report.summary),
        OutputFormat::Json => output::write_json(std::io::stdout().lock(), &report)?,
    }

    if report.summary.fail > 0 || report.summary.deadline_exceeded() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Logs go to stderr so stdout stays clean for JSON output.
// RUST_LOG overrides the level picked from --debug.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
