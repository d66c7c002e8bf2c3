//! CLI entry point for drime-relay.

use std::io::{self, BufRead, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use relay_core::{PreviewKind, Relay, RelayConfig, RelayError, RelayOutcome};
use tracing::{debug, error, info};

mod app;
mod cli;

use app::exit_handler::{ProcessExit, determine_exit_outcome};
use app::progress_manager::TerminalProgress;
use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout is reserved for the share link / JSON result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    match run(args).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            error!(error = %format!("{err:#}"), "relay aborted");
            eprintln!("error: {err:#}");
            ProcessExit::Failure.into()
        }
    }
}

async fn run(args: Args) -> Result<ProcessExit> {
    // Credential is resolved before any network traffic.
    let config = match RelayConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return Ok(report_failure(&RelayError::from(err))),
    };

    let Some(source_url) = read_source_url(args.url.as_deref())? else {
        info!("No URL provided. Pass a direct download URL as an argument or via stdin.");
        info!("Example: drime-relay https://cdn.example.com/files/video.mp4");
        return Ok(ProcessExit::Success);
    };

    let relay = Relay::new(config).context("failed to initialize relay")?;
    let progress = Arc::new(TerminalProgress::new(!args.quiet && !args.no_progress));
    let observer = Arc::clone(&progress);

    // A panic inside the pipeline surfaces as a JoinError instead of
    // tearing down the process; staging is still removed during unwinding.
    let task = tokio::spawn(async move { relay.run(&source_url, observer.as_ref()).await });
    let joined = task.await;
    progress.finish();

    match joined {
        Ok(Ok(outcome)) => {
            print_outcome(&outcome, args.json)?;
            Ok(ProcessExit::Success)
        }
        Ok(Err(err)) => Ok(report_failure(&err)),
        Err(join_error) => {
            error!(error = %join_error, "relay task failed unexpectedly");
            eprintln!("error: something went wrong: {join_error}");
            Ok(ProcessExit::Failure)
        }
    }
}

/// Positional URL, else the first non-empty stdin line when stdin is piped.
fn read_source_url(arg: Option<&str>) -> Result<Option<String>> {
    if let Some(url) = arg.map(str::trim).filter(|url| !url.is_empty()) {
        return Ok(Some(url.to_string()));
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    for line in stdin.lock().lines() {
        let line = line.context("failed to read URL from stdin")?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
    Ok(None)
}

fn report_failure(err: &RelayError) -> ProcessExit {
    let kind = err.kind();
    debug!(?kind, "relay failed");
    eprintln!("error: {err}");
    determine_exit_outcome(kind)
}

fn print_outcome(outcome: &RelayOutcome, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(outcome).context("failed to render JSON result")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{}", outcome.share_url);
    if outcome.preview != PreviewKind::None {
        eprintln!("preview: {}", outcome.preview.as_str());
    }
    Ok(())
}
