//! tabkit - Tabular File Conversion and Query Service
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tabkit::config::{CliArgs, Command, ServiceConfig};
use tabkit::convert::{self, ConversionRequest, FileConverter};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = CliArgs::parse();
    setup_logging(args.verbose);

    match args.command {
        Command::Convert {
            input,
            to,
            output_dir,
        } => run_convert(input, to, output_dir),
        Command::Batch { manifest } => run_batch(manifest),
        Command::Serve {
            data_dir,
            port,
            bind,
        } => run_serve(data_dir, port, bind),
    }
}

fn run_convert(input: PathBuf, to: String, output_dir: Option<PathBuf>) -> Result<ExitCode> {
    let converter = FileConverter::new(input, to, output_dir);
    match converter.convert().context("Conversion failed")? {
        Some(path) => println!("{}", path.display()),
        None => println!("Input was empty; no file produced"),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_batch(manifest: PathBuf) -> Result<ExitCode> {
    let contents = std::fs::read_to_string(&manifest)
        .with_context(|| format!("Cannot read manifest '{}'", manifest.display()))?;
    let requests: Vec<ConversionRequest> = serde_json::from_str(&contents)
        .with_context(|| format!("Cannot parse manifest '{}'", manifest.display()))?;

    let results = convert::convert_all(&requests);
    let failures = results.iter().filter(|r| !r.success).count();

    for result in &results {
        match (&result.output, &result.error) {
            (Some(output), _) => {
                println!("ok    {} -> {}", result.input.display(), output.display())
            }
            (None, None) => println!("ok    {} (empty, skipped)", result.input.display()),
            (None, Some(err)) => println!("fail  {}: {}", result.input.display(), err),
        }
    }

    println!();
    println!(
        "{} converted, {} failed of {} total",
        results.len() - failures,
        failures,
        results.len()
    );

    if failures > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_serve(data_dir: PathBuf, port: u16, bind: String) -> Result<ExitCode> {
    let config = ServiceConfig::prepare(&data_dir).context("Invalid data directory")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    runtime
        .block_on(tabkit::server::serve(config, &bind, port))
        .context("Server failed")?;

    Ok(ExitCode::SUCCESS)
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tabkit=debug,warn")
    } else {
        EnvFilter::new("tabkit=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
