//! docqr command-line entrypoint

use anyhow::Context;
use clap::{Parser, Subcommand};
use docqr::output::{error_value, render_outcome};
use docqr::{DocqrConfig, InversionMode, QrEncoder, ScanOutcome, Scanner, logging};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "docqr",
    version,
    about = "Decode QR codes from PDF documents and images"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to docqr.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan one or more files and print the first QR code found in each
    Scan {
        /// PDF or image files to scan
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Output results as formatted JSON instead of human-readable text
        #[arg(long)]
        json: bool,

        /// Reject anything that is not a PDF
        #[arg(long)]
        pdf_only: bool,

        /// Only scan the first N pages of each PDF
        #[arg(long, value_name = "N")]
        max_pages: Option<usize>,

        /// Image scale factor to try; repeat to try several in order
        #[arg(long = "scale", value_name = "FACTOR")]
        scales: Vec<f32>,

        /// Polarity handling: original, inverted or attempt-both
        #[arg(long, value_name = "MODE")]
        inversion: Option<InversionMode>,
    },

    /// Render text as a QR code PNG
    Generate {
        /// Text to encode
        text: String,

        /// Output PNG path
        #[arg(long, short, value_name = "PATH")]
        out: PathBuf,

        /// Minimum side length in pixels
        #[arg(long, default_value_t = 400)]
        size: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = DocqrConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Scan {
            files,
            json,
            pdf_only,
            max_pages,
            scales,
            inversion,
        } => {
            if pdf_only {
                config.scan.pdf_only = true;
            }
            if max_pages.is_some() {
                config.scan.max_pages = max_pages;
            }
            if !scales.is_empty() {
                config.scan.image_scales = scales;
            }
            if let Some(mode) = inversion {
                config.scan.inversion = mode;
            }

            logging::init(&config.logging)?;
            log_config_source(&config);

            let scanner = Scanner::new(config.scan_options()?)?;
            info!(options = ?scanner.options(), "Starting scan");

            let failures = scan_files(&scanner, &files, json).await?;
            Ok(if failures == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Generate { text, out, size } => {
            logging::init(&config.logging)?;
            log_config_source(&config);
            generate(&text, &out, size)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// Logging is only up once the config is loaded, so report its origin here.
fn log_config_source(config: &DocqrConfig) {
    match &config.source {
        Some(path) => info!("Using configuration file: {}", path.display()),
        None => debug!("No docqr.toml / docqr.yaml found, using defaults"),
    }
}

/// Scan each file in turn; returns how many could not be scanned.
async fn scan_files(scanner: &Scanner, files: &[PathBuf], json: bool) -> anyhow::Result<usize> {
    let mut failures = 0;

    for path in files {
        match scanner.scan_file(path).await {
            Ok(outcome) => emit_outcome(&outcome, json)?,
            Err(err) => {
                failures += 1;
                emit_error(path, &err.to_string(), json)?;
            }
        }
    }

    Ok(failures)
}

fn emit_outcome(outcome: &ScanOutcome, json: bool) -> anyhow::Result<()> {
    let rendered = render_outcome(outcome);
    if json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        for line in &rendered.human {
            println!("{line}");
        }
    }
    Ok(())
}

fn emit_error(path: &Path, message: &str, json: bool) -> anyhow::Result<()> {
    let file = path.display().to_string();
    if json {
        let payload = error_value(&file, message);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        eprintln!("{file}: {message}");
    }
    Ok(())
}

fn generate(text: &str, out: &Path, size: u32) -> anyhow::Result<()> {
    let image = QrEncoder::new().min_size(size).encode_string(text)?;
    image
        .save(out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!(
        "Wrote {}x{} QR code to {}",
        image.width(),
        image.height(),
        out.display()
    );
    Ok(())
}
