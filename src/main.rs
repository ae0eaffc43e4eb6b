use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use gridcomposer::{create_grid, GridOptions};
use tracing_subscriber::EnvFilter;

/// Create a labeled image grid from a set of images.
///
/// Images should be provided in row-major order (left to right, top to bottom).
#[derive(Parser, Debug)]
#[command(name = "gridcomposer", version, about)]
struct Cli {
    /// Output JPEG path
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Row labels, comma-separated (required)
    #[arg(long, value_name = "LABELS", allow_hyphen_values = true)]
    rows: Option<String>,

    /// Column labels, comma-separated (required)
    #[arg(long, value_name = "LABELS", allow_hyphen_values = true)]
    cols: Option<String>,

    /// Image paths in row-major order, comma-separated (required)
    #[arg(long, value_name = "PATHS")]
    images: Option<String>,

    /// Grid size in pixels [default: 4096]
    #[arg(long, value_name = "PIXELS")]
    size: Option<u32>,

    /// Header size in pixels for labels [default: 80]
    #[arg(long, value_name = "PIXELS")]
    header: Option<u32>,

    /// Font size for labels [default: 32]
    #[arg(long, value_name = "PIXELS")]
    font_size: Option<u32>,

    /// JPEG quality 1-100 [default: 90]
    #[arg(long, value_name = "1-100")]
    quality: Option<u8>,

    /// TrueType/OpenType font for labels (searches system fonts when omitted)
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// Decode images one at a time instead of in parallel
    #[arg(long)]
    sequential: bool,
}

impl From<Cli> for GridOptions {
    fn from(cli: Cli) -> Self {
        GridOptions {
            output: cli.output,
            rows: cli.rows,
            cols: cli.cols,
            images: cli.images,
            size: cli.size,
            header: cli.header,
            font_size: cli.font_size,
            quality: cli.quality,
            font_path: cli.font,
            parallel_decode: Some(!cli.sequential),
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let spec = GridOptions::from(cli)
        .resolve()
        .context("Invalid grid configuration")?;
    create_grid(&spec).with_context(|| format!("Failed to create {}", spec.output.display()))?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if std::env::args_os().len() <= 1 {
        let mut command = <Cli as clap::CommandFactory>::command();
        let _ = command.print_help();
        return ExitCode::SUCCESS;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
