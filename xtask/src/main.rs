// Desktop/tooling crate: unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod doc;
mod make_asset;
mod test;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Frame-sequence playback development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Pixel layout written into generated assets.
#[derive(Clone, Copy, ValueEnum)]
pub enum Format {
    /// RGB565 plus an 8-bit alpha plane (3 bytes/pixel)
    Rgb565,
    /// RGB888 plus an 8-bit alpha plane (4 bytes/pixel)
    Rgb888,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the libraries build for the embedded target and pass lints
    Check,
    /// Run all tests (unit, integration, and doc)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
        /// Include private items
        #[arg(long)]
        private: bool,
    },
    /// Write a synthetic RFSQ frame-sequence asset for demos and bring-up
    MakeAsset {
        /// Output file
        #[arg(long)]
        out: std::path::PathBuf,
        /// Frame width in pixels
        #[arg(long, default_value_t = 32)]
        width: u16,
        /// Frame height in pixels
        #[arg(long, default_value_t = 32)]
        height: u16,
        /// Number of frames
        #[arg(long, default_value_t = 8)]
        frames: u16,
        /// Per-frame delay in milliseconds
        #[arg(long, default_value_t = 100)]
        delay_ms: u16,
        /// Pixel format
        #[arg(long, value_enum, default_value_t = Format::Rgb565)]
        format: Format,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::Doc { open, private } => doc::run(open, private),
        Commands::MakeAsset {
            out,
            width,
            height,
            frames,
            delay_ms,
            format,
        } => make_asset::run(
            &out,
            &make_asset::AssetParams {
                width,
                height,
                frames,
                delay_ms,
                format,
            },
        ),
    }
}
