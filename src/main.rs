//! # pagegrid CLI
//!
//! Usage:
//!   pagegrid input.pdf
//!   pagegrid input.pdf --grid_row 4 --grid_column 2 --output sheet.pdf
//!   pagegrid input.pdf --crop_top_offset 120 --manifest layout.json -v

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::Level;

use pagegrid::config::{default_output_path, CropOffsets, GridConfig, PageSize, RunConfig};
use pagegrid::image_loader::ImageEncoding;
use pagegrid::label::DEFAULT_MAX_LABEL_LEN;

/// Convert PDF pages to square images and arrange them, sorted by page text,
/// in a grid PDF.
#[derive(Debug, Parser)]
#[command(name = "pagegrid", about, version)]
struct Cli {
    /// Path to the input PDF file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Offset to crop from the top of each page image, in pixels
    #[arg(long = "crop_top_offset", default_value_t = 0)]
    crop_top_offset: u32,

    /// Offset to crop from the left of each page image, in pixels
    #[arg(long = "crop_left_offset", default_value_t = 0)]
    crop_left_offset: u32,

    /// Width of each grid cell, in points
    #[arg(long = "image_width", default_value_t = 200.0)]
    image_width: f64,

    /// Height of each grid cell, in points
    #[arg(long = "image_height", default_value_t = 200.0)]
    image_height: f64,

    /// Maximum number of rows per page
    #[arg(long = "grid_row", default_value_t = 3)]
    grid_row: u32,

    /// Maximum number of columns per page
    #[arg(long = "grid_column", default_value_t = 3)]
    grid_column: u32,

    /// Top margin, in points
    #[arg(long = "padding_top", default_value_t = 20.0)]
    padding_top: f64,

    /// Left margin, in points
    #[arg(long = "padding_left", default_value_t = 20.0)]
    padding_left: f64,

    /// Output path [default: Result_<input name>.pdf]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output page size
    #[arg(long = "page_size", value_enum, default_value_t = PageSizeArg::A3)]
    page_size: PageSizeArg,

    /// Rasterization resolution, in dots per inch
    #[arg(long, default_value_t = 200)]
    dpi: u32,

    /// Embed page images as JPEG at this quality (1-100) instead of lossless
    #[arg(long = "jpeg_quality", value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: Option<u8>,

    /// Maximum label length, in characters
    #[arg(long = "max_label_length", default_value_t = DEFAULT_MAX_LABEL_LEN)]
    max_label_length: usize,

    /// Path to the pdftoppm executable
    #[arg(long, default_value = "pdftoppm")]
    pdftoppm: PathBuf,

    /// Also write a JSON manifest of every placement to this path
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

/// Output page sizes selectable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<PageSizeArg> for PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::A3 => PageSize::A3,
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::A5 => PageSize::A5,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Legal => PageSize::Legal,
            PageSizeArg::Tabloid => PageSize::Tabloid,
        }
    }
}

impl Cli {
    fn log_level(&self) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn into_config(self) -> RunConfig {
        let output = self
            .output
            .unwrap_or_else(|| default_output_path(&self.input));
        let encoding = match self.jpeg_quality {
            Some(quality) => ImageEncoding::Jpeg { quality },
            None => ImageEncoding::Flate,
        };
        RunConfig {
            input: self.input,
            output,
            crop: CropOffsets {
                top: self.crop_top_offset,
                left: self.crop_left_offset,
            },
            grid: GridConfig {
                cell_width: self.image_width,
                cell_height: self.image_height,
                max_rows: self.grid_row,
                max_columns: self.grid_column,
                padding_left: self.padding_left,
                padding_top: self.padding_top,
            },
            page_size: self.page_size.into(),
            max_label_len: self.max_label_length,
            dpi: self.dpi,
            pdftoppm: self.pdftoppm,
            encoding,
            manifest: self.manifest,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = cli.into_config();
    match pagegrid::run(&config) {
        Ok(summary) => {
            println!("PDF saved as {}", summary.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
