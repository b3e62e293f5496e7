//! # Run Configuration
//!
//! Immutable configuration values built once per run and handed to each
//! stage. Nothing here is global: the CLI builds a [`RunConfig`], and each
//! component receives only the piece it needs.

use std::path::{Path, PathBuf};

use crate::error::GridError;
use crate::image_loader::ImageEncoding;
use crate::label::DEFAULT_MAX_LABEL_LEN;

/// Fixed-cell grid geometry, in output-document points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub cell_width: f64,
    pub cell_height: f64,
    /// Maximum rows per page.
    pub max_rows: u32,
    /// Maximum columns per row.
    pub max_columns: u32,
    pub padding_left: f64,
    pub padding_top: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_width: 200.0,
            cell_height: 200.0,
            max_rows: 3,
            max_columns: 3,
            padding_left: 20.0,
            padding_top: 20.0,
        }
    }
}

impl GridConfig {
    /// Check the ranges the paginator relies on.
    ///
    /// Zero rows or columns pass: the paginator handles them with its
    /// degenerate page-break behaviour.
    pub fn validate(&self) -> Result<(), GridError> {
        if !self.cell_width.is_finite() || self.cell_width <= 0.0 {
            return Err(GridError::InvalidConfig(format!(
                "cell width must be > 0, got {}",
                self.cell_width
            )));
        }
        if !self.cell_height.is_finite() || self.cell_height <= 0.0 {
            return Err(GridError::InvalidConfig(format!(
                "cell height must be > 0, got {}",
                self.cell_height
            )));
        }
        if !self.padding_left.is_finite() || self.padding_left < 0.0 {
            return Err(GridError::InvalidConfig(format!(
                "left padding must be >= 0, got {}",
                self.padding_left
            )));
        }
        if !self.padding_top.is_finite() || self.padding_top < 0.0 {
            return Err(GridError::InvalidConfig(format!(
                "top padding must be >= 0, got {}",
                self.padding_top
            )));
        }
        Ok(())
    }

    /// True when rows or columns are zero and every unit forces a break.
    pub fn is_degenerate(&self) -> bool {
        self.max_rows == 0 || self.max_columns == 0
    }
}

/// Offsets of the square crop window, in source pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropOffsets {
    pub top: u32,
    pub left: u32,
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PageSize {
    A4,
    #[default]
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
        }
    }
}

/// Document metadata embedded in the PDF Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub creator: Option<String>,
}

/// Everything one invocation needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub crop: CropOffsets,
    pub grid: GridConfig,
    pub page_size: PageSize,
    pub max_label_len: usize,
    pub dpi: u32,
    pub pdftoppm: PathBuf,
    pub encoding: ImageEncoding,
    pub manifest: Option<PathBuf>,
}

impl RunConfig {
    /// Defaults for everything except the input path.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output = default_output_path(&input);
        Self {
            input,
            output,
            crop: CropOffsets::default(),
            grid: GridConfig::default(),
            page_size: PageSize::default(),
            max_label_len: DEFAULT_MAX_LABEL_LEN,
            dpi: 200,
            pdftoppm: PathBuf::from("pdftoppm"),
            encoding: ImageEncoding::default(),
            manifest: None,
        }
    }

    /// Metadata derived from the input file name.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            title: input_stem(&self.input),
            creator: Some("pagegrid".to_string()),
        }
    }
}

fn input_stem(input: &Path) -> Option<String> {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

/// `Result_<input stem>.pdf` in the current directory.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input_stem(input).unwrap_or_default();
    PathBuf::from(format!("Result_{}.pdf", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_drops_directory_and_extension() {
        assert_eq!(
            default_output_path(Path::new("/tmp/scans/fruit.pdf")),
            PathBuf::from("Result_fruit.pdf")
        );
        assert_eq!(
            default_output_path(Path::new("archive.tar.pdf")),
            PathBuf::from("Result_archive.tar.pdf")
        );
    }

    #[test]
    fn test_default_grid_matches_cli_defaults() {
        let grid = GridConfig::default();
        assert_eq!(grid.cell_width, 200.0);
        assert_eq!(grid.cell_height, 200.0);
        assert_eq!((grid.max_rows, grid.max_columns), (3, 3));
        assert_eq!((grid.padding_left, grid.padding_top), (20.0, 20.0));
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_cells() {
        let grid = GridConfig {
            cell_width: 0.0,
            ..GridConfig::default()
        };
        assert!(matches!(grid.validate(), Err(GridError::InvalidConfig(_))));

        let grid = GridConfig {
            cell_height: f64::NAN,
            ..GridConfig::default()
        };
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_padding() {
        let grid = GridConfig {
            padding_top: -1.0,
            ..GridConfig::default()
        };
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_zero_rows_is_valid_but_degenerate() {
        let grid = GridConfig {
            max_rows: 0,
            ..GridConfig::default()
        };
        assert!(grid.validate().is_ok());
        assert!(grid.is_degenerate());
        assert!(!GridConfig::default().is_degenerate());
    }

    #[test]
    fn test_default_page_size_is_a3() {
        assert_eq!(PageSize::default().dimensions(), (841.89, 1190.55));
    }

    #[test]
    fn test_run_config_metadata_title_is_stem() {
        let config = RunConfig::new("docs/cards.pdf");
        assert_eq!(config.metadata().title.as_deref(), Some("cards"));
        assert_eq!(config.output, PathBuf::from("Result_cards.pdf"));
    }
}
