//! # pagegrid
//!
//! Turns every page of a PDF into a square thumbnail, sorts the thumbnails
//! by the text printed on their page, and lays them out on a fixed grid in a
//! new PDF with a border around every cell.
//!
//! ## Architecture
//!
//! ```text
//! source.pdf
//!       ↓
//!   [raster] + [extract]  — page bitmaps and page texts, same page order
//!       ↓
//!   [pipeline]            — crop ([crop]) and label ([label]) each page,
//!       ↓                   then stable sort by label
//!   [layout]              — (page, x, y) for every unit on a rows × columns grid
//!       ↓
//!   [assemble] → [pdf]    — images + borders, serialized to PDF bytes
//! ```

pub mod assemble;
pub mod config;
pub mod crop;
pub mod error;
pub mod extract;
pub mod image_loader;
pub mod label;
pub mod layout;
pub mod manifest;
pub mod pdf;
pub mod pipeline;
pub mod raster;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use assemble::{AssembleOptions, BorderStyle};
use config::RunConfig;
use error::GridError;
use extract::{LopdfExtractor, TextExtractor};
use layout::{layout, page_count, Placement};
use pipeline::{order, LabeledUnit, PagePipeline};
use raster::{PdftoppmRasterizer, Rasterizer};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub units: usize,
    pub pages: usize,
}

/// A rendered grid document, not yet written anywhere.
#[derive(Debug)]
pub struct Composition {
    /// Units in grid order.
    pub units: Vec<LabeledUnit>,
    pub placements: Vec<Placement>,
    pub pdf: Vec<u8>,
}

impl Composition {
    pub fn page_count(&self) -> usize {
        page_count(&self.placements)
    }
}

/// Run the whole conversion with the default collaborators (`pdftoppm` for
/// rasterization, `lopdf` for text).
pub fn run(config: &RunConfig) -> Result<RunSummary, GridError> {
    let rasterizer = PdftoppmRasterizer::new(&config.pdftoppm, config.dpi);
    run_with(config, rasterizer, LopdfExtractor)
}

/// Run the whole conversion with the given collaborators.
///
/// Nothing is written unless the document rendered completely, and the
/// document is removed again when the manifest cannot be written.
pub fn run_with<R: Rasterizer, E: TextExtractor>(
    config: &RunConfig,
    rasterizer: R,
    extractor: E,
) -> Result<RunSummary, GridError> {
    let composition = compose(config, rasterizer, extractor)?;

    let manifest_json = match &config.manifest {
        Some(path) => Some((
            path,
            manifest::to_json(&composition.units, &composition.placements)?,
        )),
        None => None,
    };

    write_file(&config.output, &composition.pdf)?;
    if let Some((path, json)) = manifest_json {
        if let Err(e) = write_file(path, json.as_bytes()) {
            // A failed run leaves no output.
            if let Err(remove) = std::fs::remove_file(&config.output) {
                warn!(output = %config.output.display(), error = %remove, "cannot remove partial output");
            }
            return Err(e);
        }
    }

    let summary = RunSummary {
        output: config.output.clone(),
        units: composition.units.len(),
        pages: composition.page_count(),
    };
    info!(
        output = %summary.output.display(),
        units = summary.units,
        pages = summary.pages,
        "wrote grid document"
    );
    Ok(summary)
}

/// Process, order, lay out and render the input, keeping everything in memory.
pub fn compose<R: Rasterizer, E: TextExtractor>(
    config: &RunConfig,
    rasterizer: R,
    extractor: E,
) -> Result<Composition, GridError> {
    config.grid.validate()?;
    if config.grid.is_degenerate() {
        warn!(
            max_rows = config.grid.max_rows,
            max_columns = config.grid.max_columns,
            "zero rows or columns: every unit forces a row wrap or page break"
        );
    }

    let pipeline = PagePipeline::new(rasterizer, extractor, config.crop, config.max_label_len);
    let units = order(pipeline.process(&config.input)?);
    let placements = layout(units.len(), &config.grid);

    let options = AssembleOptions {
        grid: config.grid,
        page_size: config.page_size,
        border: BorderStyle::default(),
        encoding: config.encoding,
    };
    let pdf = assemble::render(&units, &placements, &options, &config.metadata())?;

    Ok(Composition {
        units,
        placements,
        pdf,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), GridError> {
    std::fs::write(path, bytes).map_err(|source| GridError::Write {
        path: path.to_path_buf(),
        source,
    })
}
