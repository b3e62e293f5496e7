//! # Document Assembly
//!
//! Turns ordered units plus their placements into drawable pages: each unit
//! becomes an image scaled into its cell followed by an unfilled border of
//! the same bounds. Pages are created on demand; page 0 always exists, so a
//! document with no units still has one blank page.

use tracing::{debug, info, warn};

use crate::config::{GridConfig, Metadata, PageSize};
use crate::error::GridError;
use crate::image_loader::{ImageEncoding, LoadedImage};
use crate::layout::{page_count, Placement};
use crate::pdf::PdfWriter;
use crate::pipeline::LabeledUnit;

/// RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
}

/// Stroke drawn around every cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderStyle {
    /// Line width in points; 0 disables the border.
    pub width: f64,
    pub color: Color,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            width: 2.0,
            color: Color::BLACK,
        }
    }
}

/// The visual to draw for one element.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Draw an image stretched to the element bounds.
    Image { image_data: LoadedImage },
    /// Stroke (never fill) a rectangle on the element bounds.
    Border { width: f64, color: Color },
}

/// A positioned element on a page, top-left based, in points.
#[derive(Debug, Clone)]
pub struct PageElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

/// One output page, ready for serialization.
#[derive(Debug, Clone)]
pub struct GridPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<PageElement>,
}

/// Everything about the output document that is not the grid itself.
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    pub grid: GridConfig,
    pub page_size: PageSize,
    pub border: BorderStyle,
    pub encoding: ImageEncoding,
}

/// Build the drawable pages for `units` placed at `placements`.
///
/// `placements[i].index` refers to a position in `units`.
pub fn assemble(
    units: &[LabeledUnit],
    placements: &[Placement],
    options: &AssembleOptions,
) -> Result<Vec<GridPage>, GridError> {
    let (width, height) = options.page_size.dimensions();
    let mut pages: Vec<GridPage> = (0..page_count(placements))
        .map(|_| GridPage {
            width,
            height,
            elements: Vec::new(),
        })
        .collect();

    let cell_width = options.grid.cell_width;
    let cell_height = options.grid.cell_height;

    for placement in placements {
        let unit = &units[placement.index];
        let page = &mut pages[placement.page];

        match LoadedImage::from_dynamic(&unit.image, options.encoding)? {
            Some(image_data) => page.elements.push(PageElement {
                x: placement.x,
                y: placement.y,
                width: cell_width,
                height: cell_height,
                draw: DrawCommand::Image { image_data },
            }),
            None => warn!(
                label = %unit.label,
                source_page = unit.source_page,
                "empty crop, drawing border only"
            ),
        }
        page.elements.push(PageElement {
            x: placement.x,
            y: placement.y,
            width: cell_width,
            height: cell_height,
            draw: DrawCommand::Border {
                width: options.border.width,
                color: options.border.color,
            },
        });
        debug!(
            label = %unit.label,
            page = placement.page,
            x = placement.x,
            y = placement.y,
            "placed unit"
        );
    }

    info!(pages = pages.len(), units = placements.len(), "assembled document");
    Ok(pages)
}

/// Assemble and serialize to PDF bytes.
pub fn render(
    units: &[LabeledUnit],
    placements: &[Placement],
    options: &AssembleOptions,
    metadata: &Metadata,
) -> Result<Vec<u8>, GridError> {
    let pages = assemble(units, placements, options)?;
    Ok(PdfWriter::new().write(&pages, metadata))
}
