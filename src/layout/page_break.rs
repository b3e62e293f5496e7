//! # Slot Break Decisions
//!
//! Before each unit is placed, the cursor may need to wrap to the next row
//! and/or move to a fresh page. The column check always runs first, and the
//! page check sees the row *after* any wrap: a unit that fills the last
//! column of the last row pushes the next unit onto a new page in one step.

use crate::config::GridConfig;

/// What happens to the cursor before the next unit is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// The current slot is free.
    Place,
    /// Columns are exhausted: start the next row on the same page.
    WrapRow,
    /// Rows are exhausted without a column wrap (only reachable with zero
    /// rows configured).
    NewPage,
    /// Columns exhausted, and the wrap ran past the last row.
    WrapThenNewPage,
}

impl BreakDecision {
    pub fn wraps_row(self) -> bool {
        matches!(self, BreakDecision::WrapRow | BreakDecision::WrapThenNewPage)
    }

    pub fn starts_page(self) -> bool {
        matches!(self, BreakDecision::NewPage | BreakDecision::WrapThenNewPage)
    }
}

/// Decide how the cursor at (`row`, `col`) must move before placing.
pub fn decide_break(row: u32, col: u32, config: &GridConfig) -> BreakDecision {
    let wraps = col >= config.max_columns;
    let row_after_wrap = if wraps { row.saturating_add(1) } else { row };
    match (wraps, row_after_wrap >= config.max_rows) {
        (false, false) => BreakDecision::Place,
        (true, false) => BreakDecision::WrapRow,
        (false, true) => BreakDecision::NewPage,
        (true, true) => BreakDecision::WrapThenNewPage,
    }
}
