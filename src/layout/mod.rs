//! # Grid Pagination
//!
//! Places an ordered sequence of units into fixed-size cells, row-major,
//! `max_columns` per row and `max_rows` per page, opening new pages as the
//! grid fills. One forward pass, no look-ahead: every unit gets exactly one
//! (page, row, column) slot and is never resized or split.
//!
//! The running position is an explicit accumulator, [`GridCursor`], and the
//! per-unit transition is the pure [`GridCursor::place`], so the
//! wrap-then-break ordering can be exercised without any images or I/O.
//!
//! ```text
//!   page 0                      page 1
//!   ┌─────┬─────┬─────┐         ┌─────┬─────┬─────┐
//!   │  0  │  1  │  2  │         │  9  │ 10  │     │
//!   ├─────┼─────┼─────┤         ├─────┼─────┼─────┤
//!   │  3  │  4  │  5  │         │     │     │     │
//!   ├─────┼─────┼─────┤         └─────┴─────┴─────┘
//!   │  6  │  7  │  8  │
//!   └─────┴─────┴─────┘
//! ```

pub mod page_break;

use crate::config::GridConfig;
use page_break::decide_break;

/// Resolved target of one unit: which page, which slot, where to draw.
///
/// `x`/`y` are the top-left corner of the cell in points, measured from the
/// top-left of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Position of the unit in the ordered input.
    pub index: usize,
    pub page: usize,
    pub row: u32,
    pub col: u32,
    pub x: f64,
    pub y: f64,
}

/// Running position of the paginator between units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCursor {
    pub page: usize,
    pub row: u32,
    pub col: u32,
    pub x: f64,
    pub y: f64,
}

impl GridCursor {
    /// Top-left slot of page 0.
    pub fn start(config: &GridConfig) -> Self {
        Self {
            page: 0,
            row: 0,
            col: 0,
            x: config.padding_left,
            y: config.padding_top,
        }
    }

    /// Place unit `index` and return its placement plus the advanced cursor.
    pub fn place(self, index: usize, config: &GridConfig) -> (Placement, GridCursor) {
        let mut next = self;
        let decision = decide_break(self.row, self.col, config);

        if decision.wraps_row() {
            next.x = config.padding_left;
            next.y += config.cell_height;
            next.row += 1;
            next.col = 0;
        }
        if decision.starts_page() {
            next.page += 1;
            next.row = 0;
            next.y = config.padding_top;
            next.x = config.padding_left;
        }

        let placement = Placement {
            index,
            page: next.page,
            row: next.row,
            col: next.col,
            x: next.x,
            y: next.y,
        };

        next.col += 1;
        next.x += config.cell_width;
        (placement, next)
    }
}

/// Lay out `count` ordered units; one placement per unit, in input order.
pub fn layout(count: usize, config: &GridConfig) -> Vec<Placement> {
    (0..count)
        .scan(GridCursor::start(config), |cursor, index| {
            let (placement, next) = cursor.place(index, config);
            *cursor = next;
            Some(placement)
        })
        .collect()
}

/// Number of output pages the placements need. Page 0 always exists, so an
/// empty layout still yields one (blank) page.
pub fn page_count(placements: &[Placement]) -> usize {
    placements
        .iter()
        .map(|p| p.page + 1)
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn grid(max_rows: u32, max_columns: u32) -> GridConfig {
        GridConfig {
            cell_width: 100.0,
            cell_height: 100.0,
            max_rows,
            max_columns,
            padding_left: 10.0,
            padding_top: 10.0,
        }
    }

    fn slots(placements: &[Placement]) -> Vec<(usize, u32, u32)> {
        placements.iter().map(|p| (p.page, p.row, p.col)).collect()
    }

    #[test]
    fn test_two_by_two_fills_then_breaks() {
        let placements = layout(5, &grid(2, 2));
        assert_eq!(placements.len(), 5);
        assert_eq!(
            slots(&placements),
            vec![(0, 0, 0), (0, 0, 1), (0, 1, 0), (0, 1, 1), (1, 0, 0)]
        );
    }

    #[test]
    fn test_coordinates_follow_cells_and_padding() {
        let placements = layout(5, &grid(2, 2));
        let coords: Vec<(f64, f64)> = placements.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(
            coords,
            vec![(10.0, 10.0), (110.0, 10.0), (10.0, 110.0), (110.0, 110.0), (10.0, 10.0)]
        );
    }

    #[test]
    fn test_one_by_one_puts_each_unit_on_its_own_page() {
        let placements = layout(4, &grid(1, 1));
        for (i, p) in placements.iter().enumerate() {
            assert_eq!(p.page, i);
            assert_eq!((p.row, p.col), (0, 0));
            assert_eq!((p.x, p.y), (10.0, 10.0));
        }
    }

    #[test]
    fn test_no_two_units_share_a_slot() {
        let placements = layout(23, &grid(3, 4));
        let unique: HashSet<_> = slots(&placements).into_iter().collect();
        assert_eq!(unique.len(), 23);
        assert_eq!(page_count(&placements), 2);
        assert!(placements.iter().all(|p| p.row < 3 && p.col < 4));
    }

    #[test]
    fn test_indices_preserve_input_order() {
        let placements = layout(7, &grid(2, 3));
        let indices: Vec<usize> = placements.iter().map(|p| p.index).collect();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_input_yields_no_placements_but_one_page() {
        let placements = layout(0, &grid(3, 3));
        assert!(placements.is_empty());
        assert_eq!(page_count(&placements), 1);
    }

    #[test]
    fn test_zero_rows_breaks_before_every_unit() {
        // Page 0 is opened up front and never receives a unit.
        let placements = layout(3, &grid(0, 3));
        let pages: Vec<usize> = placements.iter().map(|p| p.page).collect();
        assert_eq!(pages, vec![1, 2, 3]);
        assert!(placements.iter().all(|p| p.x == 10.0 && p.y == 10.0));
    }

    #[test]
    fn test_zero_columns_wraps_before_every_unit() {
        // Every unit starts a new row; the page turns once rows run out.
        let placements = layout(4, &grid(2, 0));
        assert_eq!(
            slots(&placements),
            vec![(0, 1, 0), (1, 0, 0), (1, 1, 0), (2, 0, 0)]
        );
    }

    #[test]
    fn test_cursor_step_is_pure() {
        let config = grid(2, 2);
        let cursor = GridCursor {
            page: 0,
            row: 1,
            col: 2,
            x: 210.0,
            y: 110.0,
        };
        let (placement, next) = cursor.place(4, &config);
        assert_eq!((placement.page, placement.row, placement.col), (1, 0, 0));
        assert_eq!((placement.x, placement.y), (10.0, 10.0));
        assert_eq!((next.col, next.x), (1, 110.0));
        // replaying the same step gives the same answer
        assert_eq!(cursor.place(4, &config).0, placement);
    }
}
