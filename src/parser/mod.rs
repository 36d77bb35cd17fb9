//! Segment parser for upstream query SQL.
//!
//! The upstream semantic layer emits one SQL text per query, annotated with
//! marker comments. This module splits that text into named segments:
//!
//! ```text
//! -- generate derived table orders_pdt        ┐
//! -- Building persistent derived table ...    │ materialization block
//! CREATE TABLE ... AS (...)                   │
//! -- finished orders_pdt => SCRATCH.LR$...    ┘
//! SELECT ...                                    select
//! -- sql for creating the total ...
//! SELECT ...                                    total
//! -- sql for creating the pivot row totals
//! SELECT ...                                    row_totals
//! -- sql for creating the grand totals
//! SELECT ...                                    grand_total
//! ```
//!
//! Pivoted queries are wrapped in ranking sub-selects; see [`pivot`].

pub mod pivot;

use serde::Serialize;

// ============================================================================
// Markers
// ============================================================================

pub const MATERIALIZATION_START: &str = "-- generate derived table";
pub const MATERIALIZATION_END: &str = "-- finished";
pub const TOTAL_MARKER: &str = "-- sql for creating the total";
pub const ROW_TOTALS_MARKER: &str = "-- sql for creating the pivot row totals";
pub const GRAND_TOTAL_MARKER: &str = "-- sql for creating the grand totals";

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while splitting query SQL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(
        "Unsupported pivot: expected one row and one column dimension, found rows [{}] and columns [{}]",
        .row_dimensions.join(", "),
        .column_dimensions.join(", ")
    )]
    UnsupportedPivot {
        row_dimensions: Vec<String>,
        column_dimensions: Vec<String>,
    },
}

// ============================================================================
// Segments
// ============================================================================

/// The named parts of one query's SQL. Absent sections are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedSegments {
    /// Derived-table build blocks, begin and finish markers included.
    pub materialization_blocks: Vec<String>,
    pub select: String,
    pub total: String,
    pub row_totals: String,
    pub grand_total: String,
    /// The original pivot wrapper when `select` was unwrapped from one.
    pub pivot: String,
}

/// Which accumulator the current line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Select,
    Materialization,
    Total,
    RowTotal,
    GrandTotal,
}

#[derive(Default)]
struct Accumulators {
    select: Vec<String>,
    block: Vec<String>,
    total: Vec<String>,
    row_totals: Vec<String>,
    grand_total: Vec<String>,
    blocks: Vec<String>,
}

impl Accumulators {
    fn push(&mut self, mode: Mode, line: &str) {
        let target = match mode {
            Mode::Select => &mut self.select,
            Mode::Materialization => &mut self.block,
            Mode::Total => &mut self.total,
            Mode::RowTotal => &mut self.row_totals,
            Mode::GrandTotal => &mut self.grand_total,
        };
        target.push(line.to_string());
    }

    fn close_block(&mut self) {
        let block = std::mem::take(&mut self.block);
        self.blocks.push(block.join("\n"));
    }

    /// Keep an unfinished block as its own entry.
    fn close_pending_block(&mut self, reason: &str) {
        if !self.block.is_empty() {
            tracing::debug!(reason, "closing unfinished derived table block");
            self.close_block();
        }
    }
}

/// The accumulator a total-section marker switches to.
fn total_mode(marker: &str) -> Option<Mode> {
    if marker.starts_with(ROW_TOTALS_MARKER) {
        Some(Mode::RowTotal)
    } else if marker.starts_with(GRAND_TOTAL_MARKER) {
        Some(Mode::GrandTotal)
    } else if marker.starts_with(TOTAL_MARKER) {
        Some(Mode::Total)
    } else {
        None
    }
}

/// Split one query's raw SQL into segments, unwrapping pivoted selects.
///
/// Marker lines are matched on their prefix after trimming leading
/// whitespace. Input without markers comes back unchanged as `select`.
pub fn parse_segments(raw: &str) -> Result<ParsedSegments, ParseError> {
    let mut segments = split_segments(raw);

    if pivot::is_pivot(&segments.select) {
        let unwrapped = pivot::unwrap(&segments.select)?;
        segments.pivot = std::mem::replace(&mut segments.select, unwrapped);
    }

    Ok(segments)
}

/// Line classification only; a pivot wrapper stays in `select`.
pub fn split_segments(raw: &str) -> ParsedSegments {
    let mut acc = Accumulators::default();
    let mut mode = Mode::Select;

    for line in raw.split('\n') {
        let marker = line.trim_start();

        if marker.starts_with(MATERIALIZATION_START) {
            acc.close_pending_block("derived table block opened before the previous one finished");
            mode = Mode::Materialization;
            acc.push(mode, line);
        } else if mode == Mode::Materialization && marker.starts_with(MATERIALIZATION_END) {
            acc.push(mode, line);
            acc.close_block();
            mode = Mode::Select;
        } else if let Some(next) = total_mode(marker) {
            acc.close_pending_block("derived table block interrupted by a total section");
            mode = next;
        } else {
            acc.push(mode, line);
        }
    }

    acc.close_pending_block("derived table block left open at end of input");

    ParsedSegments {
        materialization_blocks: acc.blocks,
        select: acc.select.join("\n"),
        total: acc.total.join("\n"),
        row_totals: acc.row_totals.join("\n"),
        grand_total: acc.grand_total.join("\n"),
        pivot: String::new(),
    }
}
