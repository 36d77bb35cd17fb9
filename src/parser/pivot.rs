//! Pivot wrapper unwrapping.
//!
//! A pivoted query arrives as its plain aggregate select nested inside
//! several ranking sub-selects:
//!
//! ```text
//! SELECT * FROM (
//! SELECT *, DENSE_RANK() OVER (ORDER BY z___min_rank) as z___pivot_row_rank, ... FROM (
//! SELECT *, MIN(z___rank) OVER (PARTITION BY "row.dim") as z___min_rank FROM (
//! SELECT *, RANK() OVER (ORDER BY "row.dim" ASC, z__pivot_col_rank) AS z___rank FROM (
//! SELECT *, DENSE_RANK() OVER (ORDER BY "col.dim") AS z__pivot_col_rank FROM (
//! SELECT ... ) ww
//! ) bb WHERE z__pivot_col_rank <= 16384
//! ) aa
//! ) xx
//! ) zz
//!  WHERE ... AND (z___pivot_row_rank <= 500) ORDER BY z___pivot_row_rank
//! ```
//!
//! Blending needs the flat rows, so the innermost select is recovered, its
//! row dimension is moved ahead of the column dimension, and the wrapper's
//! ordering and row cap are carried over.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::ParseError;
use crate::sql::scan::last_top_level_match;

/// Present in every pivot wrapper.
pub const PIVOT_RANK_MARKER: &str = "z__pivot_col_rank";

static INNER_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\)\s*ww\b").unwrap());

static FROM_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bFROM\s*\(").unwrap());

static ROW_DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)MIN\(\s*z___rank\s*\)\s+OVER\s*\(\s*PARTITION\s+BY\s+([^\n]*?)\)\s+AS\s+z___min_rank\b")
        .unwrap()
});

static COLUMN_DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)DENSE_RANK\(\)\s+OVER\s*\(\s*ORDER\s+BY\s+([^\n]*?)\)\s+AS\s+z__pivot_col_rank\b")
        .unwrap()
});

static QUOTED_COLUMN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());

static ORDERED_BY_ROW_RANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bORDER\s+BY\s+z___pivot_row_rank\b").unwrap());

static ROW_CAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bz___pivot_row_rank\s*<=\s*(\d+)").unwrap());

static ORDER_BY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bORDER\s+BY\b").unwrap());

static EXISTING_ROW_CAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:LIMIT\s+\d+|FETCH\s+(?:NEXT|FIRST)\s+\d+\s+ROWS?\s+ONLY)\s*$").unwrap()
});

/// Whether `select` is wrapped for pivoting.
pub fn is_pivot(select: &str) -> bool {
    select.contains(PIVOT_RANK_MARKER)
}

/// Recover the flat select from a pivot wrapper.
///
/// Returns the wrapper unchanged when no `) ww` block can be found.
pub fn unwrap(wrapper: &str) -> Result<String, ParseError> {
    let Some(inner) = innermost_select(wrapper) else {
        tracing::debug!("pivot marker present but no inner select found");
        return Ok(wrapper.to_string());
    };

    let rows = dimensions(&ROW_DIMENSIONS, wrapper);
    let columns = dimensions(&COLUMN_DIMENSIONS, wrapper);
    if rows.len() > 1 || columns.len() > 1 {
        return Err(ParseError::UnsupportedPivot {
            row_dimensions: rows.into_iter().collect(),
            column_dimensions: columns.into_iter().collect(),
        });
    }

    let mut select = match (rows.first(), columns.first()) {
        (Some(row), Some(column)) => row_dimension_first(inner, row, column),
        _ => inner.to_string(),
    };

    if ORDERED_BY_ROW_RANK.is_match(wrapper) && last_top_level_match(&select, &ORDER_BY).is_none()
    {
        select.push_str("\nORDER BY\n    1");
    }

    if let Some(cap) = ROW_CAP.captures(wrapper) {
        if !EXISTING_ROW_CAP.is_match(&select) {
            select.push_str(&format!("\nFETCH NEXT {} ROWS ONLY", &cap[1]));
        }
    }

    Ok(select)
}

/// Text between the last `FROM (` before `) ww` and `) ww` itself.
fn innermost_select(wrapper: &str) -> Option<&str> {
    let end = INNER_END.find(wrapper)?;
    let open = FROM_OPEN.find_iter(&wrapper[..end.start()]).last()?;
    Some(wrapper[open.end()..end.start()].trim())
}

/// Distinct double-quoted columns named by the first match of `pattern`.
fn dimensions(pattern: &Regex, wrapper: &str) -> Vec<String> {
    let Some(caps) = pattern.captures(wrapper) else {
        return Vec::new();
    };
    let distinct: BTreeSet<&str> = QUOTED_COLUMN
        .captures_iter(&caps[1])
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    distinct.into_iter().map(str::to_string).collect()
}

/// Swap the projections of `row` and `column` when the column comes first.
///
/// Trailing commas stay on their lines.
fn row_dimension_first(select: &str, row: &str, column: &str) -> String {
    let mut lines: Vec<String> = select.split('\n').map(str::to_string).collect();
    let row_idx = projection_line(&lines, row);
    let column_idx = projection_line(&lines, column);

    if let (Some(r), Some(c)) = (row_idx, column_idx) {
        if c < r {
            let (row_body, row_comma) = split_comma(&lines[r]);
            let (column_body, column_comma) = split_comma(&lines[c]);
            let new_c = format!("{}{}", row_body, column_comma);
            let new_r = format!("{}{}", column_body, row_comma);
            lines[c] = new_c;
            lines[r] = new_r;
        }
    }

    lines.join("\n")
}

fn projection_line(lines: &[String], column: &str) -> Option<usize> {
    let suffix = format!("AS \"{}\"", column);
    lines.iter().position(|line| {
        let line = line.trim_end();
        let line = line.strip_suffix(',').unwrap_or(line).trim_end();
        line.len() >= suffix.len()
            && line.is_char_boundary(line.len() - suffix.len())
            && line[line.len() - suffix.len()..].eq_ignore_ascii_case(&suffix)
    })
}

fn split_comma(line: &str) -> (&str, &str) {
    let trimmed = line.trim_end();
    match trimmed.strip_suffix(',') {
        Some(body) => (body, ","),
        None => (trimmed, ""),
    }
}
