// src/compose/strip.rs
//! Trailing-clause removal for query SQL headed into a CTE.

use std::sync::LazyLock;

use regex::Regex;

use crate::sql::scan::{is_top_level_at, last_top_level_match};

/// Placeholder CTE body for SQL that stripped down to nothing.
pub const EMPTY_SQL_PLACEHOLDER: &str = "-- Error: Processed SQL was empty";

static TOTAL_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)--\s*sql for creating the total.*\z").unwrap());

static ROW_CAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:LIMIT\s+\d+(?:\s+OFFSET\s+\d+)?|FETCH\s+(?:NEXT|FIRST)\s+\d+\s+ROWS?\s+ONLY)\s*(?:--[^\n]*)?\z",
    )
    .unwrap()
});

static CAP_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:LIMIT|FETCH|OFFSET)\b").unwrap());

static ORDER_BY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bORDER\s+BY\b").unwrap());

static ORDER_BY_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[a-zA-Z0-9_.,\s()'"`\[\]-]+$"#).unwrap());

/// Strip clauses that cannot appear inside a CTE body.
///
/// Removes a trailing semicolon, the total-row block, a trailing row cap,
/// and a trailing top-level `ORDER BY`. With `respect_limit` a trailing row
/// cap and the `ORDER BY` in front of it are kept. An `ORDER BY` whose tail
/// still carries a row cap is never stripped on its own.
pub fn strip_trailing_clauses(sql: &str, respect_limit: bool) -> String {
    let mut body = sql.trim();

    if let Some(m) = TOTAL_BLOCK.find(body) {
        if is_top_level_at(body, m.start()) {
            body = body[..m.start()].trim_end();
        }
    }
    body = trim_semicolons(body);

    if let Some(cap) = ROW_CAP.find(body) {
        if is_top_level_at(body, cap.start()) {
            if respect_limit {
                return body.to_string();
            }
            body = trim_semicolons(body[..cap.start()].trim_end());
        }
    }

    if let Some(order) = last_top_level_match(body, &ORDER_BY) {
        let tail = &body[order.end()..];
        if ORDER_BY_TAIL.is_match(tail) && last_top_level_match(tail, &CAP_KEYWORD).is_none() {
            body = body[..order.start()].trim_end();
        }
    }

    body.to_string()
}

/// `sql` if it has content, otherwise [`EMPTY_SQL_PLACEHOLDER`].
pub fn or_placeholder(sql: String, query_id: &str) -> String {
    if sql.trim().is_empty() {
        tracing::warn!(query_id, "processed SQL was empty");
        EMPTY_SQL_PLACEHOLDER.to_string()
    } else {
        sql
    }
}

fn trim_semicolons(sql: &str) -> &str {
    sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}
