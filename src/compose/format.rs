// src/compose/format.rs
//! SQL pretty-printing.

use sqlformat::{FormatOptions, QueryParams};

/// Pretty-print blended SQL.
///
/// The formatter output is used only when it keeps every non-whitespace
/// character of the input in order. Upstream SQL contains identifiers such
/// as `LR$ZK...` that a formatter may treat as placeholders; when that
/// happens the unformatted text is returned.
pub fn pretty_print(sql: &str) -> String {
    let formatted = sqlformat::format(sql, &QueryParams::None, &FormatOptions::default());

    if same_tokens(sql, &formatted) {
        formatted
    } else {
        tracing::warn!("formatter altered SQL content, keeping unformatted output");
        sql.to_string()
    }
}

fn same_tokens(a: &str, b: &str) -> bool {
    a.chars()
        .filter(|c| !c.is_whitespace())
        .eq(b.chars().filter(|c| !c.is_whitespace()))
}
