//! Shared helper functions for dialect-aware naming.

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: the quoted naming family
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// =============================================================================
// Flattening
// =============================================================================

/// Replace every `.` with `_`.
/// Used by: the flattened naming family (BigQuery)
pub fn flatten(field_id: &str) -> String {
    field_id.replace('.', "_")
}
