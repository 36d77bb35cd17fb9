// src/sql/scan.rs
//! Lexical scanning of SQL text.
//!
//! The scanner understands just enough SQL to answer one question: is this
//! byte part of top-level code? Text inside parentheses, string literals,
//! quoted identifiers, and comments is not.
//!
//! Quotes end on either a doubled quote or a backslash escape, so both
//! ANSI `'O''Brien'` and BigQuery `'O\'Brien'` stay inside the literal.

use regex::{Match, Regex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    SingleQuote,
    DoubleQuote,
    Backtick,
    Bracket,
    LineComment,
    BlockComment,
}

/// Walk `sql`, calling `on_code(offset, depth)` for every byte of code.
///
/// Returns the state and parenthesis depth at the end of the input.
fn scan(sql: &str, mut on_code: impl FnMut(usize, usize)) -> (State, usize) {
    let bytes = sql.as_bytes();
    let mut state = State::Code;
    let mut depth: usize = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        match state {
            State::Code => match b {
                b'\'' => state = State::SingleQuote,
                b'"' => state = State::DoubleQuote,
                b'`' => state = State::Backtick,
                b'[' => state = State::Bracket,
                b'-' if next == Some(b'-') => {
                    state = State::LineComment;
                    i += 1;
                }
                b'/' if next == Some(b'*') => {
                    state = State::BlockComment;
                    i += 1;
                }
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                _ => on_code(i, depth),
            },
            State::SingleQuote => {
                if b == b'\\' {
                    i += 1;
                } else if b == b'\'' {
                    if next == Some(b'\'') {
                        i += 1;
                    } else {
                        state = State::Code;
                    }
                }
            }
            State::DoubleQuote => {
                if b == b'\\' {
                    i += 1;
                } else if b == b'"' {
                    if next == Some(b'"') {
                        i += 1;
                    } else {
                        state = State::Code;
                    }
                }
            }
            State::Backtick => {
                if b == b'\\' {
                    i += 1;
                } else if b == b'`' {
                    state = State::Code;
                }
            }
            State::Bracket => {
                if b == b']' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                    on_code(i, depth);
                }
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = State::Code;
                    i += 1;
                }
            }
        }
        i += 1;
    }

    (state, depth)
}

/// Per-byte mask of `sql`: `true` where the byte is top-level code.
///
/// The returned vector has exactly `sql.len()` entries.
pub fn top_level_mask(sql: &str) -> Vec<bool> {
    let mut mask = vec![false; sql.len()];
    scan(sql, |offset, depth| mask[offset] = depth == 0);
    mask
}

/// Whether text starting at byte `offset` sits outside parentheses, quotes,
/// and comments. `offset` must be a char boundary.
pub fn is_top_level_at(sql: &str, offset: usize) -> bool {
    match sql.get(..offset) {
        Some(prefix) => scan(prefix, |_, _| {}) == (State::Code, 0),
        None => false,
    }
}

/// The last match of `pattern` that starts in top-level code.
pub fn last_top_level_match<'t>(sql: &'t str, pattern: &Regex) -> Option<Match<'t>> {
    let mask = top_level_mask(sql);
    pattern
        .find_iter(sql)
        .filter(|m| mask.get(m.start()).copied().unwrap_or(false))
        .last()
}
