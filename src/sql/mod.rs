//! SQL text helpers.
//!
//! Nothing here parses SQL. The compiler works on text emitted by the
//! upstream semantic layer and only needs:
//!
//! - [`dialect`] - dialect identification and the field-naming contract
//! - [`scan`] - a lexical scanner that tells top-level code apart from
//!   parenthesized, quoted, or commented text

pub mod dialect;
pub mod scan;

pub use dialect::{field_getter, field_transform, Dialect, FieldNaming};
pub use scan::{is_top_level_at, last_top_level_match, top_level_mask};
