//! # sqlblend
//!
//! Blends the results of several independently-defined BI queries into one
//! SQL statement.
//!
//! ## Architecture
//!
//! Each source query has already been compiled to warehouse SQL by the
//! upstream semantic layer. sqlblend never re-derives that logic; it performs
//! text surgery on the emitted SQL and joins the pieces as CTEs:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              BlendSet (queries + join tree)              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [fetch - concurrent, slug fallback]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Raw SQL per query                        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [parser + pdt - stable views only]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Select segment, derived tables → stable views        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compose]
//! ┌─────────────────────────────────────────────────────────┐
//! │   WITH q1 AS (...), q2 AS (...) SELECT ... FROM q1 JOIN  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod compile;
pub mod compose;
pub mod config;
pub mod fetch;
pub mod model;
pub mod parser;
pub mod pdt;
pub mod sql;
pub mod validation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile_blend, BlendRequest, CompileError, CompileOutput};
    pub use crate::compose::{compose, BlendField, ComposeOptions};
    pub use crate::fetch::{DirectorySource, FetchError, MemorySource, QuerySource};
    pub use crate::model::{
        sanitize_alias, BlendSet, FieldKind, FieldPair, FieldRef, JoinSpec, JoinType, Query,
    };
    pub use crate::parser::{parse_segments, split_segments, ParseError, ParsedSegments};
    pub use crate::pdt::{extract, rewrite_stable_views, PdtMeta};
    pub use crate::sql::{field_transform, Dialect, FieldNaming};
    pub use crate::validation::{validate, ValidationError};
}

// Also export at crate root for convenience
pub use compile::{compile_blend, BlendRequest};
pub use sql::Dialect;
