//! Persistent derived tables.
//!
//! The upstream layer materializes derived tables into a scratch schema under
//! ephemeral names like `LR$ZKWYB1763531790092_orders`, and also maintains a
//! stable view `<schema>.<key>_<model>_<view>` pointing at the current build.
//! Blended SQL that should keep working after a rebuild references the view.

pub mod meta;
pub mod rewrite;

pub use meta::{extract, extract_all, PdtMeta};
pub use rewrite::rewrite_stable_views;
