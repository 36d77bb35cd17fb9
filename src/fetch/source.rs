//! QuerySource trait definition.
//!
//! A `QuerySource` is the compiler's only view of the upstream BI service:
//! it turns query identifiers into compiled SQL and connection names into
//! dialect names. Production callers wrap their service client; the crate
//! ships [`MemorySource`](super::MemorySource) and
//! [`DirectorySource`](super::DirectorySource).

use async_trait::async_trait;

/// Errors raised by a [`QuerySource`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Query not found: {0}")]
    QueryNotFound(String),

    #[error("Slug not found: {0}")]
    SlugNotFound(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Invalid query id: {0}")]
    InvalidId(String),

    #[error("Failed to read query SQL: {0}")]
    Io(#[from] std::io::Error),

    /// Any other failure reported by a service-backed source.
    #[error("Upstream error: {0}")]
    Upstream(String),
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Upstream access needed to compile a blend.
///
/// # Example
///
/// ```ignore
/// use sqlblend::fetch::{MemorySource, QuerySource};
///
/// let source = MemorySource::new().with_query("42", "SELECT 1");
/// let sql = source.fetch_query_sql("42").await?;
/// ```
#[async_trait]
pub trait QuerySource: Send + Sync {
    /// Compiled SQL text for a query id.
    async fn fetch_query_sql(&self, query_id: &str) -> FetchResult<String>;

    /// Resolve a shared-link slug to a query id.
    async fn resolve_slug(&self, slug: &str) -> FetchResult<String>;

    /// Dialect name of a named connection, e.g. `bigquery_standard_sql`.
    async fn connection_dialect(&self, connection_name: &str) -> FetchResult<String>;
}
