//! Per-query SQL fetching.
//!
//! Every query in a blend is fetched concurrently. A query that cannot be
//! resolved does not fail the compile: its SQL is replaced by a comment
//! sentinel so the blended statement still shows where the problem is.

mod directory;
mod memory;
mod source;

pub use directory::DirectorySource;
pub use memory::MemorySource;
pub use source::{FetchError, FetchResult, QuerySource};

use futures::future::join_all;
use tracing::Instrument;

use crate::model::Query;

/// Stand-in SQL for a query that could not be fetched.
pub fn invalid_query_sentinel(query_id: &str) -> String {
    format!(
        "-- INVALID_QUERY_ID: {}, couldn't generate SQL. Please contact your BI administrator.",
        query_id
    )
}

/// Fetch one query's SQL, falling back to slug resolution.
///
/// Tries `query_id` directly, then treats it as a slug and retries once with
/// the resolved id. Returns [`invalid_query_sentinel`] when both fail.
pub async fn fetch_with_fallback<S>(source: &S, query_id: &str) -> String
where
    S: QuerySource + ?Sized,
{
    let direct = match source.fetch_query_sql(query_id).await {
        Ok(sql) => return sql,
        Err(e) => e,
    };
    tracing::debug!(error = %direct, "direct fetch failed, trying slug");

    let resolved = match source.resolve_slug(query_id).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "query could not be resolved");
            return invalid_query_sentinel(query_id);
        }
    };

    match source.fetch_query_sql(&resolved).await {
        Ok(sql) => sql,
        Err(e) => {
            tracing::warn!(resolved_id = %resolved, error = %e, "query could not be fetched");
            invalid_query_sentinel(query_id)
        }
    }
}

/// Fetch SQL for every query concurrently, preserving order.
pub async fn fetch_all<S>(source: &S, queries: &[Query]) -> Vec<String>
where
    S: QuerySource + ?Sized,
{
    let futures: Vec<_> = queries
        .iter()
        .map(|query| {
            let span = tracing::info_span!(
                "fetch_query",
                query_id = %query.id,
                source_id = %query.source_id()
            );
            fetch_with_fallback(source, query.source_id()).instrument(span)
        })
        .collect();

    join_all(futures).await
}
