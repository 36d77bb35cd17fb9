// src/fetch/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;

use super::source::{FetchError, FetchResult, QuerySource};

/// A [`QuerySource`] backed by in-memory maps.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    queries: HashMap<String, String>,
    slugs: HashMap<String, String>,
    connections: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query_id: impl Into<String>, sql: impl Into<String>) -> Self {
        self.queries.insert(query_id.into(), sql.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>, query_id: impl Into<String>) -> Self {
        self.slugs.insert(slug.into(), query_id.into());
        self
    }

    pub fn with_connection(mut self, name: impl Into<String>, dialect: impl Into<String>) -> Self {
        self.connections.insert(name.into(), dialect.into());
        self
    }
}

#[async_trait]
impl QuerySource for MemorySource {
    async fn fetch_query_sql(&self, query_id: &str) -> FetchResult<String> {
        self.queries
            .get(query_id)
            .cloned()
            .ok_or_else(|| FetchError::QueryNotFound(query_id.to_string()))
    }

    async fn resolve_slug(&self, slug: &str) -> FetchResult<String> {
        self.slugs
            .get(slug)
            .cloned()
            .ok_or_else(|| FetchError::SlugNotFound(slug.to_string()))
    }

    async fn connection_dialect(&self, connection_name: &str) -> FetchResult<String> {
        self.connections
            .get(connection_name)
            .cloned()
            .ok_or_else(|| FetchError::ConnectionNotFound(connection_name.to_string()))
    }
}
