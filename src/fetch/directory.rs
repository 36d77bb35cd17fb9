// src/fetch/directory.rs
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::source::{FetchError, FetchResult, QuerySource};
use crate::config::{Settings, SettingsError};

/// A [`QuerySource`] reading `<root>/<query_id>.sql` files.
///
/// Slugs and connection dialects come from settings rather than the files.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    slugs: HashMap<String, String>,
    connections: HashMap<String, String>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            slugs: HashMap::new(),
            connections: HashMap::new(),
        }
    }

    /// Build from the `[source]` and `[connections]` settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        let connections = settings
            .connections
            .iter()
            .map(|(name, conn)| Ok((name.clone(), conn.resolved_dialect()?)))
            .collect::<Result<HashMap<_, _>, SettingsError>>()?;

        Ok(Self {
            root: settings.sql_dir()?,
            slugs: settings.source.slugs.clone(),
            connections,
        })
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
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

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn query_path(&self, query_id: &str) -> FetchResult<PathBuf> {
        let valid = !query_id.is_empty()
            && query_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(FetchError::InvalidId(query_id.to_string()));
        }
        Ok(self.root.join(format!("{}.sql", query_id)))
    }
}

#[async_trait]
impl QuerySource for DirectorySource {
    async fn fetch_query_sql(&self, query_id: &str) -> FetchResult<String> {
        let path = self.query_path(query_id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(sql) => Ok(sql),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FetchError::QueryNotFound(query_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
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
