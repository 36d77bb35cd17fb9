//! End-to-end compilation of a blend to SQL.
//!
//! ```text
//! BlendRequest → fetch (concurrent) → [segment → extract PDT meta → rewrite] → strip → compose → SQL
//! ```
//!
//! The bracketed steps only run when stable views are requested.
//!
//! # Example
//!
//! ```ignore
//! use sqlblend::compile::{compile_blend, BlendRequest};
//! use sqlblend::fetch::MemorySource;
//! use sqlblend::model::{BlendSet, FieldRef, JoinSpec, JoinType, Query};
//! use sqlblend::sql::Dialect;
//!
//! let source = MemorySource::new()
//!     .with_query("a", "SELECT 1 AS \"id\"")
//!     .with_query("b", "SELECT 1 AS \"id\"");
//!
//! let blend = BlendSet::new(vec![
//!     Query::new("a").with_field(FieldRef::dimension("id")),
//!     Query::new("b").with_field(FieldRef::dimension("id")),
//! ])
//! .with_join(JoinSpec::new("b", JoinType::Inner).on("a", "id", "id"));
//!
//! let request = BlendRequest::new(blend).with_dialect(Dialect::Snowflake);
//! let output = compile_blend(&source, &request).await?;
//! println!("{}", output.sql);
//! ```

use crate::compose::{compose, BlendField, ComposeOptions};
use crate::config::Settings;
use crate::fetch::{fetch_all, FetchError, QuerySource};
use crate::model::BlendSet;
use crate::parser::{parse_segments, ParseError};
use crate::pdt::{extract_all, rewrite_stable_views};
use crate::sql::Dialect;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Blend has no queries")]
    EmptyBlend,

    #[error("Cannot resolve dialect for connection '{connection}': {source}")]
    Dialect {
        connection: String,
        #[source]
        source: FetchError,
    },

    #[error("No connection or dialect given")]
    MissingDialect,
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Request
// ============================================================================

/// Everything a compile needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct BlendRequest {
    pub blend: BlendSet,

    /// Connection whose dialect drives field naming.
    pub connection: Option<String>,

    /// Dialect override; skips the connection lookup.
    pub dialect: Option<Dialect>,

    /// Rewrite ephemeral derived tables to stable views.
    pub use_stable_views: bool,

    /// Prepended as `-- b=<token>`.
    pub round_trip_token: Option<String>,

    pub pretty: bool,
}

impl BlendRequest {
    pub fn new(blend: BlendSet) -> Self {
        Self {
            blend,
            connection: None,
            dialect: None,
            use_stable_views: false,
            round_trip_token: None,
            pretty: true,
        }
    }

    /// Take stable-view and formatting defaults from settings.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.use_stable_views = settings.compile.stable_views;
        self.pretty = settings.compile.pretty;
        self
    }

    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn with_stable_views(mut self, enabled: bool) -> Self {
        self.use_stable_views = enabled;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.round_trip_token = Some(token.into());
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling a blend.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The blended SQL statement.
    pub sql: String,

    /// The dialect used for field naming.
    pub dialect: Dialect,

    /// Projected columns, in output order.
    pub fields: Vec<BlendField>,
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Compile a blend to one SQL statement.
///
/// Unresolvable queries and unsupported pivots do not fail the compile; they
/// show up as comment placeholders inside their CTE.
pub async fn compile_blend<S>(source: &S, request: &BlendRequest) -> CompileResult<CompileOutput>
where
    S: QuerySource + ?Sized,
{
    let blend = &request.blend;
    if blend.queries.is_empty() {
        return Err(CompileError::EmptyBlend);
    }

    let dialect = resolve_dialect(source, request).await?;
    tracing::debug!(%dialect, queries = blend.queries.len(), "compiling blend");

    let fetched = fetch_all(source, &blend.queries).await;

    let working: Vec<String> = if request.use_stable_views {
        blend
            .queries
            .iter()
            .zip(fetched)
            .map(|(query, raw)| match stable_view_sql(&raw) {
                Ok(sql) => sql,
                Err(e) => {
                    tracing::warn!(query_id = %query.id, error = %e, "cannot prepare query SQL");
                    format!("-- Error: {}", e)
                }
            })
            .collect()
    } else {
        fetched
    };

    let mut options = ComposeOptions::new(dialect).with_pretty(request.pretty);
    if let Some(token) = &request.round_trip_token {
        options = options.with_token(token.clone());
    }

    let composed = compose(blend, &working, &options);

    Ok(CompileOutput {
        sql: composed.sql,
        dialect,
        fields: composed.fields,
    })
}

/// The select segment of `raw` with ephemeral derived tables pointed at
/// their stable views.
pub fn stable_view_sql(raw: &str) -> Result<String, ParseError> {
    let segments = parse_segments(raw)?;
    let metas = extract_all(&segments.materialization_blocks);
    Ok(rewrite_stable_views(&segments.select, &metas))
}

async fn resolve_dialect<S>(source: &S, request: &BlendRequest) -> CompileResult<Dialect>
where
    S: QuerySource + ?Sized,
{
    if let Some(dialect) = request.dialect {
        return Ok(dialect);
    }

    let connection = request
        .connection
        .as_deref()
        .ok_or(CompileError::MissingDialect)?;

    let name = source
        .connection_dialect(connection)
        .await
        .map_err(|source| CompileError::Dialect {
            connection: connection.to_string(),
            source,
        })?;

    Ok(Dialect::from_name(&name))
}

// ============================================================================
// Tests
// ============================================================================
