//! Blend composition.
//!
//! Turns the working SQL of every query into one statement:
//!
//! ```text
//! -- b=<token>
//! WITH q1 AS (
//! <stripped SQL of q1>
//! ),
//! q2 AS (
//! <stripped SQL of q2>
//! )
//! SELECT q1."orders.id" AS "q1.orders.id", q2."users.name" AS "q2.users.name" FROM q1
//! LEFT JOIN q2 ON q1."orders.user_id" = q2."users.id"
//! ```
//!
//! Composition is pure: the same blend, SQL, and options always produce the
//! same bytes.

pub mod format;
pub mod strip;

pub use format::pretty_print;
pub use strip::{or_placeholder, strip_trailing_clauses, EMPTY_SQL_PLACEHOLDER};

use serde::Serialize;

use crate::model::{BlendSet, FieldKind, JoinSpec};
use crate::sql::dialect::{field_getter, field_transform, Dialect};

// ============================================================================
// Options
// ============================================================================

/// Options for composing a blended statement.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    pub dialect: Dialect,

    /// Prepended as `-- b=<token>` so the statement can be traced back.
    pub round_trip_token: Option<String>,

    pub pretty: bool,
}

impl ComposeOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            round_trip_token: None,
            pretty: true,
        }
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

/// One projected column of the blended statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlendField {
    pub query_id: String,
    pub query_alias: String,
    pub field_id: String,
    pub label: String,
    pub kind: FieldKind,
    /// Column name in the blended result.
    pub sql_alias: String,
}

/// A composed statement and the columns it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub sql: String,
    pub fields: Vec<BlendField>,
}

// ============================================================================
// Composition
// ============================================================================

/// Compose the blended statement.
///
/// `query_sql[i]` is the working SQL of `blend.queries[i]`; missing entries
/// are treated as empty.
pub fn compose(blend: &BlendSet, query_sql: &[String], options: &ComposeOptions) -> Composed {
    let dialect = options.dialect;
    let fields = blend_fields(blend, dialect);

    let mut sql = String::new();
    if let Some(token) = &options.round_trip_token {
        sql.push_str(&format!("-- b={}\n", token));
    }

    sql.push_str(&with_clause(blend, query_sql));
    sql.push('\n');
    sql.push_str(&select_clause(blend, &fields, dialect));

    for line in join_clauses(blend, dialect) {
        sql.push('\n');
        sql.push_str(&line);
    }

    let sql = if options.pretty {
        pretty_print(&sql)
    } else {
        sql
    };

    Composed { sql, fields }
}

/// Every selected field of every query, in blend order.
pub fn blend_fields(blend: &BlendSet, dialect: Dialect) -> Vec<BlendField> {
    blend
        .queries
        .iter()
        .flat_map(|query| {
            query.fields.iter().map(move |field| BlendField {
                query_id: query.id.clone(),
                query_alias: query.alias().to_string(),
                field_id: field.id.clone(),
                label: field.label.clone(),
                kind: field.kind,
                sql_alias: field_transform(query.alias(), &field.id, dialect),
            })
        })
        .collect()
}

/// `WITH a AS (...),\nb AS (...)` over the stripped query SQL.
fn with_clause(blend: &BlendSet, query_sql: &[String]) -> String {
    let ctes: Vec<String> = blend
        .queries
        .iter()
        .enumerate()
        .map(|(i, query)| {
            let raw = query_sql.get(i).map(String::as_str).unwrap_or_default();
            let body = or_placeholder(strip_trailing_clauses(raw, query.respect_limit), &query.id);
            format!("{} AS (\n{}\n)", query.alias(), body)
        })
        .collect();

    format!("WITH {}", ctes.join(",\n"))
}

fn select_clause(blend: &BlendSet, fields: &[BlendField], dialect: Dialect) -> String {
    let projection = if fields.is_empty() {
        "*".to_string()
    } else {
        fields
            .iter()
            .map(|f| {
                format!(
                    "{} AS {}",
                    field_getter(&f.query_alias, &f.field_id, dialect),
                    f.sql_alias
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    let root = blend.root().map(|q| q.alias()).unwrap_or_default();
    format!("SELECT {} FROM {}", projection, root)
}

/// One join line per non-root query, in blend order.
pub fn join_clauses(blend: &BlendSet, dialect: Dialect) -> Vec<String> {
    let aliases = blend.aliases();

    blend
        .queries
        .iter()
        .skip(1)
        .filter_map(|query| match blend.joins.get(&query.id) {
            Some(join) => Some(join_line(join, query.alias(), &aliases, dialect)),
            None => {
                tracing::warn!(query_id = %query.id, "no join defined, query left out of FROM");
                None
            }
        })
        .collect()
}

fn join_line(
    join: &JoinSpec,
    alias: &str,
    aliases: &std::collections::HashMap<&str, &str>,
    dialect: Dialect,
) -> String {
    let keyword = join.join_type.keyword();

    if join.join_type.is_cross() {
        if !join.predicates.is_empty() {
            tracing::warn!(to_query_id = %join.to_query_id, "ignoring predicates on cross join");
        }
        return format!("{} {}", keyword, alias);
    }

    if join.predicates.is_empty() {
        return format!("{} {}", keyword, alias);
    }

    let predicates: Vec<String> = join
        .predicates
        .iter()
        .map(|p| {
            let from_alias = aliases
                .get(p.from_query_id.as_str())
                .copied()
                .unwrap_or(p.from_query_id.as_str());
            format!(
                "{} = {}",
                field_getter(from_alias, &p.from_field, dialect),
                field_getter(alias, &p.to_field, dialect)
            )
        })
        .collect();

    format!("{} {} ON {}", keyword, alias, predicates.join(" AND "))
}
