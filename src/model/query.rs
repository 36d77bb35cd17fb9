// src/model/query.rs
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static ALIAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());

/// One source query taking part in a blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Session identity of the query. Stable for the lifetime of the blend.
    pub id: String,

    /// Upstream query identifier used to fetch SQL. Defaults to `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    /// SQL alias for the query's CTE. Falls back to `id` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldRef>,

    /// Keep the query's own row cap instead of stripping it.
    #[serde(default)]
    pub respect_limit: bool,
}

impl Query {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_id: None,
            alias: None,
            fields: Vec::new(),
            respect_limit: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_field(mut self, field: FieldRef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn respecting_limit(mut self) -> Self {
        self.respect_limit = true;
        self
    }

    /// The alias used in generated SQL.
    pub fn alias(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.id,
        }
    }

    /// The identifier handed to the query source.
    pub fn source_id(&self) -> &str {
        match self.source_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => &self.id,
        }
    }
}

/// Whether a field is a grouping column or an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Dimension,
    Measure,
}

/// A field selected by a source query, e.g. `order_items.order_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub id: String,

    #[serde(default)]
    pub label: String,

    pub kind: FieldKind,
}

impl FieldRef {
    pub fn dimension(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            kind: FieldKind::Dimension,
        }
    }

    pub fn measure(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            kind: FieldKind::Measure,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Check an alias against `^[a-z][a-z0-9_]*$`.
pub fn is_valid_alias(alias: &str) -> bool {
    ALIAS_PATTERN.is_match(alias)
}

/// Turn free-form input into alias characters.
///
/// Lowercases, then maps anything outside `[a-z0-9_]` to `_`. The result can
/// still fail [`is_valid_alias`] (e.g. a leading digit); callers validate after.
pub fn sanitize_alias(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' => c,
            _ => '_',
        })
        .collect()
}
