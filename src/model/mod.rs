//! Blend data model: source queries, their fields, and the join tree.

pub mod join;
pub mod query;

pub use join::{FieldPair, JoinSpec, JoinType};
pub use query::{is_valid_alias, sanitize_alias, FieldKind, FieldRef, Query};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A complete blend definition: the ordered queries plus one join per non-root query.
///
/// `queries[0]` is the root of the join tree. `joins` is keyed by the id of the
/// query being joined in (the join's `to_query_id`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendSet {
    pub queries: Vec<Query>,

    #[serde(default)]
    pub joins: HashMap<String, JoinSpec>,
}

impl BlendSet {
    pub fn new(queries: Vec<Query>) -> Self {
        Self {
            queries,
            joins: HashMap::new(),
        }
    }

    /// Add a join, keyed by its target query.
    pub fn with_join(mut self, join: JoinSpec) -> Self {
        self.joins.insert(join.to_query_id.clone(), join);
        self
    }

    /// The root query, if any.
    pub fn root(&self) -> Option<&Query> {
        self.queries.first()
    }

    pub fn query(&self, id: &str) -> Option<&Query> {
        self.queries.iter().find(|q| q.id == id)
    }

    /// Position of a query in blend order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.queries.iter().position(|q| q.id == id)
    }

    /// Run every explicit alias through [`sanitize_alias`].
    ///
    /// Queries without an alias keep falling back to their id.
    pub fn sanitize_aliases(&mut self) {
        for query in &mut self.queries {
            if let Some(alias) = query.alias.as_mut() {
                *alias = sanitize_alias(alias);
            }
        }
    }

    /// Map of query id → effective SQL alias.
    pub fn aliases(&self) -> HashMap<&str, &str> {
        self.queries
            .iter()
            .map(|q| (q.id.as_str(), q.alias()))
            .collect()
    }
}
