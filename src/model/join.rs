// src/model/join.rs
use serde::{Deserialize, Serialize};

/// Join type between two blended queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    /// SQL keyword for the join.
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }

    pub fn is_cross(&self) -> bool {
        matches!(self, JoinType::Cross)
    }
}

/// One equality predicate: `<from_query>.<from_field> = <to_query>.<to_field>`.
///
/// The right-hand side always belongs to the query owning the [`JoinSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPair {
    pub from_query_id: String,
    pub from_field: String,
    pub to_field: String,
}

impl FieldPair {
    pub fn new(
        from_query_id: impl Into<String>,
        from_field: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self {
            from_query_id: from_query_id.into(),
            from_field: from_field.into(),
            to_field: to_field.into(),
        }
    }
}

/// How a non-root query joins into the blend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub to_query_id: String,

    #[serde(default)]
    pub join_type: JoinType,

    #[serde(default)]
    pub predicates: Vec<FieldPair>,
}

impl JoinSpec {
    pub fn new(to_query_id: impl Into<String>, join_type: JoinType) -> Self {
        Self {
            to_query_id: to_query_id.into(),
            join_type,
            predicates: Vec::new(),
        }
    }

    pub fn on(
        mut self,
        from_query_id: impl Into<String>,
        from_field: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        self.predicates
            .push(FieldPair::new(from_query_id, from_field, to_field));
        self
    }
}
