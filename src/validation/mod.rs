//! Validation of blend definitions.
//!
//! The composer assumes a well-formed join tree: `queries[0]` is the root,
//! every other query has exactly one join, and every join predicate reads
//! from a query declared earlier. [`validate`] checks all of it up front and
//! reports every problem at once.

use std::collections::{HashMap, HashSet};

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::model::{is_valid_alias, BlendSet};

/// Validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The blend has no queries.
    EmptyBlend,
    /// Two queries share an id.
    DuplicateQueryId { query_id: String },
    /// Alias does not match `^[a-z][a-z0-9_]*$`.
    InvalidAlias { query_id: String, alias: String },
    /// Two queries resolve to the same alias.
    DuplicateAlias { alias: String, query_ids: Vec<String> },
    /// The root query is the target of a join.
    RootHasJoin { query_id: String },
    /// A non-root query has no join.
    MissingJoin { query_id: String },
    /// A join is keyed to an unknown query, or its key and target disagree.
    InvalidJoinTarget { key: String, to_query_id: String },
    /// A predicate reads from a query that does not exist.
    UndefinedReference { query_id: String, reference: String },
    /// A predicate reads from a query declared at or after the joined one.
    ForwardReference { query_id: String, reference: String },
    /// A predicate has an empty field name.
    EmptyPredicateField { query_id: String, index: usize },
    /// A non-cross join has no predicates.
    MissingPredicates { query_id: String, join_type: String },
    /// A cross join carries predicates.
    CrossJoinPredicates { query_id: String },
    /// Join references form a cycle.
    CircularDependency { cycle: Vec<String> },
    /// A joined query cannot be reached from the root.
    Disconnected { query_id: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyBlend => write!(f, "Blend has no queries"),
            ValidationError::DuplicateQueryId { query_id } => {
                write!(f, "Duplicate query id: '{}'", query_id)
            }
            ValidationError::InvalidAlias { query_id, alias } => {
                write!(
                    f,
                    "Query '{}' has invalid alias '{}': must match ^[a-z][a-z0-9_]*$",
                    query_id, alias
                )
            }
            ValidationError::DuplicateAlias { alias, query_ids } => {
                write!(
                    f,
                    "Alias '{}' is used by queries {}",
                    alias,
                    query_ids.join(", ")
                )
            }
            ValidationError::RootHasJoin { query_id } => {
                write!(f, "Root query '{}' cannot be joined", query_id)
            }
            ValidationError::MissingJoin { query_id } => {
                write!(f, "Query '{}' has no join", query_id)
            }
            ValidationError::InvalidJoinTarget { key, to_query_id } => {
                write!(
                    f,
                    "Join '{}' targets '{}', which is not a query of this blend",
                    key, to_query_id
                )
            }
            ValidationError::UndefinedReference {
                query_id,
                reference,
            } => {
                write!(
                    f,
                    "Join for '{}' references undefined query '{}'",
                    query_id, reference
                )
            }
            ValidationError::ForwardReference {
                query_id,
                reference,
            } => {
                write!(
                    f,
                    "Join for '{}' references '{}', which is not declared before it",
                    query_id, reference
                )
            }
            ValidationError::EmptyPredicateField { query_id, index } => {
                write!(
                    f,
                    "Join for '{}' has an empty field in predicate {}",
                    query_id, index
                )
            }
            ValidationError::MissingPredicates {
                query_id,
                join_type,
            } => {
                write!(
                    f,
                    "{} for '{}' needs at least one predicate",
                    join_type, query_id
                )
            }
            ValidationError::CrossJoinPredicates { query_id } => {
                write!(f, "Cross join for '{}' cannot have predicates", query_id)
            }
            ValidationError::CircularDependency { cycle } => {
                write!(f, "Circular join dependency: {}", cycle.join(" -> "))
            }
            ValidationError::Disconnected { query_id } => {
                write!(f, "Query '{}' is not connected to the root query", query_id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a blend definition.
pub fn validate(blend: &BlendSet) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if blend.queries.is_empty() {
        errors.push(ValidationError::EmptyBlend);
        return Err(errors);
    }

    // Validate ids and aliases
    validate_unique_ids(blend, &mut errors);
    validate_aliases(blend, &mut errors);

    // Validate joins
    validate_join_targets(blend, &mut errors);
    validate_predicates(blend, &mut errors);

    // Validate the join graph
    validate_join_graph(blend, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_ids(blend: &BlendSet, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for query in &blend.queries {
        if !seen.insert(query.id.as_str()) {
            errors.push(ValidationError::DuplicateQueryId {
                query_id: query.id.clone(),
            });
        }
    }
}

fn validate_aliases(blend: &BlendSet, errors: &mut Vec<ValidationError>) {
    let mut by_alias: HashMap<&str, Vec<String>> = HashMap::new();

    for query in &blend.queries {
        let alias = query.alias();
        if !is_valid_alias(alias) {
            errors.push(ValidationError::InvalidAlias {
                query_id: query.id.clone(),
                alias: alias.to_string(),
            });
        }
        by_alias.entry(alias).or_default().push(query.id.clone());
    }

    // Report in blend order
    let mut reported = HashSet::new();
    for query in &blend.queries {
        let alias = query.alias();
        if let Some(ids) = by_alias.get(alias) {
            if ids.len() > 1 && reported.insert(alias) {
                errors.push(ValidationError::DuplicateAlias {
                    alias: alias.to_string(),
                    query_ids: ids.clone(),
                });
            }
        }
    }
}

fn validate_join_targets(blend: &BlendSet, errors: &mut Vec<ValidationError>) {
    let root_id = blend.queries[0].id.as_str();

    // Iterate in sorted key order so reports are stable
    let mut keys: Vec<&String> = blend.joins.keys().collect();
    keys.sort();
    for key in keys {
        let join = &blend.joins[key];
        if join.to_query_id != *key || blend.query(key).is_none() {
            errors.push(ValidationError::InvalidJoinTarget {
                key: key.clone(),
                to_query_id: join.to_query_id.clone(),
            });
        } else if key == root_id {
            errors.push(ValidationError::RootHasJoin {
                query_id: key.clone(),
            });
        }
    }

    for query in blend.queries.iter().skip(1) {
        if !blend.joins.contains_key(&query.id) {
            errors.push(ValidationError::MissingJoin {
                query_id: query.id.clone(),
            });
        }
    }
}

fn validate_predicates(blend: &BlendSet, errors: &mut Vec<ValidationError>) {
    for (position, query) in blend.queries.iter().enumerate().skip(1) {
        let Some(join) = blend.joins.get(&query.id) else {
            continue;
        };

        if join.join_type.is_cross() {
            if !join.predicates.is_empty() {
                errors.push(ValidationError::CrossJoinPredicates {
                    query_id: query.id.clone(),
                });
            }
            continue;
        }

        if join.predicates.is_empty() {
            errors.push(ValidationError::MissingPredicates {
                query_id: query.id.clone(),
                join_type: join.join_type.keyword().to_string(),
            });
        }

        for (index, predicate) in join.predicates.iter().enumerate() {
            if predicate.from_field.trim().is_empty() || predicate.to_field.trim().is_empty() {
                errors.push(ValidationError::EmptyPredicateField {
                    query_id: query.id.clone(),
                    index,
                });
            }

            match blend.position(&predicate.from_query_id) {
                None => errors.push(ValidationError::UndefinedReference {
                    query_id: query.id.clone(),
                    reference: predicate.from_query_id.clone(),
                }),
                Some(from) if from >= position => errors.push(ValidationError::ForwardReference {
                    query_id: query.id.clone(),
                    reference: predicate.from_query_id.clone(),
                }),
                Some(_) => {}
            }
        }
    }
}

fn validate_join_graph(blend: &BlendSet, errors: &mut Vec<ValidationError>) {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for query in &blend.queries {
        nodes
            .entry(query.id.as_str())
            .or_insert_with(|| graph.add_node(query.id.as_str()));
    }

    let root = nodes[blend.queries[0].id.as_str()];
    let mut joined = Vec::new();

    for query in blend.queries.iter().skip(1) {
        let Some(join) = blend.joins.get(&query.id) else {
            continue;
        };
        let target = nodes[query.id.as_str()];
        joined.push(target);

        if join.join_type.is_cross() || join.predicates.is_empty() {
            graph.update_edge(root, target, ());
            continue;
        }

        for predicate in &join.predicates {
            if let Some(&source) = nodes.get(predicate.from_query_id.as_str()) {
                graph.update_edge(source, target, ());
            }
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        let start = cycle.node_id();
        let mut members = vec![graph[start].to_string()];
        if !graph.contains_edge(start, start) {
            let back = graph
                .neighbors(start)
                .find(|&n| has_path_connecting(&graph, n, start, None));
            if let Some(n) = back {
                members.push(graph[n].to_string());
            }
        }
        members.push(graph[start].to_string());
        errors.push(ValidationError::CircularDependency { cycle: members });
        return;
    }

    for target in joined {
        if !has_path_connecting(&graph, root, target, None) {
            errors.push(ValidationError::Disconnected {
                query_id: graph[target].to_string(),
            });
        }
    }
}
