use sqlblend::model::{BlendSet, JoinSpec, JoinType, Query};
use sqlblend::validation::{self, ValidationError};

fn chain() -> BlendSet {
    BlendSet::new(vec![Query::new("a"), Query::new("b"), Query::new("c")])
        .with_join(JoinSpec::new("b", JoinType::Inner).on("a", "x", "x"))
        .with_join(JoinSpec::new("c", JoinType::Left).on("b", "y", "y"))
}

#[test]
fn test_validate_chain_and_star() {
    assert!(validation::validate(&chain()).is_ok());

    let star = BlendSet::new(vec![Query::new("a"), Query::new("b"), Query::new("c")])
        .with_join(JoinSpec::new("b", JoinType::Full).on("a", "x", "x"))
        .with_join(JoinSpec::new("c", JoinType::Cross));
    assert!(validation::validate(&star).is_ok());
}

#[test]
fn test_validate_single_query() {
    let blend = BlendSet::new(vec![Query::new("solo")]);
    assert!(validation::validate(&blend).is_ok());
}

#[test]
fn test_validate_from_json() {
    let json = r#"{
        "queries": [
            {"id": "orders", "fields": [{"id": "orders.id", "label": "ID", "kind": "dimension"}]},
            {"id": "users"}
        ],
        "joins": {
            "users": {
                "to_query_id": "users",
                "join_type": "left",
                "predicates": [
                    {"from_query_id": "orders", "from_field": "orders.user_id", "to_field": "users.id"}
                ]
            }
        }
    }"#;

    let blend: BlendSet = serde_json::from_str(json).unwrap();
    assert!(validation::validate(&blend).is_ok());
}

#[test]
fn test_missing_join() {
    let blend = BlendSet::new(vec![Query::new("a"), Query::new("b")]);

    assert_eq!(
        validation::validate(&blend).unwrap_err(),
        vec![ValidationError::MissingJoin {
            query_id: "b".into()
        }]
    );
}

#[test]
fn test_forward_reference() {
    let blend = BlendSet::new(vec![Query::new("a"), Query::new("b"), Query::new("c")])
        .with_join(JoinSpec::new("b", JoinType::Inner).on("c", "x", "x"))
        .with_join(JoinSpec::new("c", JoinType::Inner).on("a", "y", "y"));

    assert_eq!(
        validation::validate(&blend).unwrap_err(),
        vec![ValidationError::ForwardReference {
            query_id: "b".into(),
            reference: "c".into(),
        }]
    );
}

#[test]
fn test_undefined_reference() {
    let blend = BlendSet::new(vec![Query::new("a"), Query::new("b")])
        .with_join(JoinSpec::new("b", JoinType::Inner).on("zz", "x", "x"));

    let errors = validation::validate(&blend).unwrap_err();
    assert!(errors.contains(&ValidationError::UndefinedReference {
        query_id: "b".into(),
        reference: "zz".into(),
    }));
    assert!(errors.contains(&ValidationError::Disconnected {
        query_id: "b".into()
    }));
}

#[test]
fn test_mutual_references_are_circular() {
    let blend = BlendSet::new(vec![Query::new("a"), Query::new("b"), Query::new("c")])
        .with_join(JoinSpec::new("b", JoinType::Inner).on("c", "x", "x"))
        .with_join(JoinSpec::new("c", JoinType::Inner).on("b", "y", "y"));

    let errors = validation::validate(&blend).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::CircularDependency { cycle } if cycle.len() == 3)));
}

#[test]
fn test_alias_rules() {
    let invalid = BlendSet::new(vec![Query::new("a").with_alias("Orders 2024")]);
    assert_eq!(
        validation::validate(&invalid).unwrap_err(),
        vec![ValidationError::InvalidAlias {
            query_id: "a".into(),
            alias: "Orders 2024".into(),
        }]
    );

    let duplicate = BlendSet::new(vec![
        Query::new("a").with_alias("x"),
        Query::new("b").with_alias("x"),
    ])
    .with_join(JoinSpec::new("b", JoinType::Inner).on("a", "k", "k"));
    assert_eq!(
        validation::validate(&duplicate).unwrap_err(),
        vec![ValidationError::DuplicateAlias {
            alias: "x".into(),
            query_ids: vec!["a".into(), "b".into()],
        }]
    );
}

#[test]
fn test_duplicate_query_id() {
    let blend = BlendSet::new(vec![Query::new("a"), Query::new("a")]);

    let errors = validation::validate(&blend).unwrap_err();
    assert!(errors.contains(&ValidationError::DuplicateQueryId {
        query_id: "a".into()
    }));
}

#[test]
fn test_join_shape_errors() {
    let cross_with_on = BlendSet::new(vec![Query::new("a"), Query::new("b")])
        .with_join(JoinSpec::new("b", JoinType::Cross).on("a", "x", "x"));
    assert_eq!(
        validation::validate(&cross_with_on).unwrap_err(),
        vec![ValidationError::CrossJoinPredicates {
            query_id: "b".into()
        }]
    );

    let inner_without_on = BlendSet::new(vec![Query::new("a"), Query::new("b")])
        .with_join(JoinSpec::new("b", JoinType::Inner));
    assert_eq!(
        validation::validate(&inner_without_on).unwrap_err(),
        vec![ValidationError::MissingPredicates {
            query_id: "b".into(),
            join_type: "INNER JOIN".into(),
        }]
    );

    let empty_field = BlendSet::new(vec![Query::new("a"), Query::new("b")])
        .with_join(JoinSpec::new("b", JoinType::Left).on("a", " ", "x"));
    assert_eq!(
        validation::validate(&empty_field).unwrap_err(),
        vec![ValidationError::EmptyPredicateField {
            query_id: "b".into(),
            index: 0,
        }]
    );
}

#[test]
fn test_join_target_errors() {
    let root_joined = BlendSet::new(vec![Query::new("a"), Query::new("b")])
        .with_join(JoinSpec::new("a", JoinType::Inner).on("b", "x", "x"))
        .with_join(JoinSpec::new("b", JoinType::Inner).on("a", "x", "x"));
    let errors = validation::validate(&root_joined).unwrap_err();
    assert!(errors.contains(&ValidationError::RootHasJoin {
        query_id: "a".into()
    }));

    let unknown_target = BlendSet::new(vec![Query::new("a"), Query::new("b")])
        .with_join(JoinSpec::new("zz", JoinType::Inner).on("a", "x", "x"));
    let errors = validation::validate(&unknown_target).unwrap_err();
    assert!(errors.contains(&ValidationError::InvalidJoinTarget {
        key: "zz".into(),
        to_query_id: "zz".into(),
    }));
    assert!(errors.contains(&ValidationError::MissingJoin {
        query_id: "b".into()
    }));
}

#[test]
fn test_validation_error_display() {
    let error = ValidationError::ForwardReference {
        query_id: "b".into(),
        reference: "c".into(),
    };
    assert_eq!(
        error.to_string(),
        "Join for 'b' references 'c', which is not declared before it"
    );

    let error = ValidationError::CircularDependency {
        cycle: vec!["b".into(), "c".into(), "b".into()],
    };
    assert_eq!(error.to_string(), "Circular join dependency: b -> c -> b");
}
