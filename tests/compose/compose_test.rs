//! Integration tests for blend composition.

use insta::assert_snapshot;
use sqlblend::compose::{compose, join_clauses, ComposeOptions};
use sqlblend::model::{BlendSet, FieldRef, JoinSpec, JoinType, Query};
use sqlblend::sql::Dialect;

const ORDERS: &str = include_str!("../fixtures/plain_orders.sql");
const USERS: &str = include_str!("../fixtures/plain_users.sql");

fn orders_users(join_type: JoinType) -> BlendSet {
    BlendSet::new(vec![
        Query::new("orders")
            .with_field(FieldRef::dimension("orders.id"))
            .with_field(FieldRef::measure("orders.count")),
        Query::new("users").with_field(FieldRef::dimension("users.name")),
    ])
    .with_join(JoinSpec::new("users", join_type).on("orders", "orders.id", "users.order_id"))
}

fn working_sql() -> Vec<String> {
    vec![ORDERS.to_string(), USERS.to_string()]
}

fn without_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn test_two_query_snapshot() {
    let blend = BlendSet::new(vec![
        Query::new("a").with_field(FieldRef::dimension("id")),
        Query::new("b").with_field(FieldRef::dimension("id")),
    ])
    .with_join(JoinSpec::new("b", JoinType::Inner).on("a", "id", "id"));
    let sql = vec!["SELECT 1 AS \"id\"".to_string(), "SELECT 1 AS \"id\"".to_string()];

    let composed = compose(
        &blend,
        &sql,
        &ComposeOptions::new(Dialect::Snowflake).with_pretty(false),
    );

    assert_snapshot!(composed.sql, @r#"
WITH a AS (
SELECT 1 AS "id"
),
b AS (
SELECT 1 AS "id"
)
SELECT a."id" AS "a.id", b."id" AS "b.id" FROM a
INNER JOIN b ON a."id" = b."id"
"#);
}

#[test]
fn test_fixture_ctes_are_stripped() {
    let composed = compose(
        &orders_users(JoinType::Left),
        &working_sql(),
        &ComposeOptions::new(Dialect::Postgres).with_pretty(false),
    );

    assert!(composed.sql.starts_with(
        "WITH orders AS (\nSELECT\n    orders.id AS \"orders.id\",\n    COUNT(*) AS \"orders.count\"\n\
         FROM public.orders AS orders\nGROUP BY\n    1\n),\nusers AS (\n"
    ));
    assert!(!composed.sql.contains("LIMIT 500"));
    assert!(!composed.sql.contains("ORDER BY"));
    assert!(composed.sql.ends_with(
        "FROM orders\nLEFT JOIN users ON orders.\"orders.id\" = users.\"users.order_id\""
    ));
}

#[test]
fn test_quoted_projection() {
    let composed = compose(
        &orders_users(JoinType::Inner),
        &working_sql(),
        &ComposeOptions::new(Dialect::Snowflake).with_pretty(false),
    );

    assert!(composed.sql.contains(
        "SELECT orders.\"orders.id\" AS \"orders.orders.id\", \
         orders.\"orders.count\" AS \"orders.orders.count\", \
         users.\"users.name\" AS \"users.users.name\" FROM orders"
    ));

    let aliases: Vec<&str> = composed.fields.iter().map(|f| f.sql_alias.as_str()).collect();
    assert_eq!(
        aliases,
        vec![
            "\"orders.orders.id\"",
            "\"orders.orders.count\"",
            "\"users.users.name\""
        ]
    );
}

#[test]
fn test_flattened_projection() {
    let composed = compose(
        &orders_users(JoinType::Inner),
        &working_sql(),
        &ComposeOptions::new(Dialect::BigQuery).with_pretty(false),
    );

    assert!(composed.sql.contains(
        "SELECT orders.orders_id AS orders_orders_id, \
         orders.orders_count AS orders_orders_count, \
         users.users_name AS users_users_name FROM orders"
    ));
    assert!(composed
        .sql
        .ends_with("INNER JOIN users ON orders.orders_id = users.users_order_id"));
}

#[test]
fn test_one_join_per_non_root_query() {
    let blend = BlendSet::new(vec![
        Query::new("a"),
        Query::new("b"),
        Query::new("c"),
        Query::new("d"),
    ])
    .with_join(JoinSpec::new("b", JoinType::Inner).on("a", "k", "k"))
    .with_join(JoinSpec::new("c", JoinType::Full).on("a", "k", "k").on("b", "j", "j"))
    .with_join(JoinSpec::new("d", JoinType::Cross));

    let lines = join_clauses(&blend, Dialect::Postgres);

    assert_eq!(lines.len(), blend.queries.len() - 1);
    assert_eq!(
        lines,
        vec![
            "INNER JOIN b ON a.\"k\" = b.\"k\"".to_string(),
            "FULL JOIN c ON a.\"k\" = c.\"k\" AND b.\"j\" = c.\"j\"".to_string(),
            "CROSS JOIN d".to_string(),
        ]
    );
}

#[test]
fn test_custom_aliases_used_in_joins() {
    let blend = BlendSet::new(vec![
        Query::new("first").with_alias("o"),
        Query::new("second").with_alias("u"),
    ])
    .with_join(JoinSpec::new("second", JoinType::Right).on("first", "x", "y"));

    assert_eq!(
        join_clauses(&blend, Dialect::BigQuery),
        vec!["RIGHT JOIN u ON o.x = u.y".to_string()]
    );
}

#[test]
fn test_compose_is_deterministic() {
    let blend = orders_users(JoinType::Left);
    let options = ComposeOptions::new(Dialect::Snowflake).with_token("t0k");

    let first = compose(&blend, &working_sql(), &options);
    let second = compose(&blend, &working_sql(), &options);

    assert_eq!(first, second);
    assert!(first.sql.starts_with("-- b=t0k"));
}

#[test]
fn test_pretty_print_keeps_content() {
    let blend = orders_users(JoinType::Left);
    let plain = compose(
        &blend,
        &working_sql(),
        &ComposeOptions::new(Dialect::Snowflake).with_pretty(false),
    );
    let pretty = compose(
        &blend,
        &working_sql(),
        &ComposeOptions::new(Dialect::Snowflake),
    );

    assert_eq!(without_whitespace(&plain.sql), without_whitespace(&pretty.sql));
}

#[test]
fn test_missing_sql_becomes_placeholder() {
    let blend = BlendSet::new(vec![Query::new("a"), Query::new("b")])
        .with_join(JoinSpec::new("b", JoinType::Cross));

    let composed = compose(
        &blend,
        &["SELECT 1".to_string()],
        &ComposeOptions::new(Dialect::Ansi).with_pretty(false),
    );

    assert!(composed
        .sql
        .contains("b AS (\n-- Error: Processed SQL was empty\n)"));
}
