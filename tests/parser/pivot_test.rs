//! Integration tests for pivot wrapper unwrapping.

use sqlblend::parser::{parse_segments, ParseError};

const PIVOT: &str = include_str!("../fixtures/pivot_bigquery.sql");

#[test]
fn test_pivot_unwrapped_with_row_dimension_first() {
    let segments = parse_segments(PIVOT).unwrap();

    let expected = "SELECT
    select_one.one AS \"select_one.one\",
    select_two.two AS \"select_two.two\",
    COUNT(*) AS \"select_one.count\",
    COUNT(DISTINCT select_two.two) AS \"select_two.count\"
FROM `bq-project.LOOKER_SCRATCH.LR$ZKWYB1763531790092_select_one` AS select_one
CROSS JOIN `bq-project.LOOKER_SCRATCH.LR$ZKOFX1763534613040_select_two` AS select_two
GROUP BY
    1,
    2
ORDER BY
    1
FETCH NEXT 500 ROWS ONLY";

    assert_eq!(segments.select, expected);
}

#[test]
fn test_pivot_wrapper_preserved() {
    let segments = parse_segments(PIVOT).unwrap();

    assert!(segments.pivot.starts_with("SELECT * FROM (\n"));
    assert!(segments.pivot.contains("z__pivot_col_rank"));
    assert!(segments
        .pivot
        .trim_end()
        .ends_with("ORDER BY z___pivot_row_rank"));
}

#[test]
fn test_existing_order_and_cap_not_duplicated() {
    let raw = "SELECT * FROM (
SELECT *, DENSE_RANK() OVER (ORDER BY z___min_rank) as z___pivot_row_rank FROM (
SELECT *, MIN(z___rank) OVER (PARTITION BY \"v.row\") as z___min_rank FROM (
SELECT *, DENSE_RANK() OVER (ORDER BY \"v.col\") AS z__pivot_col_rank FROM (
SELECT
    v.row AS \"v.row\",
    v.col AS \"v.col\"
FROM v
ORDER BY 1
LIMIT 10) ww
) bb
) aa
) zz
 WHERE (z___pivot_row_rank <= 500) ORDER BY z___pivot_row_rank";

    let segments = parse_segments(raw).unwrap();
    assert_eq!(
        segments.select,
        "SELECT\n    v.row AS \"v.row\",\n    v.col AS \"v.col\"\nFROM v\nORDER BY 1\nLIMIT 10"
    );
}

#[test]
fn test_multiple_row_dimensions_rejected() {
    let raw = "SELECT * FROM (
SELECT *, MIN(z___rank) OVER (PARTITION BY \"v.a\", \"v.b\") as z___min_rank FROM (
SELECT *, DENSE_RANK() OVER (ORDER BY \"v.c\") AS z__pivot_col_rank FROM (
SELECT 1) ww
) aa
) zz";

    match parse_segments(raw) {
        Err(ParseError::UnsupportedPivot {
            row_dimensions,
            column_dimensions,
        }) => {
            assert_eq!(row_dimensions, vec!["v.a", "v.b"]);
            assert_eq!(column_dimensions, vec!["v.c"]);
        }
        other => panic!("expected UnsupportedPivot, got {:?}", other),
    }
}
