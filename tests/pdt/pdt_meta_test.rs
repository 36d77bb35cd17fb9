//! Integration tests for derived-table metadata extraction.

use sqlblend::parser::{parse_segments, split_segments};
use sqlblend::pdt::{extract, extract_all, PdtMeta};

/// Build a materialization block the way the upstream layer emits it.
fn block(model: &str, view: &str, reference: &str) -> String {
    format!(
        "-- generate derived table {view}\n\
         -- Building persistent derived table {model}::{view} on instance d4a546a52566484226c5db189db88551\n\
         CREATE TABLE {reference} AS (\n\
         SELECT '1' as one )\n\
         -- finished {view} => {reference}"
    )
}

#[test]
fn test_round_trip_from_parts() {
    let cases = [
        ("ecommerce", "order_facts", "SCRATCH", "ZK", "$", "WYB1763531790092_order_facts"),
        ("m", "v", "tmp", "A1", "_", "XQ42_v"),
        ("thelook", "user_ltv", "looker_scratch", "9B", "$", "AB0_user_ltv"),
    ];

    for (model, view, schema, key, sep, suffix) in cases {
        let table = format!("LC{sep}{key}{suffix}");
        let meta = extract(&block(model, view, &format!("{schema}.{table}")));

        assert_eq!(meta.model, model);
        assert_eq!(meta.view, view);
        assert_eq!(meta.scratch_schema, schema);
        assert_eq!(meta.registration_key, key);
        assert_eq!(meta.ephemeral_name_variant_r, format!("LR{sep}{key}{suffix}"));
        assert_eq!(meta.ephemeral_name_variant_c, table);
        assert_eq!(meta.stable_view_name, format!("{schema}.{key}_{model}_{view}"));
        assert_eq!(meta.project, "");
        assert_eq!(meta.quote_char, "");
    }
}

#[test]
fn test_prod_mode_block() {
    let meta = extract(&block(
        "snowflake_test",
        "select_one",
        "LOOKER_SCRATCH.LR$ZKWYB1763531790092_select_one",
    ));

    assert_eq!(
        meta,
        PdtMeta {
            registration_key: "ZK".into(),
            model: "snowflake_test".into(),
            view: "select_one".into(),
            scratch_schema: "LOOKER_SCRATCH".into(),
            ephemeral_name_variant_r: "LR$ZKWYB1763531790092_select_one".into(),
            ephemeral_name_variant_c: "LC$ZKWYB1763531790092_select_one".into(),
            stable_view_name: "LOOKER_SCRATCH.ZK_snowflake_test_select_one".into(),
            project: String::new(),
            quote_char: String::new(),
        }
    );
}

#[test]
fn test_double_quoted_project_reference() {
    let meta = extract(&block("a", "b", "\"bq-project.c.LC$XX1234567890_select_one\""));

    assert_eq!(meta.quote_char, "\"");
    assert_eq!(meta.project, "bq-project");
    assert_eq!(meta.scratch_schema, "c");
    assert_eq!(meta.ephemeral_name_variant_r, "LR$XX1234567890_select_one");
    assert_eq!(meta.stable_view_name, "c.XX_a_b");
}

#[test]
fn test_extract_all_from_fixture() {
    let segments = parse_segments(include_str!("../fixtures/pivot_bigquery.sql")).unwrap();
    let metas = extract_all(&segments.materialization_blocks);

    assert_eq!(metas.len(), 2);
    assert_eq!(metas[0].view, "select_one");
    assert_eq!(metas[0].quote_char, "`");
    assert_eq!(metas[0].project, "bq-project");
    assert_eq!(metas[1].ephemeral_name_variant_c, "LC$ZKOFX1763534613040_select_two");
    assert_eq!(
        metas[1].stable_view_name,
        "LOOKER_SCRATCH.ZK_snowflake_test_select_two"
    );
}

#[test]
fn test_block_without_finished_line() {
    let meta = extract("-- Building persistent derived table m::v on instance x\nCREATE TABLE s.LR$AB1_v AS (SELECT 1)");

    assert_eq!(meta.model, "m");
    assert_eq!(meta.scratch_schema, "");
    assert_eq!(meta.ephemeral_names().count(), 0);
}

#[test]
fn test_metas_survive_unsupported_pivot() {
    let raw = format!(
        "{}\nSELECT * FROM (\n\
         SELECT *, MIN(z___rank) OVER (PARTITION BY \"v.a\", \"v.b\") as z___min_rank FROM (\n\
         SELECT *, DENSE_RANK() OVER (ORDER BY \"v.c\") AS z__pivot_col_rank FROM (\n\
         SELECT v.a, v.b, v.c FROM s.LR$AB1_v AS v) ww\n\
         ) bb\n\
         ) zz",
        block("m", "v", "s.LR$AB1_v")
    );

    assert!(parse_segments(&raw).is_err());

    let metas = extract_all(&split_segments(&raw).materialization_blocks);
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0].stable_view_name, "s.AB_m_v");
}
