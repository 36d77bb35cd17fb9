// src/pdt/rewrite.rs
//! Ephemeral derived-table references rewritten to stable views.

use super::meta::PdtMeta;

/// Point references to ephemeral derived tables at their stable views.
///
/// Each ephemeral name is matched exactly as the upstream layer writes it,
/// `<quote><project.><schema>.<name><quote>`, and every occurrence is
/// replaced by the bare `stable_view_name`. Metas apply in order.
pub fn rewrite_stable_views(sql: &str, metas: &[PdtMeta]) -> String {
    let mut rewritten = sql.to_string();

    for meta in metas {
        let project = if meta.project.is_empty() {
            String::new()
        } else {
            format!("{}.", meta.project)
        };

        for name in meta.ephemeral_names() {
            let reference = format!(
                "{q}{project}{schema}.{name}{q}",
                q = meta.quote_char,
                schema = meta.scratch_schema,
            );
            if rewritten.contains(&reference) {
                tracing::debug!(from = %reference, to = %meta.stable_view_name, "rewriting derived table");
                rewritten = rewritten.replace(&reference, &meta.stable_view_name);
            }
        }
    }

    rewritten
}
