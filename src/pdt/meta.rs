// src/pdt/meta.rs
//! Metadata carried by a derived-table build block.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static BUILDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)-- Building persistent derived table ([^:\s]+)::(\S+)").unwrap()
});

static FINISHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)-- finished \S+ => (?:`([^`\s]+)`|"([^"\s]+)"|([^`"\s]+))"#).unwrap()
});

static EPHEMERAL_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)L[CR]([_$])([A-Z0-9]{2})([A-Z0-9_]+)").unwrap());

/// What a derived-table build block says about the table it created.
///
/// Every field is empty when the block does not contain the piece it is
/// derived from; extraction never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PdtMeta {
    /// Two-character connection registration key, e.g. `ZK`.
    pub registration_key: String,
    pub model: String,
    pub view: String,
    pub scratch_schema: String,
    /// `LR<sep><key><suffix>`.
    pub ephemeral_name_variant_r: String,
    /// `LC<sep><key><suffix>`.
    pub ephemeral_name_variant_c: String,
    /// `<schema>.<key>_<model>_<view>`.
    pub stable_view_name: String,
    pub project: String,
    /// `` ` ``, `"`, or empty.
    pub quote_char: String,
}

impl PdtMeta {
    /// Both ephemeral names, skipping empty ones.
    pub fn ephemeral_names(&self) -> impl Iterator<Item = &str> {
        [
            self.ephemeral_name_variant_r.as_str(),
            self.ephemeral_name_variant_c.as_str(),
        ]
        .into_iter()
        .filter(|name| !name.is_empty())
    }
}

/// Extract [`PdtMeta`] from one materialization block.
pub fn extract(block: &str) -> PdtMeta {
    let mut meta = PdtMeta::default();

    if let Some(caps) = BUILDING.captures(block) {
        meta.model = caps[1].to_string();
        meta.view = caps[2].to_string();
    }

    let mut table_name = "";
    if let Some(caps) = FINISHED.captures(block) {
        let (quote, reference) = if let Some(m) = caps.get(1) {
            ("`", m.as_str())
        } else if let Some(m) = caps.get(2) {
            ("\"", m.as_str())
        } else {
            ("", caps.get(3).map_or("", |m| m.as_str()))
        };
        meta.quote_char = quote.to_string();

        let parts: Vec<&str> = reference.split('.').collect();
        match parts[..] {
            [project, schema, table] => {
                meta.project = project.to_string();
                meta.scratch_schema = schema.to_string();
                table_name = table;
            }
            [schema, table] => {
                meta.scratch_schema = schema.to_string();
                table_name = table;
            }
            _ => tracing::debug!(reference, "unexpected derived table reference"),
        }
    }

    if let Some(caps) = EPHEMERAL_TABLE.captures(table_name) {
        let separator = &caps[1];
        meta.registration_key = caps[2].to_string();
        let suffix = &caps[3];

        if !meta.scratch_schema.is_empty() && !meta.registration_key.is_empty() {
            meta.ephemeral_name_variant_r =
                format!("LR{}{}{}", separator, meta.registration_key, suffix);
            meta.ephemeral_name_variant_c =
                format!("LC{}{}{}", separator, meta.registration_key, suffix);
        }
    }

    meta.stable_view_name = format!(
        "{}.{}_{}_{}",
        meta.scratch_schema, meta.registration_key, meta.model, meta.view
    );

    meta
}

/// Extract metadata for every block, in order.
pub fn extract_all<S: AsRef<str>>(blocks: &[S]) -> Vec<PdtMeta> {
    blocks.iter().map(|block| extract(block.as_ref())).collect()
}
