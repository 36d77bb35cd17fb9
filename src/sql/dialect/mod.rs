//! Warehouse dialects and the field-naming rules that follow from them.
//!
//! Blended SQL only needs two naming behaviours, so every dialect maps onto a
//! [`FieldNaming`] family:
//!
//! | Family | Dialects | Column getter | Output alias |
//! |--------|----------|---------------|--------------|
//! | Flattened | BigQuery | `q1.orders_id` | `q1_orders_id` |
//! | Quoted | everything else | `q1."orders.id"` | `"q1.orders.id"` |
//!
//! BigQuery rejects dotted identifiers in these positions, so its source
//! queries already expose `view_field` style column names.
//!
//! # Usage
//!
//! ```ignore
//! use sqlblend::sql::dialect::{field_transform, Dialect};
//!
//! let dialect = Dialect::from_name("bigquery_standard_sql");
//! assert_eq!(field_transform("q1", "order_items.order_id", dialect), "q1_order_items_order_id");
//! ```

pub mod helpers;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported warehouse dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Fallback for dialect names we do not recognize.
    #[default]
    Ansi,
    BigQuery,
    Databricks,
    DuckDb,
    MySql,
    Postgres,
    Redshift,
    Snowflake,
    TSql,
}

impl Dialect {
    /// Map an upstream connection dialect name onto a [`Dialect`].
    ///
    /// Matching is case-insensitive. Unknown names map to [`Dialect::Ansi`],
    /// which uses the quoted naming family.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            n if n.starts_with("bigquery") => Dialect::BigQuery,
            n if n.starts_with("databricks") || n.starts_with("spark") => Dialect::Databricks,
            "duckdb" | "motherduck" => Dialect::DuckDb,
            n if n.starts_with("mysql") || n.starts_with("mariadb") => Dialect::MySql,
            "postgres" | "postgresql" | "greenplum" => Dialect::Postgres,
            "redshift" => Dialect::Redshift,
            "snowflake" => Dialect::Snowflake,
            n if n.starts_with("mssql") || n == "tsql" || n == "sql_server" || n == "synapse" => {
                Dialect::TSql
            }
            _ => {
                tracing::debug!(dialect = %name, "unrecognized dialect, using ansi naming");
                Dialect::Ansi
            }
        }
    }

    /// Dialect name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Ansi => "ansi",
            Dialect::BigQuery => "bigquery",
            Dialect::Databricks => "databricks",
            Dialect::DuckDb => "duckdb",
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Redshift => "redshift",
            Dialect::Snowflake => "snowflake",
            Dialect::TSql => "tsql",
        }
    }

    /// The field-naming family for this dialect.
    pub fn naming(&self) -> FieldNaming {
        match self {
            Dialect::BigQuery => FieldNaming::Flattened,
            _ => FieldNaming::Quoted,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Dialect::from_name(s))
    }
}

/// How blended SQL refers to the columns of a source query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldNaming {
    /// Dots become underscores; identifiers stay unquoted.
    Flattened,
    /// Field ids keep their dots inside double quotes.
    Quoted,
}

impl FieldNaming {
    /// Expression reading `field_id` from the CTE named `query_alias`.
    pub fn field_getter(&self, query_alias: &str, field_id: &str) -> String {
        match self {
            FieldNaming::Flattened => format!("{}.{}", query_alias, helpers::flatten(field_id)),
            FieldNaming::Quoted => format!("{}.{}", query_alias, helpers::quote_double(field_id)),
        }
    }

    /// Output column name for `field_id` in the blended result.
    pub fn field_alias(&self, query_alias: &str, field_id: &str) -> String {
        match self {
            FieldNaming::Flattened => format!("{}_{}", query_alias, helpers::flatten(field_id)),
            FieldNaming::Quoted => helpers::quote_double(&format!("{}.{}", query_alias, field_id)),
        }
    }
}

/// Output column name of a blended field.
///
/// This is the naming contract shared with anything that generates metadata
/// over the blended statement: both sides must agree on physical column names.
pub fn field_transform(query_alias: &str, field_id: &str, dialect: Dialect) -> String {
    dialect.naming().field_alias(query_alias, field_id)
}

/// Expression selecting a field from a query CTE.
pub fn field_getter(query_alias: &str, field_id: &str, dialect: Dialect) -> String {
    dialect.naming().field_getter(query_alias, field_id)
}
