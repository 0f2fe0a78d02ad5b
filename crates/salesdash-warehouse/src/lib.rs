//! # Salesdash Warehouse
//!
//! In-memory DuckDB storage for the sales dashboard.
//!
//! ## Overview
//!
//! The warehouse owns the two pipeline stages that touch SQL:
//!
//! - **Dataset builder**: [`SalesStore::build`] opens a fresh in-memory database and
//!   executes a fetched SQL script against it.
//! - **Query loader**: [`SalesStore::load`] runs the fixed join query and materializes
//!   the result as a [`RawDataset`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use salesdash_warehouse::{SalesStore, SALES_JOIN_QUERY};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let script = std::fs::read_to_string("fixtures/vendas.sql")?;
//!     let Some(store) = SalesStore::build(Some(&script))? else {
//!         return Ok(());
//!     };
//!
//!     let dataset = store.load(SALES_JOIN_QUERY)?;
//!     println!("Loaded {} sales", dataset.len());
//!
//!     store.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `vendas` | Sales transactions (sale id, date, product id, quantity, discount) |
//! | `produtos` | Product catalog (product id, name, category, unit price) |

pub mod duckdb;
mod sqlite_compat;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use duckdb::SalesStore;

/// Number of script characters echoed back when a script fails to execute.
pub const SCRIPT_PREFIX_CHARS: usize = 100;

/// Left join of every sale to its product, with the discounted line total.
///
/// Columns are cast to fixed types so the loader does not depend on the types declared
/// by the fetched script.
pub const SALES_JOIN_QUERY: &str = r"
SELECT
    CAST(v.id_venda AS BIGINT) AS id_venda,
    CAST(v.data_venda AS VARCHAR) AS data_venda,
    CAST(p.nome_produto AS VARCHAR) AS nome_produto,
    CAST(p.categoria AS VARCHAR) AS categoria,
    CAST(v.quantidade AS BIGINT) AS quantidade,
    CAST(p.preco_unitario AS DOUBLE) AS preco_unitario,
    CAST(v.desconto AS DOUBLE) AS desconto,

    -- computed 'valor_total'
    CAST(v.quantidade * (p.preco_unitario * (1 - IFNULL(v.desconto, 0))) AS DOUBLE) AS valor_total

FROM vendas v
LEFT JOIN produtos p ON v.id_produto = p.id_produto
ORDER BY v.id_venda;
";

/// Column headers of the joined dataset, in query order.
pub const SALES_COLUMNS: [&str; 8] = [
    "id_venda",
    "data_venda",
    "nome_produto",
    "categoria",
    "quantidade",
    "preco_unitario",
    "desconto",
    "valor_total",
];

/// Errors that can occur while building or querying the sales store.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// The in-memory database could not be opened.
    #[error("failed to open in-memory store: {0}")]
    Open(#[source] ::duckdb::Error),

    /// The fetched script did not execute cleanly.
    #[error("failed to execute SQL script: {source}")]
    ScriptFailed {
        #[source]
        source: ::duckdb::Error,
        /// First [`SCRIPT_PREFIX_CHARS`] characters of the offending script.
        prefix: String,
    },

    /// The join query failed or returned rows of an unexpected shape.
    #[error("failed to load sales dataset: {0}")]
    Load(#[source] ::duckdb::Error),

    /// Query was rejected before reaching the database.
    #[error("query rejected: {0}")]
    QueryRejected(String),

    /// Closing the connection failed.
    #[error("failed to close store: {0}")]
    Close(#[source] ::duckdb::Error),
}

impl WarehouseError {
    /// Script prefix attached to a script failure, if any.
    pub fn script_prefix(&self) -> Option<&str> {
        match self {
            Self::ScriptFailed { prefix, .. } => Some(prefix.as_str()),
            _ => None,
        }
    }

    /// Whether the failing script looks like an HTML page rather than SQL.
    pub fn looks_like_html(&self) -> bool {
        self.script_prefix()
            .is_some_and(|prefix| prefix.trim_start().starts_with('<'))
    }
}

/// One row of the joined dataset, before cleaning.
///
/// Product fields are `None` when the sale references a product missing from the
/// catalog; `quantity`, `discount` and `unit_price` may also be null in the source
/// tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSale {
    pub sale_id: i64,
    /// Sale date as text, exactly as the store returned it.
    pub sold_on: Option<String>,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub discount: Option<f64>,
    /// Total computed by the join query; null when the product is unknown.
    pub total: Option<f64>,
}

/// Null-value count for one dataset column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNullCount {
    pub column: String,
    pub nulls: usize,
}

impl ColumnNullCount {
    pub fn new(column: impl Into<String>, nulls: usize) -> Self {
        Self {
            column: column.into(),
            nulls,
        }
    }
}

/// Ordered collection of joined sale rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDataset {
    pub rows: Vec<RawSale>,
}

impl RawDataset {
    pub fn new(rows: Vec<RawSale>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawSale> {
        self.rows.iter()
    }

    /// Count null values per column, in [`SALES_COLUMNS`] order.
    pub fn null_counts(&self) -> Vec<ColumnNullCount> {
        let count = |predicate: fn(&RawSale) -> bool| {
            self.rows.iter().filter(|row| predicate(row)).count()
        };

        vec![
            ColumnNullCount::new(SALES_COLUMNS[0], 0),
            ColumnNullCount::new(SALES_COLUMNS[1], count(|row| row.sold_on.is_none())),
            ColumnNullCount::new(SALES_COLUMNS[2], count(|row| row.product_name.is_none())),
            ColumnNullCount::new(SALES_COLUMNS[3], count(|row| row.category.is_none())),
            ColumnNullCount::new(SALES_COLUMNS[4], count(|row| row.quantity.is_none())),
            ColumnNullCount::new(SALES_COLUMNS[5], count(|row| row.unit_price.is_none())),
            ColumnNullCount::new(SALES_COLUMNS[6], count(|row| row.discount.is_none())),
            ColumnNullCount::new(SALES_COLUMNS[7], count(|row| row.total.is_none())),
        ]
    }
}

impl<'a> IntoIterator for &'a RawDataset {
    type Item = &'a RawSale;
    type IntoIter = std::slice::Iter<'a, RawSale>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Normalize a SQL query string.
fn normalize_sql(sql: &str) -> Result<&str, WarehouseError> {
    let normalized = sql.trim();
    if normalized.is_empty() {
        return Err(WarehouseError::QueryRejected(String::from(
            "query must not be empty",
        )));
    }
    Ok(normalized.trim_end_matches(';').trim())
}

/// Enforce that a load query is a single SELECT/CTE statement.
fn enforce_read_only_query(sql: &str) -> Result<(), WarehouseError> {
    if !is_select_like(sql) {
        return Err(WarehouseError::QueryRejected(String::from(
            "the dataset query must be a SELECT/CTE statement",
        )));
    }
    if has_multiple_statements(sql) {
        return Err(WarehouseError::QueryRejected(String::from(
            "the dataset query must be a single statement",
        )));
    }
    Ok(())
}

/// Check if a SQL query starts with a SELECT-like keyword, skipping line comments.
fn is_select_like(sql: &str) -> bool {
    let first_keyword = sql
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("--"))
        .flat_map(str::split_whitespace)
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    matches!(first_keyword.as_str(), "SELECT" | "WITH")
}

/// Check if a SQL string contains multiple statements.
fn has_multiple_statements(sql: &str) -> bool {
    sql.split(';')
        .filter(|part| !part.trim().is_empty())
        .count()
        > 1
}

/// First `SCRIPT_PREFIX_CHARS` characters of a script, respecting char boundaries.
fn script_prefix(script: &str) -> String {
    script.chars().take(SCRIPT_PREFIX_CHARS).collect()
}
