//! In-memory `DuckDB` store lifecycle.

use ::duckdb::Connection;
use tracing::{debug, info};

use crate::sqlite_compat::adapt_sqlite_dialect;
use crate::{
    enforce_read_only_query, normalize_sql, script_prefix, RawDataset, RawSale, WarehouseError,
};

/// A live in-memory database populated from one SQL script.
///
/// The connection is released exactly once: either through [`SalesStore::close`] or when
/// the store is dropped.
pub struct SalesStore {
    connection: Connection,
    script_len: usize,
}

impl std::fmt::Debug for SalesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesStore")
            .field("script_len", &self.script_len)
            .finish_non_exhaustive()
    }
}

impl SalesStore {
    /// Open an empty in-memory store.
    ///
    /// # Errors
    /// Returns [`WarehouseError::Open`] if `DuckDB` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, WarehouseError> {
        let connection = Connection::open_in_memory().map_err(WarehouseError::Open)?;
        connection
            .execute_batch("PRAGMA disable_progress_bar;")
            .map_err(WarehouseError::Open)?;
        Ok(Self {
            connection,
            script_len: 0,
        })
    }

    /// Build a store from a fetched script.
    ///
    /// An absent script yields `Ok(None)` without touching `DuckDB`. A script that fails
    /// to execute discards the partially populated database.
    ///
    /// # Errors
    /// Returns [`WarehouseError::ScriptFailed`] with the script prefix when any
    /// statement fails.
    pub fn build(script: Option<&str>) -> Result<Option<Self>, WarehouseError> {
        let Some(script) = script else {
            debug!("no script available, skipping store build");
            return Ok(None);
        };

        let mut store = Self::open_in_memory()?;
        store.execute_script(script)?;
        info!(script_len = store.script_len, "sales store populated");
        Ok(Some(store))
    }

    /// Execute a whole script as one batch, after rewriting SQLite-only syntax.
    ///
    /// Every statement auto-commits, so the data is visible to later queries as soon as
    /// the batch returns. A failure reports the prefix of the script as fetched.
    pub fn execute_script(&mut self, script: &str) -> Result<(), WarehouseError> {
        let adapted = adapt_sqlite_dialect(script);
        self.connection
            .execute_batch(&adapted)
            .map_err(|source| WarehouseError::ScriptFailed {
                source,
                prefix: script_prefix(script),
            })?;
        self.script_len += script.len();
        Ok(())
    }

    /// Run a dataset query and materialize every row as a [`RawSale`].
    ///
    /// The query must return the eight columns of [`crate::SALES_COLUMNS`] in order.
    ///
    /// # Errors
    /// Returns [`WarehouseError::QueryRejected`] for non-SELECT input and
    /// [`WarehouseError::Load`] when execution or row decoding fails.
    pub fn load(&self, query: &str) -> Result<RawDataset, WarehouseError> {
        let sql = normalize_sql(query)?;
        enforce_read_only_query(sql)?;

        let mut statement = self.connection.prepare(sql).map_err(WarehouseError::Load)?;
        let rows = statement
            .query_map([], |row| {
                Ok(RawSale {
                    sale_id: row.get(0)?,
                    sold_on: row.get(1)?,
                    product_name: row.get(2)?,
                    category: row.get(3)?,
                    quantity: row.get(4)?,
                    unit_price: row.get(5)?,
                    discount: row.get(6)?,
                    total: row.get(7)?,
                })
            })
            .map_err(WarehouseError::Load)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(WarehouseError::Load)?;

        debug!(rows = rows.len(), "sales dataset loaded");
        Ok(RawDataset::new(rows))
    }

    /// Total length in bytes of the scripts executed against this store.
    pub fn script_len(&self) -> usize {
        self.script_len
    }

    /// Close the underlying connection, surfacing any close error.
    pub fn close(self) -> Result<(), WarehouseError> {
        self.connection
            .close()
            .map_err(|(_, error)| WarehouseError::Close(error))?;
        debug!("sales store closed");
        Ok(())
    }
}
