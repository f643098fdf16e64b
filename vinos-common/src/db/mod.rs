//! Database access for the `vinos` table
//!
//! Every operation opens its own connection, runs, and closes it again.
//! There is no pool and no retry: a failure is reported once as
//! [`Error::DataSource`](crate::Error::DataSource) and the caller decides
//! how to degrade.

use sqlx::{Connection, SqliteConnection};

use crate::Result;

mod vinos;
pub use vinos::{create_vinos_table, fetch_samples, insert_samples, TABLE_NAME};

/// Open one connection for a single operation
pub async fn connect(url: &str) -> Result<SqliteConnection> {
    Ok(SqliteConnection::connect(url).await?)
}
