//! LanceDB connection and housekeeping helpers for the snippet table.

use anyhow::Result;
use arrow_array::RecordBatchIterator;
use lancedb::{connect, Connection};

use crate::schema::build_snippet_schema;

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

/// Create the snippet table with an empty batch when it does not exist yet.
pub async fn ensure_snippet_table(conn: &Connection, name: &str, dim: i32) -> Result<()> {
    let names = conn.table_names().execute().await?;
    if names.contains(&name.to_string()) {
        return Ok(());
    }
    let schema = build_snippet_schema(dim);
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn
        .table_names()
        .execute()
        .await?
        .contains(&name.to_string()))
}
