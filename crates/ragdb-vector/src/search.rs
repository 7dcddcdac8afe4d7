//! Cosine nearest-neighbor search over the snippet table.

use anyhow::{anyhow, Result};
use arrow_array::{Float32Array, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType};
use std::path::Path;
use tracing::debug;

use ragdb_core::Snippet;

use crate::table::{open_db, table_exists};

pub struct SnippetSearch {
    pub(crate) db: Connection,
    pub(crate) table_name: String,
}

impl SnippetSearch {
    pub async fn open(db_path: &Path, table_name: &str) -> Result<Self> {
        let db = open_db(db_path.to_string_lossy().as_ref()).await?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
        })
    }

    /// Return up to `limit` snippets with cosine similarity strictly above
    /// `threshold`, best first. A missing or empty table yields an empty
    /// vec, never an error.
    pub async fn nearest(
        &self,
        query_vec: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<Snippet>> {
        if limit == 0 || !table_exists(&self.db, &self.table_name).await? {
            return Ok(Vec::new());
        }
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table
            .vector_search(query_vec.to_vec())?
            .distance_type(DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await?;

        let mut snippets = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            let contents = batch
                .column_by_name("content")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| anyhow!("content column missing"))?;
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| anyhow!("_distance column missing"))?;
            for i in 0..batch.num_rows() {
                let similarity = 1.0 - distances.value(i);
                if similarity > threshold {
                    snippets.push(Snippet {
                        content: contents.value(i).to_string(),
                        similarity,
                    });
                }
            }
        }

        snippets.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        snippets.truncate(limit);
        debug!(hits = snippets.len(), threshold, limit, "nearest-neighbor scan");
        Ok(snippets)
    }

    /// Total stored records; 0 when the table has not been created yet.
    pub async fn count_rows(&self) -> Result<usize> {
        if !table_exists(&self.db, &self.table_name).await? {
            return Ok(0);
        }
        let table = self.db.open_table(&self.table_name).execute().await?;
        Ok(table.count_rows(None).await?)
    }
}
