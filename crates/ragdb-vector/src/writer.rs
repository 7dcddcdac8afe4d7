//! Append-only writer for embedding records.

use anyhow::{anyhow, Result};
use arrow_array::{
    FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray,
    TimestampMillisecondArray,
};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::path::Path;
use tracing::{debug, info};

use ragdb_core::EmbeddingRecord;

use crate::schema::build_snippet_schema;
use crate::table::{ensure_snippet_table, open_db};

const INSERT_BATCH_SIZE: usize = 1000;
const PROGRESS_THRESHOLD: usize = 100;

pub struct SnippetWriter {
    pub(crate) db: Connection,
    pub(crate) table_name: String,
    dim: usize,
}

impl SnippetWriter {
    /// Open the database and create the snippet table if it is missing, so
    /// every later insert is a plain append.
    pub async fn open(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
        let db = open_db(db_path.to_string_lossy().as_ref()).await?;
        ensure_snippet_table(&db, table_name, dim as i32).await?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
            dim,
        })
    }

    /// Insert records in batches. Every vector must match the writer's
    /// dimension; the first mismatch fails the call before anything is
    /// flushed for that batch.
    pub async fn insert(&self, records: &[EmbeddingRecord]) -> Result<()> {
        if records.is_empty() {
            debug!("no records to insert");
            return Ok(());
        }
        for record in records {
            if record.vector.len() != self.dim {
                return Err(anyhow!(
                    "record {} has {} dims, table expects {}",
                    record.id,
                    record.vector.len(),
                    self.dim
                ));
            }
        }
        info!(
            count = records.len(),
            table = %self.table_name,
            "inserting embedding records"
        );

        let pb = if records.len() >= PROGRESS_THRESHOLD {
            let pb = ProgressBar::new(records.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records ({percent}%)")?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut flushed = 0usize;
        for batch in records.chunks(INSERT_BATCH_SIZE) {
            self.insert_batch(batch).await?;
            flushed += batch.len();
            if let Some(pb) = &pb {
                pb.set_position(flushed as u64);
            }
        }
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        debug!(flushed, "insert complete");
        Ok(())
    }

    async fn insert_batch(&self, records: &[EmbeddingRecord]) -> Result<()> {
        let record_batch = self.records_to_batch(records)?;
        let schema = record_batch.schema();
        let reader = Box::new(RecordBatchIterator::new(
            vec![Ok(record_batch)].into_iter(),
            schema,
        ));
        // the table is guaranteed to exist since open()
        self.db
            .open_table(&self.table_name)
            .execute()
            .await?
            .add(reader)
            .execute()
            .await?;
        Ok(())
    }

    fn records_to_batch(&self, records: &[EmbeddingRecord]) -> Result<RecordBatch> {
        let schema = build_snippet_schema(self.dim as i32);
        let mut ids = Vec::new();
        let mut resource_ids: Vec<Option<String>> = Vec::new();
        let mut contents = Vec::new();
        let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
        let mut embedder_ids = Vec::new();
        let mut ingested_ats = Vec::new();
        for record in records {
            ids.push(record.id.clone());
            resource_ids.push(record.resource_id.clone());
            contents.push(record.content.clone());
            vectors.push(Some(record.vector.iter().map(|&x| Some(x)).collect()));
            embedder_ids.push(record.embedder_id.clone());
            ingested_ats.push(record.ingested_at);
        }
        let record_batch = RecordBatch::try_new(
            schema,
            vec![
                std::sync::Arc::new(StringArray::from(ids)),
                std::sync::Arc::new(StringArray::from(resource_ids)),
                std::sync::Arc::new(StringArray::from(contents)),
                std::sync::Arc::new(
                    FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(
                        vectors.into_iter(),
                        self.dim as i32,
                    ),
                ),
                std::sync::Arc::new(StringArray::from(embedder_ids)),
                std::sync::Arc::new(TimestampMillisecondArray::from(ingested_ats)),
            ],
        )?;
        Ok(record_batch)
    }
}
