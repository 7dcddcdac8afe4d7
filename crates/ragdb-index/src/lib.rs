//! ragdb-index
//!
//! The retrieval index: chunk a document, embed every chunk in one batched
//! provider call, persist one record per chunk, and answer cosine-similarity
//! queries with ranked snippets. Stateless between calls beyond the store.

use std::path::Path;

use tracing::{debug, info, warn};

use ragdb_core::{Chunker, EmbedProvider, EmbeddingRecord, Error, Result, Snippet};
use ragdb_vector::{SnippetSearch, SnippetWriter};

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.5;
pub const DEFAULT_RESULT_LIMIT: usize = 5;

pub struct RetrievalIndex {
    chunker: Chunker,
    provider: Box<dyn EmbedProvider>,
    writer: SnippetWriter,
    search: SnippetSearch,
}

impl RetrievalIndex {
    /// Open (or lazily create) the snippet table at `db_path` and wire the
    /// injected embedding provider. Ingestion and query share this provider,
    /// so one index never mixes embedding models within a process.
    pub async fn open(
        db_path: &Path,
        table_name: &str,
        chunker: Chunker,
        provider: Box<dyn EmbedProvider>,
    ) -> Result<Self> {
        let writer = SnippetWriter::open(db_path, table_name, provider.dim())
            .await
            .map_err(|e| Error::Store(e.to_string()))?;
        let search = SnippetSearch::open(db_path, table_name)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;
        Ok(Self {
            chunker,
            provider,
            writer,
            search,
        })
    }

    /// Ingest one document with no resource attribution.
    pub async fn ingest(&self, text: &str) -> Result<usize> {
        self.ingest_resource(text, None).await
    }

    /// Chunk `text`, embed all chunks in a single batched call, and persist
    /// one record per chunk. Returns the number of records written.
    ///
    /// The call fails as a whole on the first embedding or store error;
    /// embedding happens before any write, so a provider failure leaves the
    /// store untouched. Empty or all-whitespace text is a no-op.
    pub async fn ingest_resource(&self, text: &str, resource_id: Option<&str>) -> Result<usize> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            debug!("nothing to ingest");
            return Ok(0);
        }

        // Words lower-bound model tokens, so a chunk with more words than
        // the provider accepts will be truncated by the model. Not fatal,
        // but the tail of that chunk is invisible to retrieval.
        let max_len = self.provider.max_len();
        for chunk in &chunks {
            let words = chunk.split_whitespace().count();
            if words > max_len {
                warn!(words, max_len, "chunk exceeds provider max length and will be truncated");
            }
        }

        let vectors = self
            .provider
            .embed_batch(&chunks)
            .map_err(|e| Error::Embedding(e.to_string()))?;
        if vectors.len() != chunks.len() {
            return Err(Error::Embedding(format!(
                "provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }
        for vector in &vectors {
            if vector.len() != self.provider.dim() {
                return Err(Error::Embedding(format!(
                    "provider returned {} dims, declared {}",
                    vector.len(),
                    self.provider.dim()
                )));
            }
        }

        let now = chrono::Utc::now().timestamp_millis();
        let base = resource_id.unwrap_or("doc");
        let records: Vec<EmbeddingRecord> = chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (content, vector))| EmbeddingRecord {
                id: format!("{base}:{now}:{i}"),
                resource_id: resource_id.map(str::to_string),
                content,
                vector,
                embedder_id: self.provider.embedder_id().to_string(),
                ingested_at: now,
            })
            .collect();

        self.writer
            .insert(&records)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;
        info!(
            records = records.len(),
            resource = resource_id.unwrap_or("-"),
            "ingested document"
        );
        Ok(records.len())
    }

    /// Query with the default threshold (0.5) and limit (5).
    pub async fn query(&self, question: &str) -> Result<Vec<Snippet>> {
        self.query_with(question, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_RESULT_LIMIT)
            .await
    }

    /// Embed `question` with the same provider as ingestion and return at
    /// most `limit` snippets with similarity strictly above `threshold`,
    /// best first. No qualifying match is a normal empty result, never an
    /// error; only provider or store failures surface as errors so the
    /// caller can fall back to a "no information found" answer.
    pub async fn query_with(
        &self,
        question: &str,
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<Snippet>> {
        let query_vec = self
            .provider
            .embed(question)
            .map_err(|e| Error::Embedding(e.to_string()))?;
        let snippets = self
            .search
            .nearest(&query_vec, threshold, limit)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;
        debug!(hits = snippets.len(), threshold, limit, "query answered");
        Ok(snippets)
    }

    /// Total persisted records, for status output and tests.
    pub async fn stored_records(&self) -> Result<usize> {
        self.search
            .count_rows()
            .await
            .map_err(|e| Error::Store(e.to_string()))
    }
}
