//! Domain types shared by the chunker, embedders, and the vector store.

use serde::{Deserialize, Serialize};

pub type RecordId = String;

/// A persisted unit of retrievable knowledge: one chunk of source text
/// paired with its embedding vector.
///
/// - `id`: row identifier, unique within one ingestion
/// - `resource_id`: which ingested document produced this chunk, when the
///   surrounding system tracks resources
/// - `content`: the chunk text (denormalized copy, not a reference)
/// - `vector`: fixed-dimension embedding; every row in one store shares the
///   same dimensionality
/// - `embedder_id`: provider/model identity that produced `vector`
/// - `ingested_at`: insertion time, epoch milliseconds
///
/// Records are append-only: created once at ingestion, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: RecordId,
    pub resource_id: Option<String>,
    pub content: String,
    pub vector: Vec<f32>,
    pub embedder_id: String,
    pub ingested_at: i64,
}

/// One ranked query result. Ephemeral: produced fresh per query, never
/// cached or persisted.
///
/// `similarity` is cosine similarity in (-1, 1]; higher is closer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub content: String,
    pub similarity: f32,
}
