//! The embedding-provider seam.
//!
//! The retrieval index receives an `EmbedProvider` at construction, so tests
//! can substitute a deterministic fake and production can wire a real model.
//! Ingestion and query must use the same provider; `embedder_id` is recorded
//! per stored row so a mismatch can at least be audited after the fact.

pub trait EmbedProvider: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `local:xlm-roberta:d768`).
    fn embedder_id(&self) -> &str;

    /// Embedding dimensionality (D). Every vector returned has this length.
    fn dim(&self) -> usize;

    /// Maximum input length (model tokens) this provider accepts per text.
    fn max_len(&self) -> usize;

    /// Embed a single text into a normalized vector.
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embed a batch of texts. The default loops over `embed`; providers
    /// with a cheaper batched path should override it.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}
