use anyhow::anyhow;
use ragdb_core::{Chunker, EmbedProvider, Error};
use ragdb_embed::FakeEmbedder;
use ragdb_index::RetrievalIndex;

const DIM: usize = 768;

async fn open_index(dir: &std::path::Path) -> anyhow::Result<RetrievalIndex> {
    let index = RetrievalIndex::open(
        dir,
        "snippets",
        Chunker::default(),
        Box::new(FakeEmbedder::new(DIM)),
    )
    .await?;
    Ok(index)
}

#[tokio::test]
async fn round_trip_ranks_matching_chunk_first() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = open_index(tmp.path()).await?;

    let relevant = "Our savings account pays three percent interest every year.";
    let unrelated = "The office cafeteria serves lunch from noon until two daily.";
    index.ingest(relevant).await?;
    index.ingest(unrelated).await?;

    let hits = index.query(relevant).await?;
    assert!(!hits.is_empty(), "matching content must clear the threshold");
    assert_eq!(hits[0].content, relevant);
    assert!(hits[0].similarity > 0.5, "sim={}", hits[0].similarity);
    // the unrelated document shares no words with the query
    assert!(
        hits.iter().all(|h| h.content != unrelated),
        "unrelated content must not clear the threshold"
    );
    Ok(())
}

#[tokio::test]
async fn empty_index_query_returns_empty_not_error() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = open_index(tmp.path()).await?;
    let hits = index.query("is there anything at all in here").await?;
    assert!(hits.is_empty());
    Ok(())
}

#[tokio::test]
async fn threshold_and_limit_are_enforced() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = open_index(tmp.path()).await?;

    let doc = "Fixed mortgage rates stay constant for the whole loan term.";
    index.ingest(doc).await?;
    index
        .ingest("Adjustable mortgage rates move with the market index rate.")
        .await?;

    // an impossible threshold filters everything out
    let none = index.query_with(doc, 0.999_9, 5).await?;
    assert!(none.iter().all(|h| h.content == doc) && none.len() <= 1);

    // limit 1 returns only the best hit
    let one = index.query_with(doc, 0.0, 1).await?;
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].content, doc);
    Ok(())
}

#[tokio::test]
async fn reingest_appends_independent_records() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = open_index(tmp.path()).await?;

    let text = "Identical text ingested twice produces two record sets.";
    let first = index.ingest(text).await?;
    assert_eq!(index.stored_records().await?, first);

    // no dedup: total count grows by the chunk count each time
    let second = index.ingest(text).await?;
    assert_eq!(first, second);
    assert_eq!(index.stored_records().await?, first + second);
    Ok(())
}

#[tokio::test]
async fn empty_text_ingest_is_a_noop() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = open_index(tmp.path()).await?;
    assert_eq!(index.ingest("").await?, 0);
    assert_eq!(index.ingest("   \n\t ").await?, 0);
    assert_eq!(index.stored_records().await?, 0);
    Ok(())
}

#[tokio::test]
async fn resource_id_is_attached_to_records() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = open_index(tmp.path()).await?;
    let written = index
        .ingest_resource("Quarterly fee schedules are published on the site.", Some("faq-17"))
        .await?;
    assert_eq!(written, 1);
    assert_eq!(index.stored_records().await?, 1);
    Ok(())
}

struct TinyContextProvider(FakeEmbedder);

impl EmbedProvider for TinyContextProvider {
    fn embedder_id(&self) -> &str {
        self.0.embedder_id()
    }
    fn dim(&self) -> usize {
        self.0.dim()
    }
    fn max_len(&self) -> usize {
        2
    }
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.0.embed(text)
    }
}

#[tokio::test]
async fn chunks_beyond_provider_max_len_still_ingest() -> anyhow::Result<()> {
    // A chunk with more words than the provider's context is flagged, not
    // rejected: ingestion stays total.
    let tmp = tempfile::tempdir()?;
    let index = RetrievalIndex::open(
        tmp.path(),
        "snippets",
        Chunker::default(),
        Box::new(TinyContextProvider(FakeEmbedder::new(DIM))),
    )
    .await?;

    let doc = "This sentence has far more words than the tiny provider context.";
    assert_eq!(index.ingest(doc).await?, 1);
    assert_eq!(index.stored_records().await?, 1);
    let hits = index.query(doc).await?;
    assert_eq!(hits.first().map(|h| h.content.as_str()), Some(doc));
    Ok(())
}

struct FailingProvider;

impl EmbedProvider for FailingProvider {
    fn embedder_id(&self) -> &str {
        "failing:test"
    }
    fn dim(&self) -> usize {
        DIM
    }
    fn max_len(&self) -> usize {
        256
    }
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Err(anyhow!("quota exceeded"))
    }
}

#[tokio::test]
async fn provider_failure_fails_the_whole_ingest() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = RetrievalIndex::open(
        tmp.path(),
        "snippets",
        Chunker::default(),
        Box::new(FailingProvider),
    )
    .await?;

    let err = index
        .ingest("This document will never be embedded.")
        .await
        .expect_err("ingest must fail");
    assert!(matches!(err, Error::Embedding(_)), "got: {err}");
    // nothing was persisted
    assert_eq!(index.stored_records().await?, 0);

    let err = index.query("anything").await.expect_err("query must fail");
    assert!(matches!(err, Error::Embedding(_)), "got: {err}");
    Ok(())
}
