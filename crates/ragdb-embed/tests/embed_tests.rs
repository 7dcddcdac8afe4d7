use ragdb_core::EmbedProvider;
use ragdb_embed::{default_provider, FakeEmbedder, DEFAULT_EMBEDDING_DIM};

#[test]
fn fake_embedder_shapes_and_determinism() {
    // Force the fake so the test never loads model weights
    std::env::set_var("RAGDB_USE_FAKE_EMBEDDINGS", "1");

    let provider = default_provider().expect("provider");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = provider.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), DEFAULT_EMBEDDING_DIM);
    assert_eq!(v1.len(), provider.dim());

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn similar_texts_score_higher_than_unrelated() {
    let provider = FakeEmbedder::new(DEFAULT_EMBEDDING_DIM);
    let q = provider.embed("compound interest on savings").expect("embed");
    let close = provider
        .embed("compound interest on savings accounts")
        .expect("embed");
    let far = provider.embed("zebra sanctuary opening hours").expect("embed");

    let cos = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
    assert!(
        cos(&q, &close) > cos(&q, &far),
        "word overlap must dominate: close={} far={}",
        cos(&q, &close),
        cos(&q, &far)
    );
}

#[test]
fn embedder_id_carries_dimension() {
    let provider = FakeEmbedder::new(64);
    assert_eq!(provider.embedder_id(), "fake:xxhash:d64");
    assert_eq!(provider.embed("one two three").expect("embed").len(), 64);
}
