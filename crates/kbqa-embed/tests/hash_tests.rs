use kbqa_core::traits::Embedder;
use kbqa_embed::HashEmbedder;

#[tokio::test]
async fn hash_embedder_shapes_and_determinism() {
    let embedder = HashEmbedder::new(384).unwrap();
    let v1 = embedder.embed("hello world", None).await.expect("embed");
    let v2 = embedder.embed("hello world", Some("ignored-key")).await.expect("embed");

    assert_eq!(v1.len(), 384, "embedding dim is 384");
    assert_eq!(embedder.dim(), 384);
    assert_eq!(embedder.embedder_id(), "hash:xxh64:d384");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[tokio::test]
async fn different_texts_get_different_vectors() {
    let embedder = HashEmbedder::new(64).unwrap();
    let a = embedder.embed("survival fire starting", None).await.unwrap();
    let b = embedder.embed("water purification", None).await.unwrap();
    assert_ne!(a, b);
}
