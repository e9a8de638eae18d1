//! Property tests for collection ordering and add/query round-trips.

use proptest::prelude::*;
use rag_store::{DocumentMetadata, LocalVectorStore, VectorStore};

const DIM: usize = 8;

/// Non-zero embedding of the given dimension.
fn arb_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter("non-zero embedding", |v| {
        v.iter().map(|x| x * x).sum::<f32>().sqrt() > 1e-3
    })
}

fn arb_batch() -> impl Strategy<Value = Vec<(String, Vec<f32>)>> {
    proptest::collection::vec(("[a-z]{1,12}", arb_embedding(DIM)), 1..20)
}

fn metadata_for(n: usize) -> Vec<DocumentMetadata> {
    (0..n)
        .map(|i| DocumentMetadata::new(vec![format!("kw{i}")], format!("f{i}.txt")))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn results_are_ordered_and_bounded(
        batch in arb_batch(),
        query in arb_embedding(DIM),
        top_k in 1usize..25,
    ) {
        let store = LocalVectorStore::in_memory("prop");
        let (docs, embs): (Vec<String>, Vec<Vec<f32>>) = batch.into_iter().unzip();
        store.add(&docs, &embs, &metadata_for(docs.len())).unwrap();

        let hits = store.query(&query, top_k);
        prop_assert!(hits.len() <= top_k);
        prop_assert!(hits.len() <= docs.len());
        for w in hits.windows(2) {
            let (a, b) = (w[0].distance.unwrap(), w[1].distance.unwrap());
            prop_assert!(a <= b, "not ascending: {} > {}", a, b);
        }
    }

    #[test]
    fn added_embedding_is_found_at_distance_zero(
        batch in arb_batch(),
        pick in any::<prop::sample::Index>(),
    ) {
        let store = LocalVectorStore::in_memory("prop");
        let (docs, embs): (Vec<String>, Vec<Vec<f32>>) = batch.into_iter().unzip();
        store.add(&docs, &embs, &metadata_for(docs.len())).unwrap();

        let i = pick.index(docs.len());
        let hits = store.query(&embs[i], docs.len());
        prop_assert!(hits[0].distance.unwrap() < 1e-4);
        let found = hits.iter().any(|h| {
            h.content.as_deref() == Some(docs[i].as_str()) && h.distance.unwrap() < 1e-4
        });
        prop_assert!(found, "document {} not returned at distance zero", i);
    }
}

#[test]
fn empty_add_leaves_count_unchanged() {
    let store = LocalVectorStore::in_memory("scenario");
    store
        .add(&["一".into()], &[vec![1.0, 0.0]], &metadata_for(1))
        .unwrap();
    store.add(&[], &[], &[]).unwrap();
    assert_eq!(store.count(), 1);
}

#[test]
fn persisted_collection_survives_reopen_and_keeps_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge_embeddings.jsonl");

    let store = LocalVectorStore::open("knowledge_embeddings", &path).unwrap();
    store
        .add(
            &["甲".into(), "乙".into()],
            &[vec![1.0, 0.0], vec![0.0, 1.0]],
            &metadata_for(2),
        )
        .unwrap();
    drop(store);

    let reopened = LocalVectorStore::open("knowledge_embeddings", &path).unwrap();
    let hits = reopened.query(&[0.0, 1.0], 1);
    assert_eq!(hits[0].content.as_deref(), Some("乙"));
    assert_eq!(hits[0].metadata.as_ref().unwrap().source, "f1.txt");
}
