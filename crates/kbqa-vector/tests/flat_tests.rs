use kbqa_core::error::IndexError;
use kbqa_core::traits::VectorIndex;
use kbqa_core::types::PADDING_ID;
use kbqa_vector::FlatIndex;

fn line_index() -> FlatIndex {
    // Five points on a line: 0, 1, 2, 3, 4.
    FlatIndex::from_rows(1, &[vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap()
}

#[test]
fn nearest_first_with_squared_distances() {
    let idx = line_index();
    let hits = idx.search(&[1.2], 3).unwrap();
    let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![1, 2, 0]);
    assert!((hits[0].distance - 0.04).abs() < 1e-5);
    assert!((hits[1].distance - 0.64).abs() < 1e-5);
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[test]
fn k_larger_than_corpus_is_padded() {
    let idx = FlatIndex::from_rows(2, &[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
    let hits = idx.search(&[0.0, 0.1], 3).unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].id, 0);
    assert_eq!(hits[1].id, 1);
    assert_eq!(hits[2].id, PADDING_ID);
    assert!(hits[2].distance.is_infinite());
}

#[test]
fn empty_index_returns_only_padding() {
    let idx = FlatIndex::new(4, vec![]).unwrap();
    assert_eq!(idx.row_count(), 0);
    let hits = idx.search(&[0.0; 4], 2).unwrap();
    assert!(hits.iter().all(|h| h.id == PADDING_ID));
}

#[test]
fn ties_break_by_row_id() {
    let idx = FlatIndex::from_rows(1, &[vec![2.0], vec![0.0], vec![2.0]]).unwrap();
    let hits = idx.search(&[1.0], 3).unwrap();
    let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn zero_k_and_wrong_dimension_are_errors() {
    let idx = line_index();
    assert!(matches!(idx.search(&[1.0], 0), Err(IndexError::InvalidK)));
    assert!(matches!(
        idx.search(&[1.0, 2.0], 1),
        Err(IndexError::DimensionMismatch { expected: 1, got: 2 })
    ));
}

#[test]
fn repeated_searches_agree() {
    let idx = line_index();
    assert_eq!(idx.search(&[2.6], 4).unwrap(), idx.search(&[2.6], 4).unwrap());
}

#[test]
fn huge_k_pads_no_further_than_the_corpus() {
    let idx = FlatIndex::from_rows(2, &[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
    for k in [1usize << 44, usize::MAX / 2, usize::MAX] {
        let hits = idx.search(&[0.0, 0.0], k).unwrap();
        assert_eq!(hits.len(), 4, "k={k}");
        assert_eq!(hits[0].id, 0);
        assert_eq!(hits[1].id, 1);
        assert!(hits[2..].iter().all(|h| h.id == PADDING_ID));
    }
    assert!(FlatIndex::new(2, vec![]).unwrap().search(&[0.0, 0.0], usize::MAX).unwrap().is_empty());
}
