use std::sync::Arc;

use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, Int64Array, RecordBatch, RecordBatchIterator};
use kbqa_core::config::IndexFormat;
use kbqa_core::error::IndexError;
use kbqa_core::traits::VectorIndex;
use kbqa_vector::lance::build_index_schema;
use kbqa_vector::{load_index, load_lance_index, write_lance_index, FlatIndex};
use tempfile::TempDir;

#[tokio::test]
async fn lance_table_loads_in_row_order() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let idx = FlatIndex::from_rows(2, &[vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]])?;
    write_lance_index(tmp.path(), "chunk_vectors", &idx).await?;

    let loaded = load_index(IndexFormat::Lance, tmp.path(), "chunk_vectors").await?;
    assert_eq!(loaded.dim(), 2);
    assert_eq!(loaded.row_count(), 3);
    assert_eq!(loaded.vectors(), idx.vectors());

    let hits = loaded.search(&[4.0, 5.0], 1)?;
    assert_eq!(hits[0].id, 2);
    Ok(())
}

#[tokio::test]
async fn gaps_in_row_ids_are_corrupt() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let schema = build_index_schema(1);
    let vectors = vec![Some(vec![Some(0.0f32)]), Some(vec![Some(1.0f32)])];
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![0i64, 2])),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors.into_iter(), 1)),
        ],
    )?;
    let db = lancedb::connect(tmp.path().to_string_lossy().as_ref()).execute().await?;
    db.create_table("chunk_vectors", Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema)))
        .execute()
        .await?;

    let err = load_lance_index(tmp.path(), "chunk_vectors").await.unwrap_err();
    assert!(matches!(err, IndexError::Corrupt(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn missing_table_is_a_backend_error() {
    let tmp = TempDir::new().unwrap();
    let err = load_lance_index(tmp.path(), "nope").await.unwrap_err();
    assert!(matches!(err, IndexError::Backend(_)));
}
