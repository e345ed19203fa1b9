//! LanceDB-backed index artifact.
//!
//! The table holds one row per chunk: `row_id: Int64` (the chunk's position
//! in the chunk file) and `vector: FixedSizeList<Float32, D>`. It is scanned
//! once at startup into a [`FlatIndex`]; nothing is written at runtime.

use arrow_array::cast::AsArray;
use arrow_array::types::Float32Type;
use arrow_array::{Array, FixedSizeListArray, Int64Array, RecordBatch, RecordBatchIterator};
use arrow_schema::{DataType, Field, Schema};
use futures::TryStreamExt;
use lancedb::connect;
use lancedb::query::ExecutableQuery;
use std::path::Path;
use std::sync::Arc;

use kbqa_core::error::IndexError;
use kbqa_core::traits::VectorIndex;

use crate::flat::FlatIndex;

fn backend(e: lancedb::Error) -> IndexError {
    IndexError::Backend(e.to_string())
}

pub fn build_index_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("row_id", DataType::Int64, false),
        Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
    ]))
}

fn vector_dim(schema: &Schema) -> Result<usize, IndexError> {
    let field = schema
        .field_with_name("vector")
        .map_err(|_| IndexError::Corrupt("vector column missing".to_string()))?;
    match field.data_type() {
        DataType::FixedSizeList(_, n) if *n > 0 => Ok(*n as usize),
        other => Err(IndexError::Corrupt(format!("vector column has type {other}"))),
    }
}

pub async fn load_lance_index(db_path: &Path, table: &str) -> Result<FlatIndex, IndexError> {
    let db = connect(db_path.to_string_lossy().as_ref()).execute().await.map_err(backend)?;
    let t = db.open_table(table).execute().await.map_err(backend)?;
    let schema = t.schema().await.map_err(backend)?;
    let dim = vector_dim(&schema)?;

    let mut rows: Vec<(i64, Vec<f32>)> = Vec::new();
    let mut stream = t.query().execute().await.map_err(backend)?;
    while let Some(batch) = stream.try_next().await.map_err(backend)? {
        let ids = batch
            .column_by_name("row_id")
            .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
            .ok_or_else(|| IndexError::Corrupt("row_id column missing or not Int64".to_string()))?;
        let vecs = batch
            .column_by_name("vector")
            .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
            .ok_or_else(|| IndexError::Corrupt("vector column missing or not a fixed-size list".to_string()))?;
        for i in 0..batch.num_rows() {
            if ids.is_null(i) || vecs.is_null(i) {
                return Err(IndexError::Corrupt(format!("null value in batch row {i}")));
            }
            let list = vecs.value(i);
            let vals = list
                .as_primitive_opt::<Float32Type>()
                .ok_or_else(|| IndexError::Corrupt("vector items are not Float32".to_string()))?
                .values()
                .to_vec();
            rows.push((ids.value(i), vals));
        }
    }

    rows.sort_by_key(|(id, _)| *id);
    for (pos, (id, _)) in rows.iter().enumerate() {
        if *id != pos as i64 {
            return Err(IndexError::Corrupt(format!("row ids must be exactly 0..{}; found {id} at position {pos}", rows.len())));
        }
    }
    let vectors: Vec<Vec<f32>> = rows.into_iter().map(|(_, v)| v).collect();
    tracing::debug!(table, rows = vectors.len(), dim, "loaded lance index table");
    FlatIndex::from_rows(dim, &vectors)
}

/// Write `index` as a new table; row `i` gets `row_id = i`.
pub async fn write_lance_index(db_path: &Path, table: &str, index: &FlatIndex) -> Result<(), IndexError> {
    let dim = i32::try_from(index.dim()).map_err(|_| IndexError::Corrupt("dimension does not fit in i32".to_string()))?;
    let schema = build_index_schema(dim);
    let row_ids: Vec<i64> = (0..index.row_count() as i64).collect();
    let vectors: Vec<Option<Vec<Option<f32>>>> = index
        .vectors()
        .chunks_exact(index.dim())
        .map(|row| Some(row.iter().map(|&x| Some(x)).collect()))
        .collect();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(row_ids)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors.into_iter(), dim)),
        ],
    )
    .map_err(|e| IndexError::Backend(e.to_string()))?;

    let db = connect(db_path.to_string_lossy().as_ref()).execute().await.map_err(backend)?;
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
    db.create_table(table, reader).execute().await.map_err(backend)?;
    Ok(())
}
