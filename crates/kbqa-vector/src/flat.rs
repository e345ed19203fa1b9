use std::cmp::Ordering;

use kbqa_core::error::IndexError;
use kbqa_core::traits::VectorIndex;
use kbqa_core::types::Neighbor;

/// Exact nearest-neighbor index over row-major `f32` vectors, scored by
/// squared L2 distance.
///
/// Immutable after construction; concurrent `search` calls need no locking.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize, data: Vec<f32>) -> Result<Self, IndexError> {
        if dim == 0 {
            return Err(IndexError::Corrupt("dimension must be positive".to_string()));
        }
        if data.len() % dim != 0 {
            return Err(IndexError::Corrupt(format!("{} values do not divide into rows of {dim}", data.len())));
        }
        Ok(Self { dim, data })
    }

    pub fn from_rows(dim: usize, rows: &[Vec<f32>]) -> Result<Self, IndexError> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(IndexError::Corrupt(format!("row {i} has {} dims, expected {dim}", row.len())));
            }
            data.extend_from_slice(row);
        }
        Self::new(dim, data)
    }

    /// Raw row-major storage.
    pub fn vectors(&self) -> &[f32] { &self.data }

    pub fn row(&self, id: usize) -> Option<&[f32]> {
        self.data.chunks_exact(self.dim).nth(id)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn by_distance_then_id(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

impl VectorIndex for FlatIndex {
    fn dim(&self) -> usize { self.dim }

    fn row_count(&self) -> usize { self.data.len() / self.dim }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidK);
        }
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch { expected: self.dim, got: query.len() });
        }

        let mut scored: Vec<(f32, usize)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(id, row)| (squared_l2(query, row), id))
            .collect();
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, by_distance_then_id);
            scored.truncate(k);
        }
        scored.sort_by(by_distance_then_id);

        let rows = scored.len();
        let mut out: Vec<Neighbor> = scored
            .into_iter()
            .map(|(distance, id)| Neighbor { distance, id: id as i64 })
            .collect();
        // k comes straight from requests; padding never outgrows the corpus.
        out.resize(k.min(rows.saturating_mul(2)), Neighbor::padding());
        Ok(out)
    }
}
