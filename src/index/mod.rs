//! Exact brute-force nearest-neighbor index under cosine distance.
//!
//! The index is immutable after `build`; queries take `&self` only, so
//! arbitrarily many request tasks can search concurrently without locks.
//! Every query scans every stored row (exactness is the contract); the
//! scan itself is rayon-parallel.

use crate::features::SparseVector;
use anyhow::{bail, Result};
use rayon::prelude::*;

/// Vector storage abstraction: the index works over either the sparse
/// feature matrix rows or dense reduced-embedding rows.
pub trait Vector: Send + Sync {
    fn dot(&self, other: &Self) -> f32;
    fn norm(&self) -> f32;
    /// Exact dimension when the representation carries one (dense rows);
    /// sparse rows omit trailing zeros and return None. Used by `build` to
    /// reject ragged dense collections.
    fn exact_dim(&self) -> Option<usize>;
}

impl Vector for SparseVector {
    fn dot(&self, other: &Self) -> f32 {
        SparseVector::dot(self, other)
    }

    fn norm(&self) -> f32 {
        SparseVector::norm(self)
    }

    fn exact_dim(&self) -> Option<usize> {
        None
    }
}

impl Vector for Vec<f32> {
    fn dot(&self, other: &Self) -> f32 {
        self.iter().zip(other.iter()).map(|(a, b)| a * b).sum()
    }

    fn norm(&self) -> f32 {
        self.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    fn exact_dim(&self) -> Option<usize> {
        Some(self.len())
    }
}

/// A single query result: row id and cosine distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub row_id: usize,
    pub distance: f32,
}

impl Neighbor {
    /// Cosine similarity, the display-facing complement of the distance.
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Cosine distance `1 - dot(a, b) / (norm(a) * norm(b))`.
///
/// A zero vector has distance 1 (maximal dissimilarity) from any other
/// vector, including another zero vector; the undefined-cosine case is
/// resolved deterministically rather than raised.
pub fn cosine_distance<V: Vector>(a: &V, a_norm: f32, b: &V, b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 1.0;
    }
    1.0 - a.dot(b) / (a_norm * b_norm)
}

/// Immutable brute-force cosine k-NN index.
pub struct VectorIndex<V: Vector> {
    vectors: Vec<V>,
    norms: Vec<f32>,
}

impl<V: Vector> VectorIndex<V> {
    /// Build from a row-aligned collection of equal-dimension vectors.
    /// Norms are precomputed once here instead of per query.
    pub fn build(vectors: Vec<V>) -> Result<Self> {
        if let Some(dim) = vectors.first().and_then(|v| v.exact_dim()) {
            if vectors.iter().any(|v| v.exact_dim() != Some(dim)) {
                bail!("ragged vector collection: rows differ in dimension");
            }
        }
        let norms: Vec<f32> = vectors.par_iter().map(|v| v.norm()).collect();
        Ok(VectorIndex { vectors, norms })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The stored vector for a row. Used to fetch seed vectors.
    pub fn vector(&self, row_id: usize) -> Option<&V> {
        self.vectors.get(row_id)
    }

    /// The `k` nearest rows to `query` by cosine distance, ascending;
    /// equal distances are broken by ascending row id so the ordering is
    /// reproducible. `k` larger than the corpus returns the whole corpus.
    pub fn query(&self, query: &V, k: usize) -> Vec<Neighbor> {
        let query_norm = query.norm();
        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .par_iter()
            .zip(self.norms.par_iter())
            .enumerate()
            .map(|(row_id, (v, &norm))| Neighbor {
                row_id,
                distance: cosine_distance(query, query_norm, v, norm),
            })
            .collect();

        neighbors.sort_unstable_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.row_id.cmp(&b.row_id))
        });
        neighbors.truncate(k);
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_index(rows: Vec<Vec<f32>>) -> VectorIndex<Vec<f32>> {
        VectorIndex::build(rows).unwrap()
    }

    #[test]
    fn five_item_scenario_matches_hand_computed_distances() {
        // Seed is row 0 = (1, 0). By hand:
        //   row 1 (1, 0):    distance 0
        //   row 2 (1, 1):    1 - 1/sqrt(2)  ≈ 0.2929
        //   row 3 (0, 1):    1
        //   row 4 (-1, 0):   2
        let index = dense_index(vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
        ]);
        let seed = index.vector(0).unwrap().clone();
        let result = index.query(&seed, 3);
        assert_eq!(result[0].row_id, 0);
        assert_eq!(result[1].row_id, 1);
        assert_eq!(result[2].row_id, 2);
        assert!(result[0].distance.abs() < 1e-6);
        assert!((result[2].distance - (1.0 - 1.0 / 2.0f32.sqrt())).abs() < 1e-6);
    }

    #[test]
    fn results_are_sorted_with_row_id_tie_break() {
        // Rows 1 and 3 are identical: equal distance, lower row id first.
        let index = dense_index(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![2.0, 0.0],
        ]);
        let result = index.query(&vec![1.0, 0.0], 4);
        assert_eq!(result[0].row_id, 1);
        assert_eq!(result[1].row_id, 3);
        assert_eq!(result[0].distance, result[1].distance);
        for pair in result.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn k_may_exceed_corpus_size() {
        let index = dense_index(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let result = index.query(&vec![1.0, 0.0], 100);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn never_more_than_k_results() {
        let index = dense_index(vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]]);
        assert_eq!(index.query(&vec![1.0], 2).len(), 2);
        assert_eq!(index.query(&vec![1.0], 0).len(), 0);
    }

    #[test]
    fn zero_vector_has_maximal_distance_from_everything() {
        let index = dense_index(vec![vec![1.0, 0.0], vec![0.0, 0.0]]);
        let result = index.query(&vec![0.0, 0.0], 2);
        assert!(result.iter().all(|n| n.distance == 1.0));
        // Zero query against zero row is also 1, not NaN.
        let result = index.query(&vec![1.0, 0.0], 2);
        assert_eq!(result[1].row_id, 1);
        assert_eq!(result[1].distance, 1.0);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let rows: Vec<Vec<f32>> = (0..50)
            .map(|i| vec![(i as f32).sin(), (i as f32).cos(), (i as f32 * 0.3).sin()])
            .collect();
        let index = dense_index(rows);
        let q = vec![0.3, -0.7, 0.4];
        let a = index.query(&q, 10);
        let b = index.query(&q, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn sparse_and_dense_agree() {
        let sparse = VectorIndex::build(vec![
            SparseVector::from_entries(vec![(0, 1.0)]),
            SparseVector::from_entries(vec![(0, 1.0), (1, 1.0)]),
            SparseVector::from_entries(vec![(1, 1.0)]),
        ])
        .unwrap();
        let dense = dense_index(vec![
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
        ]);
        let sq = SparseVector::from_entries(vec![(0, 1.0)]);
        let s = sparse.query(&sq, 3);
        let d = dense.query(&vec![1.0, 0.0], 3);
        for (a, b) in s.iter().zip(d.iter()) {
            assert_eq!(a.row_id, b.row_id);
            assert!((a.distance - b.distance).abs() < 1e-6);
        }
    }
}
