//! Truncated linear projection of the sparse feature matrix.
//!
//! Fits a rank-R orthonormal basis for the dominant row subspace of the
//! feature matrix via randomized subspace iteration, seeded for
//! reproducibility. The basis is frozen at build time; any future row is
//! projected with the same basis, never refitted.

use crate::features::{FeatureMatrix, SparseVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Power iterations for the subspace refinement. Fixed so that two builds
/// with the same seed produce bit-identical bases.
const N_ITERATIONS: usize = 7;

/// Frozen rank-R projection basis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TruncatedProjection {
    /// Orthonormal basis columns, each of length `dim`.
    basis: Vec<Vec<f32>>,
    dim: usize,
    seed: u64,
}

impl TruncatedProjection {
    /// Fit a rank-`rank` basis over the matrix. The effective rank is
    /// clamped to min(rank, rows, dim).
    pub fn fit(matrix: &FeatureMatrix, rank: usize, seed: u64) -> Self {
        let dim = matrix.dim();
        let n_rows = matrix.n_rows();
        let rank = rank.min(dim).min(n_rows).max(1);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut basis: Vec<Vec<f32>> = (0..rank)
            .map(|_| (0..dim).map(|_| rng.sample::<f32, _>(StandardNormal)).collect())
            .collect();
        orthonormalize(&mut basis);

        for _ in 0..N_ITERATIONS {
            // W = A * V, row-parallel; collect preserves row order so the
            // result is independent of the thread schedule.
            let projected: Vec<Vec<f32>> = matrix
                .rows
                .par_iter()
                .map(|row| project_row(row, &basis))
                .collect();

            // V = A^T * W, accumulated sequentially for determinism.
            let mut next: Vec<Vec<f32>> = vec![vec![0.0; dim]; basis.len()];
            for (row, weights) in matrix.rows.iter().zip(projected.iter()) {
                for &(column, value) in row.entries() {
                    for (c, basis_column) in next.iter_mut().enumerate() {
                        basis_column[column as usize] += value * weights[c];
                    }
                }
            }
            orthonormalize(&mut next);
            basis = next;
        }

        info!(
            "Fitted rank-{} projection over {}x{} feature matrix (seed {})",
            basis.len(),
            n_rows,
            dim,
            seed
        );
        TruncatedProjection { basis, dim, seed }
    }

    pub fn rank(&self) -> usize {
        self.basis.len()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Project one row with the frozen basis.
    pub fn transform_row(&self, row: &SparseVector) -> Vec<f32> {
        project_row(row, &self.basis)
    }

    /// Project the whole matrix, preserving row order.
    pub fn transform(&self, matrix: &FeatureMatrix) -> Vec<Vec<f32>> {
        matrix
            .rows
            .par_iter()
            .map(|row| self.transform_row(row))
            .collect()
    }
}

fn project_row(row: &SparseVector, basis: &[Vec<f32>]) -> Vec<f32> {
    basis
        .iter()
        .map(|column| {
            row.entries()
                .iter()
                .map(|&(c, v)| v * column[c as usize])
                .sum()
        })
        .collect()
}

/// Modified Gram-Schmidt. Columns that collapse to (numerically) zero are
/// left as zero vectors; they contribute nothing to projections.
fn orthonormalize(columns: &mut [Vec<f32>]) {
    let n = columns.len();
    for i in 0..n {
        for j in 0..i {
            let dot: f32 = columns[i]
                .iter()
                .zip(columns[j].iter())
                .map(|(a, b)| a * b)
                .sum();
            let (left, right) = columns.split_at_mut(i);
            for (vi, vj) in right[0].iter_mut().zip(left[j].iter()) {
                *vi -= dot * vj;
            }
        }
        let norm: f32 = columns[i].iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 1e-12 {
            for v in columns[i].iter_mut() {
                *v /= norm;
            }
        } else {
            for v in columns[i].iter_mut() {
                *v = 0.0;
            }
        }
    }
}
