//! Sparse vector representation used for feature matrix rows.

use serde::{Deserialize, Serialize};

/// A sparse vector: (column, value) entries sorted by ascending column.
///
/// Zero entries are never stored. Construction through `from_entries` keeps
/// the sort invariant, which `dot` relies on for its merge walk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    /// Build from unsorted entries; drops zeros and sorts by column.
    pub fn from_entries(mut entries: Vec<(u32, f32)>) -> Self {
        entries.retain(|&(_, v)| v != 0.0);
        entries.sort_unstable_by_key(|&(c, _)| c);
        SparseVector { entries }
    }

    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest stored column + 1, or 0 for the empty vector.
    pub fn min_dim(&self) -> usize {
        self.entries
            .last()
            .map(|&(c, _)| c as usize + 1)
            .unwrap_or(0)
    }

    /// Dot product by merging the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let mut sum = 0.0f32;
        let (mut i, mut j) = (0usize, 0usize);
        let a = &self.entries;
        let b = &other.entries;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        self.entries
            .iter()
            .map(|&(_, v)| v * v)
            .sum::<f32>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_entries_sorts_and_drops_zeros() {
        let v = SparseVector::from_entries(vec![(5, 1.0), (2, 0.0), (1, 3.0)]);
        assert_eq!(v.entries(), &[(1, 3.0), (5, 1.0)]);
        assert_eq!(v.min_dim(), 6);
    }

    #[test]
    fn dot_product_over_shared_columns() {
        let a = SparseVector::from_entries(vec![(0, 1.0), (3, 2.0), (7, 4.0)]);
        let b = SparseVector::from_entries(vec![(3, 5.0), (7, 0.5), (9, 1.0)]);
        assert_eq!(a.dot(&b), 2.0 * 5.0 + 4.0 * 0.5);
        assert_eq!(a.dot(&b), b.dot(&a));
    }

    #[test]
    fn norm_of_empty_vector_is_zero() {
        let v = SparseVector::default();
        assert_eq!(v.norm(), 0.0);
        assert_eq!(v.min_dim(), 0);
    }

    #[test]
    fn norm_matches_hand_computation() {
        let v = SparseVector::from_entries(vec![(0, 3.0), (1, 4.0)]);
        assert_eq!(v.norm(), 5.0);
    }
}
