//! Min-max scaling of numeric attribute columns.

use serde::{Deserialize, Serialize};

/// Per-column min-max scaler.
///
/// Scale parameters are computed once over the build corpus and frozen;
/// query-time vectors for new items reuse them unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MinMaxScaler {
    mins: Vec<f32>,
    maxs: Vec<f32>,
}

impl MinMaxScaler {
    /// Fit over a corpus of equal-length rows. Panics on an empty corpus or
    /// ragged rows; callers guarantee both (the corpus is validated upstream).
    pub fn fit(rows: &[[f32; 13]]) -> Self {
        assert!(!rows.is_empty(), "cannot fit scaler on empty corpus");
        let width = rows[0].len();
        let mut mins = vec![f32::INFINITY; width];
        let mut maxs = vec![f32::NEG_INFINITY; width];
        for row in rows {
            for (i, &v) in row.iter().enumerate() {
                mins[i] = mins[i].min(v);
                maxs[i] = maxs[i].max(v);
            }
        }
        MinMaxScaler { mins, maxs }
    }

    pub fn width(&self) -> usize {
        self.mins.len()
    }

    /// Scale one value to [0,1]. A column constant across the corpus
    /// (max == min) scales to 0 for every row, avoiding division by zero.
    /// Out-of-range query-time values are clamped.
    pub fn scale(&self, column: usize, value: f32) -> f32 {
        let (min, max) = (self.mins[column], self.maxs[column]);
        if max == min {
            return 0.0;
        }
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }

    /// Scale a full row.
    pub fn transform(&self, row: &[f32; 13]) -> Vec<f32> {
        row.iter()
            .enumerate()
            .map(|(i, &v)| self.scale(i, v))
            .collect()
    }
}
