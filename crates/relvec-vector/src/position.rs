//! Relative position embeddings
//!
//! The table has `2M - 1` rows, one per relative offset in
//! `[-(M - 1), M - 1]`:
//!
//! ```text
//! offset     -(M-1) ... -1   0   1 ... M-1
//! table row     0   ... M-2 M-1  M ... 2M-2
//! ```
//!
//! For an entity at position `p`, rows `[M - 1 - p, 2M - 1 - p)` give the
//! embedding of offset `t - p` for every token index `t` in `[0, M)`.

use ndarray::{s, Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use relvec_core::{RelvecError, Result};

/// Fixed lookup table of relative position vectors
#[derive(Debug, Clone)]
pub struct PositionEmbeddingTable {
    max_length: usize,
    table: Array2<f32>,
}

impl PositionEmbeddingTable {
    /// Fill a table with uniform values in `[0, 1)`
    pub fn random<R: Rng>(max_length: usize, width: usize, rng: &mut R) -> Self {
        let rows = (2 * max_length).saturating_sub(1);
        let table = Array2::from_shape_fn((rows, width), |_| rng.gen::<f32>());
        Self { max_length, table }
    }

    /// Random table, reproducible when a seed is given
    pub fn seeded(max_length: usize, width: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::random(max_length, width, &mut rng)
    }

    /// Wrap an existing table; it must have `2 * max_length - 1` rows
    pub fn from_array(max_length: usize, table: Array2<f32>) -> Result<Self> {
        let expected = (2 * max_length).saturating_sub(1);
        if max_length == 0 || table.nrows() != expected {
            return Err(RelvecError::InvalidInput(format!(
                "position table for max length {max_length} needs {expected} rows, got {}",
                table.nrows()
            )));
        }
        Ok(Self { max_length, table })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Width of each position vector
    pub fn width(&self) -> usize {
        self.table.ncols()
    }

    pub fn as_array(&self) -> ArrayView2<'_, f32> {
        self.table.view()
    }

    /// Embedding of a signed token-to-entity offset
    pub fn row_for_offset(&self, offset: isize) -> Option<ArrayView1<'_, f32>> {
        let row = offset + self.max_length as isize - 1;
        if row < 0 || row as usize >= self.table.nrows() {
            return None;
        }
        Some(self.table.row(row as usize))
    }

    /// The `M` rows aligned with a sentence whose entity sits at `position`
    pub fn window(&self, position: usize) -> Result<ArrayView2<'_, f32>> {
        if position >= self.max_length {
            return Err(RelvecError::InvalidInput(format!(
                "entity position {position} outside window of {}",
                self.max_length
            )));
        }
        let start = self.max_length - 1 - position;
        Ok(self.table.slice(s![start..start + self.max_length, ..]))
    }
}
