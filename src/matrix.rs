//! Row-major `f32` matrix holding the vectors to index.

/// Dense `(rows, dim)` matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatrix {
    dim: usize,
    data: Vec<f32>,
}

impl VectorMatrix {
    /// Empty matrix with a fixed row width.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    /// Appends a row. Callers must pass exactly `dim` values.
    pub fn push_row(&mut self, row: &[f32]) {
        assert_eq!(row.len(), self.dim, "row width must match matrix dimension");
        self.data.extend_from_slice(row);
    }

    /// Row width.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// Borrows row `idx`.
    pub fn row(&self, idx: usize) -> Option<&[f32]> {
        let start = idx.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    /// Flat row-major view.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Scales every row to unit L2 norm.
    ///
    /// A row with zero norm is divided by 1 instead, so it stays all zeros.
    pub fn l2_normalize_rows(&mut self) {
        if self.dim == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(self.dim) {
            let norm = l2_norm(row);
            let norm = if norm == 0.0 { 1.0 } else { norm };
            for value in row.iter_mut() {
                *value /= norm;
            }
        }
    }
}

/// Euclidean norm of a slice.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
