use crate::common::*;

/// Immutable N x D observation matrix
#[derive(Debug, Clone)]
pub struct Dataset {
    xx: Mat,
}

/// Sufficient statistics of a one-dimensional dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnivariateStats {
    /// number of observations
    pub n: f64,
    /// `Σ x_n`
    pub sum: f64,
    /// `Σ x_n²`
    pub sum_sq: f64,
}

impl Dataset {
    /// Wrap an N x D matrix; fails on empty or non-finite data
    pub fn new(xx: Mat) -> anyhow::Result<Self> {
        if xx.nrows() == 0 || xx.ncols() == 0 {
            return Err(invalid_config(format!(
                "empty dataset ({} x {})",
                xx.nrows(),
                xx.ncols()
            )));
        }
        if let Some(pos) = xx.iter().position(|x| !x.is_finite()) {
            // column-major position
            let (i, j) = (pos % xx.nrows(), pos / xx.nrows());
            return Err(invalid_config(format!(
                "non-finite observation at row {}, column {}",
                i, j
            )));
        }
        Ok(Self { xx })
    }

    /// Build from a list of rows of equal length
    pub fn from_rows(rows: &[Vec<f64>]) -> anyhow::Result<Self> {
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(i) = rows.iter().position(|r| r.len() != ncols) {
            return Err(invalid_config(format!(
                "row {} has {} columns, expected {}",
                i,
                rows[i].len(),
                ncols
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::new(Mat::from_row_slice(rows.len(), ncols, &flat))
    }

    /// One-dimensional dataset
    pub fn from_slice(x: &[f64]) -> anyhow::Result<Self> {
        Self::new(Mat::from_column_slice(x.len(), 1, x))
    }

    /// number of observations N
    pub fn nrows(&self) -> usize {
        self.xx.nrows()
    }

    /// dimension D
    pub fn ncols(&self) -> usize {
        self.xx.ncols()
    }

    /// the N x D matrix
    pub fn matrix(&self) -> &Mat {
        &self.xx
    }

    /// column means
    pub fn sample_mean(&self) -> DVec {
        self.xx.row_mean().transpose()
    }

    /// `(N, Σx, Σx²)`; only defined for D = 1
    pub fn univariate_stats(&self) -> anyhow::Result<UnivariateStats> {
        if self.ncols() != 1 {
            return Err(invalid_config(format!(
                "univariate model needs one column, got {}",
                self.ncols()
            )));
        }
        let col = self.xx.column(0);
        Ok(UnivariateStats {
            n: self.nrows() as f64,
            sum: col.sum(),
            sum_sq: col.iter().map(|x| x * x).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_and_empty() {
        assert!(Dataset::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(Dataset::from_rows(&[]).is_err());
        assert!(Dataset::from_slice(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn univariate_stats() {
        let data = Dataset::from_slice(&[1.0, 2.0, 3.0]).unwrap();
        let s = data.univariate_stats().unwrap();
        assert_eq!(s.n, 3.0);
        assert_eq!(s.sum, 6.0);
        assert_eq!(s.sum_sq, 14.0);

        let two = Dataset::from_rows(&[vec![1.0, 2.0]]).unwrap();
        assert!(two.univariate_stats().is_err());
        assert_eq!(two.sample_mean().len(), 2);
    }
}
