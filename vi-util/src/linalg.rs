use nalgebra::{Cholesky, DMatrix, RowDVector};

/// Log-determinant of a symmetric positive-definite matrix via Cholesky
///
/// ```text
/// ln |A| = 2 Σ_i ln L_ii,  A = L L'
/// ```
///
/// Fails if the matrix is not square, not symmetric, or not positive-definite.
pub fn cholesky_log_det(mat: &DMatrix<f64>) -> anyhow::Result<f64> {
    if !is_symmetric(mat, 1e-10) {
        anyhow::bail!("matrix is not square and symmetric");
    }
    let chol = Cholesky::new(mat.clone())
        .ok_or_else(|| anyhow::anyhow!("matrix is not positive-definite"))?;
    let log_det = 2.0 * chol.l_dirty().diagonal().iter().map(|x| x.ln()).sum::<f64>();
    Ok(log_det)
}

/// Square and symmetric within an absolute tolerance
pub fn is_symmetric(mat: &DMatrix<f64>, tol: f64) -> bool {
    if mat.nrows() != mat.ncols() {
        return false;
    }
    let d = mat.nrows();
    (0..d).all(|i| (0..i).all(|j| (mat[(i, j)] - mat[(j, i)]).abs() <= tol))
}

/// Quadratic form `v A v'` of a row vector `v`
#[inline]
pub fn quad_form(mat: &DMatrix<f64>, v: &RowDVector<f64>) -> f64 {
    (v * mat).dot(v)
}
