//! Dense linear-algebra helpers for process propagation.
//!
//! The propagation formulas work in vectorised (column-stacked) form:
//! ```text
//! vec(A X B') = (B ⊗ A) vec(X)
//! ```
//! which turns the matrix Lyapunov equation for the Ornstein-Uhlenbeck
//! noise covariance into a linear system in the Kronecker sum
//! `A ⊕ B = A ⊗ I + I ⊗ B`.
//!
//! Validation helpers fail with descriptive `ProcessError`s so that every
//! process constructor can reject malformed shapes eagerly.

use nalgebra::{DMatrix, DVector};

use crate::types::error::ProcessError;

/// Kronecker sum `a ⊕ b = a ⊗ I_m + I_n ⊗ b` for square `a` (n×n) and
/// square `b` (m×m).
///
/// # Examples
///
/// ```
/// use ito_core::math::linalg::kron_sum;
/// use nalgebra::DMatrix;
///
/// let a = DMatrix::from_element(1, 1, 2.0);
/// let k = kron_sum(&a, &a);
/// assert_eq!(k, DMatrix::from_element(1, 1, 4.0));
/// ```
pub fn kron_sum(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    let eye_n = DMatrix::identity(a.nrows(), a.nrows());
    let eye_m = DMatrix::identity(b.nrows(), b.nrows());
    a.kronecker(&eye_m) + eye_n.kronecker(b)
}

/// Column-stacking vectorisation `vec(M)`.
pub fn vec_mat(m: &DMatrix<f64>) -> DVector<f64> {
    // nalgebra stores column-major, so the raw slice is already vec(M).
    DVector::from_column_slice(m.as_slice())
}

/// Inverse of [`vec_mat`]: reshape a length `r*c` vector into an `r × c`
/// matrix, column by column.
///
/// # Panics
///
/// If `v.len()` is not a multiple of `nrows`.
pub fn unvec(v: &DVector<f64>, nrows: usize) -> DMatrix<f64> {
    assert_eq!(
        v.len() % nrows,
        0,
        "vector of length {} cannot be reshaped into {} rows",
        v.len(),
        nrows
    );
    let ncols = v.len() / nrows;
    DMatrix::from_column_slice(nrows, ncols, v.as_slice())
}

/// Lower-triangular Cholesky factor `L` with `L L' = m`.
///
/// # Errors
///
/// `NumericalFailure` if `m` is not positive definite.
pub fn cholesky_lower(m: &DMatrix<f64>) -> Result<DMatrix<f64>, ProcessError> {
    m.clone()
        .cholesky()
        .map(|c| c.l())
        .ok_or_else(|| ProcessError::numerical("cholesky", "matrix is not positive definite"))
}

/// Check that `m` is square.
pub fn check_square(name: &str, m: &DMatrix<f64>) -> Result<(), ProcessError> {
    if m.nrows() != m.ncols() {
        return Err(ProcessError::config(format!(
            "{} must be square, got {}x{}",
            name,
            m.nrows(),
            m.ncols()
        )));
    }
    Ok(())
}

/// Check that `m` has exactly `nrows` rows.
pub fn check_rows(name: &str, m: &DMatrix<f64>, nrows: usize) -> Result<(), ProcessError> {
    if m.nrows() != nrows {
        return Err(ProcessError::config(format!(
            "{} must have {} rows, got {}",
            name,
            nrows,
            m.nrows()
        )));
    }
    Ok(())
}

/// Check that a vector has exactly `len` entries.
pub fn check_len(name: &str, v: &DVector<f64>, len: usize) -> Result<(), ProcessError> {
    if v.len() != len {
        return Err(ProcessError::config(format!(
            "{} must have {} entries, got {}",
            name,
            len,
            v.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kron_sum_scalar() {
        // For 1x1 matrices the Kronecker sum is plain addition.
        let a = DMatrix::from_element(1, 1, 1.5);
        let b = DMatrix::from_element(1, 1, 0.5);
        assert_eq!(kron_sum(&a, &b), DMatrix::from_element(1, 1, 2.0));
    }

    #[test]
    fn test_kron_sum_2x2() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let k = kron_sum(&a, &a);
        assert_eq!(k.nrows(), 4);
        assert_eq!(k.ncols(), 4);
        // Diagonal entries are a_ii + a_jj.
        assert_relative_eq!(k[(0, 0)], 2.0);
        assert_relative_eq!(k[(1, 1)], 5.0);
        assert_relative_eq!(k[(2, 2)], 5.0);
        assert_relative_eq!(k[(3, 3)], 8.0);
    }

    #[test]
    fn test_kron_sum_solves_lyapunov() {
        // vec(AX + XA') = (A ⊕ A) vec(X)
        let a = DMatrix::from_row_slice(2, 2, &[0.9, 0.1, 0.2, 1.1]);
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 0.3, 0.3, 2.0]);
        let lhs = &a * &x + &x * a.transpose();
        let rhs = unvec(&(kron_sum(&a, &a) * vec_mat(&x)), 2);
        assert_relative_eq!(lhs, rhs, epsilon = 1e-12);
    }

    #[test]
    fn test_vec_unvec_roundtrip() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let v = vec_mat(&m);
        // Column stacking: first column, then second.
        assert_eq!(v.as_slice(), &[1.0, 3.0, 2.0, 4.0]);
        assert_eq!(unvec(&v, 2), m);
    }

    #[test]
    #[should_panic(expected = "cannot be reshaped")]
    fn test_unvec_rejects_ragged_length() {
        let v = DVector::zeros(5);
        let _ = unvec(&v, 2);
    }

    #[test]
    fn test_cholesky_lower() {
        let m = DMatrix::from_row_slice(2, 2, &[4.0, 2.0, 2.0, 5.0]);
        let l = cholesky_lower(&m).unwrap();
        assert_relative_eq!(&l * l.transpose(), m, epsilon = 1e-12);
        // Strictly upper-triangular part is zero.
        assert_relative_eq!(l[(0, 1)], 0.0);
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let err = cholesky_lower(&m).unwrap_err();
        assert!(matches!(err, ProcessError::NumericalFailure { .. }));
    }

    #[test]
    fn test_shape_checks() {
        let m = DMatrix::zeros(2, 3);
        assert!(check_square("m", &m).is_err());
        assert!(check_rows("m", &m, 2).is_ok());
        assert!(check_rows("m", &m, 3).is_err());

        let v = DVector::zeros(2);
        assert!(check_len("v", &v, 2).is_ok());
        assert!(check_len("v", &v, 1).is_err());
    }
}
