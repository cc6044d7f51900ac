//! Gaussian distribution value type.
//!
//! `NormalDistr` is the currency of distribution propagation: a mean vector
//! together with a covariance matrix. A Dirac delta (known starting value)
//! is represented as the degenerate case of zero covariance, so that exact
//! filtering code can treat point estimates and full distributions
//! uniformly.
//!
//! Equality is structural on `(mean, cov)` content; the Markov propagation
//! cache relies on this to compare keys by value rather than identity.

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::math::linalg::{check_rows, check_square, cholesky_lower};
use crate::types::error::ProcessError;

/// A multivariate Gaussian, or a Dirac delta when the covariance is zero.
///
/// # Examples
///
/// ```
/// use ito_core::distributions::NormalDistr;
/// use nalgebra::{DMatrix, DVector};
///
/// let distr = NormalDistr::new(
///     DVector::from_vec(vec![1.0, 2.0]),
///     DMatrix::identity(2, 2),
/// ).unwrap();
/// assert_eq!(distr.dim(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalDistr {
    mean: DVector<f64>,
    cov: DMatrix<f64>,
}

impl NormalDistr {
    /// Create a Gaussian from a mean vector and covariance matrix.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `cov` is not square or its row count does
    /// not match the length of `mean`. Positive definiteness is not checked
    /// here; a degenerate covariance is legal (Dirac delta) and only the
    /// Cholesky step of sampling requires definiteness.
    pub fn new(mean: DVector<f64>, cov: DMatrix<f64>) -> Result<Self, ProcessError> {
        check_square("cov", &cov)?;
        check_rows("cov", &cov, mean.len())?;
        Ok(Self { mean, cov })
    }

    /// Point mass at `point`: mean `point`, zero covariance.
    pub fn dirac_delta(point: DVector<f64>) -> Self {
        let dim = point.len();
        Self {
            mean: point,
            cov: DMatrix::zeros(dim, dim),
        }
    }

    /// Standard Gaussian of dimension `dim`: zero mean, identity covariance.
    pub fn standard(dim: usize) -> Self {
        Self {
            mean: DVector::zeros(dim),
            cov: DMatrix::identity(dim, dim),
        }
    }

    /// Dimension of the distribution.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Mean vector.
    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    /// Covariance matrix.
    pub fn cov(&self) -> &DMatrix<f64> {
        &self.cov
    }
}

impl fmt::Display for NormalDistr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NormalDistr(dim={}, mean={}, cov={})", self.dim(), self.mean, self.cov)
    }
}

/// Build a 2-D volatility factor from two marginal standard deviations and
/// a correlation:
/// ```text
/// vol = [ sd1                    0                  ]
///       [ cor * sd2   sqrt(1 - cor^2) * sd2 ]
/// ```
/// so that `vol vol'` has variances `sd1^2`, `sd2^2` and correlation `cor`.
///
/// # Errors
///
/// `InvalidConfiguration` if either standard deviation is negative or
/// `cor` is outside `[-1, 1]`.
pub fn vol_2d(sd1: f64, sd2: f64, cor: f64) -> Result<DMatrix<f64>, ProcessError> {
    if sd1 < 0.0 || sd2 < 0.0 {
        return Err(ProcessError::config(format!(
            "standard deviations must be non-negative, got sd1={}, sd2={}",
            sd1, sd2
        )));
    }
    if !(-1.0..=1.0).contains(&cor) {
        return Err(ProcessError::config(format!(
            "correlation must lie in [-1, 1], got {}",
            cor
        )));
    }
    Ok(DMatrix::from_row_slice(
        2,
        2,
        &[sd1, 0.0, cor * sd2, (1.0 - cor * cor).sqrt() * sd2],
    ))
}

/// Decompose a covariance matrix into a lower-triangular volatility factor.
///
/// # Errors
///
/// `InvalidConfiguration` if `cov` is not square; `NumericalFailure` if it
/// is not positive definite.
pub fn vol_from_cov(cov: &DMatrix<f64>) -> Result<DMatrix<f64>, ProcessError> {
    check_square("cov", cov)?;
    cholesky_lower(cov)
}
