//! Ornstein-Uhlenbeck process (mean-reverting).
//!
//! The process is described by:
//! ```text
//! dX(t) = -transition * (X(t) - mean) * dt + vol * dW(t)
//! ```
//! pulling the state towards `mean` at a rate set by the square
//! `transition` matrix. The transition law is exact for any step size:
//! ```text
//! X(t) | X(t0)=x0  ~  N( F*x0 + (I - F)*mean,  Q(dt) )
//! F = exp(-transition * dt)
//! ```
//! where the finite-interval noise covariance `Q(dt)` comes from the
//! continuous-time Lyapunov equation in vectorised form, with
//! `K = transition ⊕ transition`:
//! ```text
//! vec(Q(dt)) = K^-1 * (I - exp(-K * dt)) * vec(vol*vol')
//! ```
//! This is the closed-form solution, not an Euler approximation.
//!
//! The matrix exponentials `exp(-transition*dt)` and `exp(-K*dt)` are the
//! expensive quantities; each is memoised for the most recently requested
//! step only, which is the access pattern of filtering loops that query a
//! fixed step repeatedly.

use std::fmt;

use chrono::Duration;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

use ito_core::distributions::NormalDistr;
use ito_core::math::linalg::{check_len, check_rows, check_square, cholesky_lower, kron_sum, unvec, vec_mat};
use ito_core::types::error::ProcessError;
use ito_core::types::time::{elapsed_step, TimeCoord};

use super::ito::ItoProcess;
use super::markov::{MarkovProcess, SolvedItoMarkovProcess, TransitionCache};

/// Mean-reverting process with exact matrix-exponential transition factors.
///
/// `transition`, `mean`, `vol` and the derived quantities (`cov`, the
/// Kronecker sum and its inverse, `vec(cov)`) are fixed at construction;
/// the mutable state is the transition cache plus the two single-slot
/// matrix-exponential memos.
#[derive(Debug)]
pub struct OrnsteinUhlenbeckProcess {
    transition: DMatrix<f64>,
    mean: DVector<f64>,
    vol: DMatrix<f64>,
    cov: DMatrix<f64>,
    kron: DMatrix<f64>,
    kron_inv: DMatrix<f64>,
    cov_vec: DVector<f64>,
    time_unit: Duration,
    cache: TransitionCache,
    mrf_memo: Option<(f64, DMatrix<f64>)>,
    mrf_squared_memo: Option<(f64, DMatrix<f64>)>,
}

impl OrnsteinUhlenbeckProcess {
    /// Create an Ornstein-Uhlenbeck process from optional parameters.
    ///
    /// The dimension is settled once, up front:
    /// - nothing supplied: a 1-D standard process (`transition = 1`,
    ///   `mean = 0`, `vol = 1`)
    /// - otherwise: every supplied argument must agree on its row count;
    ///   `transition` defaults to the identity, `mean` to the zero vector,
    ///   `vol` to the identity
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` on contradictory row counts or a non-square
    /// `transition`; `NumericalFailure` if the Kronecker sum
    /// `transition ⊕ transition` is singular (some pair of eigenvalues of
    /// `transition` sums to zero), since the noise covariance then has no
    /// closed form of this shape.
    pub fn new(
        transition: Option<DMatrix<f64>>,
        mean: Option<DVector<f64>>,
        vol: Option<DMatrix<f64>>,
    ) -> Result<Self, ProcessError> {
        // Settle the dimension from the supplied arguments before building
        // any derived matrix.
        let dim = match (&transition, &mean, &vol) {
            (None, None, None) => 1,
            (t, m, v) => {
                let mut dims = Vec::new();
                if let Some(t) = t {
                    dims.push(("transition", t.nrows()));
                }
                if let Some(m) = m {
                    dims.push(("mean", m.len()));
                }
                if let Some(v) = v {
                    dims.push(("vol", v.nrows()));
                }
                let (first_name, first_dim) = dims[0];
                for (name, d) in &dims[1..] {
                    if *d != first_dim {
                        return Err(ProcessError::config(format!(
                            "{} has {} rows but {} has {}",
                            first_name, first_dim, name, d
                        )));
                    }
                }
                first_dim
            }
        };
        if dim == 0 {
            return Err(ProcessError::config("process dimension must be positive"));
        }

        let transition = transition.unwrap_or_else(|| DMatrix::identity(dim, dim));
        let mean = mean.unwrap_or_else(|| DVector::zeros(dim));
        let vol = vol.unwrap_or_else(|| DMatrix::identity(dim, dim));

        check_square("transition", &transition)?;
        check_rows("transition", &transition, dim)?;
        check_rows("vol", &vol, dim)?;
        if vol.ncols() == 0 {
            return Err(ProcessError::config("noise dimension must be positive"));
        }

        let cov = &vol * vol.transpose();
        let kron = kron_sum(&transition, &transition);
        let kron_inv = kron.clone().try_inverse().ok_or_else(|| {
            ProcessError::numerical(
                "kronecker sum inverse",
                "transition ⊕ transition is singular",
            )
        })?;
        let cov_vec = vec_mat(&cov);

        debug!(
            process_dim = dim,
            noise_dim = vol.ncols(),
            "constructed Ornstein-Uhlenbeck process"
        );
        Ok(Self {
            transition,
            mean,
            vol,
            cov,
            kron,
            kron_inv,
            cov_vec,
            time_unit: Duration::days(1),
            cache: TransitionCache::new(),
            mrf_memo: None,
            mrf_squared_memo: None,
        })
    }

    /// 1-D standard process (`transition = 1`, `mean = 0`, `vol = 1`).
    pub fn standard() -> Self {
        Self::new(None, None, None).expect("standard 1-D configuration is valid")
    }

    /// Replace the time unit used to normalise timestamp differences.
    pub fn with_time_unit(mut self, time_unit: Duration) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Mean-reversion speed matrix.
    pub fn transition(&self) -> &DMatrix<f64> {
        &self.transition
    }

    /// Long-run mean.
    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    /// Constant volatility loading.
    pub fn vol(&self) -> &DMatrix<f64> {
        &self.vol
    }

    /// Instantaneous covariance `vol * vol'`.
    pub fn cov(&self) -> &DMatrix<f64> {
        &self.cov
    }

    /// Cache hit/miss statistics of the distribution transition cache.
    pub fn cache_stats(&self) -> (u64, u64) {
        (self.cache.hits(), self.cache.misses())
    }

    /// `exp(-transition * step)`, memoised for the most recent step.
    pub fn mean_reversion_factor(&mut self, step: f64) -> DMatrix<f64> {
        match &self.mrf_memo {
            Some((cached_step, factor)) if *cached_step == step => factor.clone(),
            _ => {
                let factor = (-&self.transition * step).exp();
                self.mrf_memo = Some((step, factor.clone()));
                factor
            }
        }
    }

    /// `exp(-(transition ⊕ transition) * step)`, memoised for the most
    /// recent step.
    pub fn mean_reversion_factor_squared(&mut self, step: f64) -> DMatrix<f64> {
        match &self.mrf_squared_memo {
            Some((cached_step, factor)) if *cached_step == step => factor.clone(),
            _ => {
                let factor = (-&self.kron * step).exp();
                self.mrf_squared_memo = Some((step, factor.clone()));
                factor
            }
        }
    }

    /// Exact finite-interval noise covariance
    /// `unvec( K^-1 * (I - exp(-K*step)) * vec(cov) )`.
    pub fn noise_covariance(&mut self, step: f64) -> DMatrix<f64> {
        let dim = self.process_dim();
        let mrf_squared = self.mean_reversion_factor_squared(step);
        let eye = DMatrix::identity(dim * dim, dim * dim);
        unvec(&(&self.kron_inv * ((eye - mrf_squared) * &self.cov_vec)), dim)
    }
}

impl Default for OrnsteinUhlenbeckProcess {
    fn default() -> Self {
        Self::standard()
    }
}

impl PartialEq for OrnsteinUhlenbeckProcess {
    /// Structural equality on `(transition, mean, vol)`.
    ///
    /// The mean-reversion speed is part of the process identity: two
    /// processes that agree on `(mean, vol)` but revert at different
    /// rates propagate differently and must not compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.transition == other.transition && self.mean == other.mean && self.vol == other.vol
    }
}

impl ItoProcess for OrnsteinUhlenbeckProcess {
    fn process_dim(&self) -> usize {
        self.mean.len()
    }

    fn noise_dim(&self) -> usize {
        self.vol.ncols()
    }

    fn drift(&self, _time: f64, state: &DVector<f64>) -> DVector<f64> {
        -(&self.transition * (state - &self.mean))
    }

    fn diffusion(&self, _time: f64, _state: &DVector<f64>) -> DMatrix<f64> {
        self.vol.clone()
    }
}

impl MarkovProcess for OrnsteinUhlenbeckProcess {
    fn time_unit(&self) -> Duration {
        self.time_unit
    }

    fn cache_mut(&mut self) -> &mut TransitionCache {
        &mut self.cache
    }

    fn transition_distr(
        &mut self,
        step: f64,
        distr0: &NormalDistr,
    ) -> Result<NormalDistr, ProcessError> {
        let dim = self.process_dim();
        let mrf = self.mean_reversion_factor(step);
        let eye_minus_mrf = DMatrix::identity(dim, dim) - &mrf;
        let mean = &mrf * distr0.mean() + eye_minus_mrf * &self.mean;
        let cov = &mrf * distr0.cov() * mrf.transpose() + self.noise_covariance(step);
        NormalDistr::new(mean, cov)
    }
}

impl SolvedItoMarkovProcess for OrnsteinUhlenbeckProcess {
    /// Closed form: `F*value0 + (I - F)*mean + cholesky(Q(dt)) * variate`,
    /// exact regardless of step size.
    fn propagate(
        &mut self,
        time: TimeCoord,
        variate: &DVector<f64>,
        time0: TimeCoord,
        value0: &DVector<f64>,
    ) -> Result<DVector<f64>, ProcessError> {
        check_len("value0", value0, self.process_dim())?;
        check_len("variate", variate, self.noise_dim())?;
        if time == time0 {
            return Ok(value0.clone());
        }
        let dim = self.process_dim();
        let step = elapsed_step(time, time0, self.time_unit)?;
        let mrf = self.mean_reversion_factor(step);
        let eye_minus_mrf = DMatrix::identity(dim, dim) - &mrf;
        let mean = &mrf * value0 + eye_minus_mrf * &self.mean;
        let l = cholesky_lower(&self.noise_covariance(step))?;
        Ok(mean + l * variate)
    }
}

impl fmt::Display for OrnsteinUhlenbeckProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OrnsteinUhlenbeckProcess(process_dim={}, noise_dim={}, transition={}, mean={}, vol={})",
            self.process_dim(),
            self.noise_dim(),
            self.transition,
            self.mean,
            self.vol
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn ou_1d(theta: f64, mu: f64, sigma: f64) -> OrnsteinUhlenbeckProcess {
        OrnsteinUhlenbeckProcess::new(
            Some(DMatrix::from_element(1, 1, theta)),
            Some(DVector::from_element(1, mu)),
            Some(DMatrix::from_element(1, 1, sigma)),
        )
        .unwrap()
    }

    #[test]
    fn test_default_is_standard_1d() {
        let p = OrnsteinUhlenbeckProcess::standard();
        assert_eq!(p.process_dim(), 1);
        assert_eq!(p.noise_dim(), 1);
        assert_eq!(p.transition(), &DMatrix::identity(1, 1));
        assert_eq!(p.mean(), &DVector::zeros(1));
        assert_eq!(p.vol(), &DMatrix::identity(1, 1));
        assert_eq!(OrnsteinUhlenbeckProcess::default(), p);
    }

    #[test]
    fn test_dimension_inferred_from_transition() {
        let t = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 2.0]);
        let p = OrnsteinUhlenbeckProcess::new(Some(t), None, None).unwrap();
        assert_eq!(p.process_dim(), 2);
        assert_eq!(p.mean(), &DVector::zeros(2));
        assert_eq!(p.vol(), &DMatrix::identity(2, 2));
    }

    #[test]
    fn test_contradictory_rows_rejected() {
        let err = OrnsteinUhlenbeckProcess::new(
            None,
            Some(DVector::zeros(2)),
            Some(DMatrix::identity(3, 3)),
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_non_square_transition_rejected() {
        // A 2x3 transition agrees with the others on row count but is not
        // square.
        let err = OrnsteinUhlenbeckProcess::new(
            Some(DMatrix::zeros(2, 3)),
            Some(DVector::zeros(2)),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_singular_kronecker_sum_rejected() {
        // transition = 0 gives K = 0, which has no inverse.
        let err = OrnsteinUhlenbeckProcess::new(
            Some(DMatrix::zeros(1, 1)),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::NumericalFailure { .. }));
    }

    #[test]
    fn test_drift_pulls_towards_mean() {
        let p = ou_1d(2.0, 1.0, 1.0);
        // drift = -theta * (x - mu)
        let above = p.drift(0.0, &DVector::from_element(1, 3.0));
        let below = p.drift(0.0, &DVector::from_element(1, -1.0));
        assert_relative_eq!(above[0], -4.0);
        assert_relative_eq!(below[0], 4.0);
    }

    #[test]
    fn test_mean_reversion_factor_scalar() {
        let mut p = OrnsteinUhlenbeckProcess::standard();
        let dt = std::f64::consts::LN_2;
        let mrf = p.mean_reversion_factor(dt);
        assert_relative_eq!(mrf[(0, 0)], 0.5, epsilon = 1e-12);
        // Memoised value must answer identically.
        assert_relative_eq!(p.mean_reversion_factor(dt)[(0, 0)], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_memo_holds_most_recent_step_only() {
        let mut p = OrnsteinUhlenbeckProcess::standard();
        let a = p.mean_reversion_factor(1.0);
        let b = p.mean_reversion_factor(2.0);
        let a_again = p.mean_reversion_factor(1.0);
        assert_relative_eq!(a, a_again, epsilon = 1e-15);
        assert!(a[(0, 0)] > b[(0, 0)]);
    }

    #[test]
    fn test_noise_covariance_scalar_closed_form() {
        let (theta, sigma) = (1.5, 0.7);
        let mut p = ou_1d(theta, 0.0, sigma);
        let dt = 0.8;
        let q = p.noise_covariance(dt);
        // 1-D closed form: sigma^2 * (1 - exp(-2*theta*dt)) / (2*theta)
        let expected = sigma * sigma * (1.0 - (-2.0 * theta * dt).exp()) / (2.0 * theta);
        assert_relative_eq!(q[(0, 0)], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_stationarity_1d() {
        let (theta, mu, sigma) = (0.5, 2.0, 0.4);
        let mut p = ou_1d(theta, mu, sigma);
        let big = 200.0;

        assert!(p.mean_reversion_factor(big)[(0, 0)].abs() < 1e-12);

        let distr0 = NormalDistr::new(
            DVector::from_element(1, -7.0),
            DMatrix::from_element(1, 1, 3.0),
        )
        .unwrap();
        let d = p.propagate_distr(big.into(), 0.0.into(), &distr0).unwrap();
        assert_relative_eq!(d.mean()[0], mu, epsilon = 1e-10);
        // Stationary variance: sigma^2 / (2*theta)
        assert_relative_eq!(d.cov()[(0, 0)], sigma * sigma / (2.0 * theta), epsilon = 1e-10);
    }

    #[test]
    fn test_stationary_covariance_solves_lyapunov_2d() {
        let transition = DMatrix::from_row_slice(2, 2, &[1.0, 0.2, 0.0, 0.7]);
        let vol = DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.1, 0.3]);
        let mut p =
            OrnsteinUhlenbeckProcess::new(Some(transition.clone()), None, Some(vol.clone()))
                .unwrap();
        let s = p.noise_covariance(500.0);
        // transition*S + S*transition' = vol*vol' at stationarity.
        let residual = &transition * &s + &s * transition.transpose() - &vol * vol.transpose();
        assert_relative_eq!(residual.norm(), 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_transition_distr_combines_prior_and_noise() {
        let (theta, mu, sigma) = (1.0, 0.5, 1.0);
        let mut p = ou_1d(theta, mu, sigma);
        let distr0 = NormalDistr::new(
            DVector::from_element(1, 2.0),
            DMatrix::from_element(1, 1, 0.25),
        )
        .unwrap();
        let dt = 0.3;
        let d = p.propagate_distr(dt.into(), 0.0.into(), &distr0).unwrap();

        let f = (-theta * dt).exp();
        let expected_mean = f * 2.0 + (1.0 - f) * mu;
        let expected_cov = f * 0.25 * f + (1.0 - (-2.0 * theta * dt).exp()) / (2.0 * theta);
        assert_relative_eq!(d.mean()[0], expected_mean, epsilon = 1e-12);
        assert_relative_eq!(d.cov()[(0, 0)], expected_cov, epsilon = 1e-12);
    }

    #[test]
    fn test_propagate_identity_on_equal_times() {
        let mut p = OrnsteinUhlenbeckProcess::standard();
        let value0 = DVector::from_element(1, 2.0);
        let out = p
            .propagate(
                1.5.into(),
                &DVector::from_element(1, 9.0),
                1.5.into(),
                &value0,
            )
            .unwrap();
        assert_eq!(out, value0);
    }

    #[test]
    fn test_propagate_zero_variate_follows_mean_reversion() {
        let (theta, mu) = (1.0, 3.0);
        let mut p = ou_1d(theta, mu, 0.5);
        let dt = 2.0;
        let out = p
            .propagate(
                dt.into(),
                &DVector::zeros(1),
                0.0.into(),
                &DVector::from_element(1, 10.0),
            )
            .unwrap();
        let f = (-theta * dt).exp();
        assert_relative_eq!(out[0], f * 10.0 + (1.0 - f) * mu, epsilon = 1e-12);
    }

    #[test]
    fn test_equality_includes_transition() {
        let a = ou_1d(1.0, 0.0, 1.0);
        let b = ou_1d(1.0, 0.0, 1.0);
        let c = ou_1d(2.0, 0.0, 1.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_cache_reused_on_repeated_step() {
        let mut p = OrnsteinUhlenbeckProcess::standard();
        let d = NormalDistr::standard(1);
        p.propagate_distr(1.0.into(), 0.0.into(), &d).unwrap();
        p.propagate_distr(1.0.into(), 0.0.into(), &d).unwrap();
        assert_eq!(p.cache_stats(), (1, 1));
    }

    proptest! {
        #[test]
        fn prop_mean_reversion_factor_semigroup(
            s in 0.01..3.0f64,
            t in 0.01..3.0f64,
        ) {
            let transition = DMatrix::from_row_slice(2, 2, &[1.0, 0.3, 0.1, 0.8]);
            let mut p =
                OrnsteinUhlenbeckProcess::new(Some(transition), None, None).unwrap();
            let combined = p.mean_reversion_factor(s + t);
            let composed = p.mean_reversion_factor(s) * p.mean_reversion_factor(t);
            prop_assert!((combined - composed).norm() < 1e-9);
        }

        #[test]
        fn prop_equal_times_identity(
            t in -10.0..10.0f64,
            m0 in -5.0..5.0f64,
            c0 in 0.01..4.0f64,
        ) {
            let mut p = OrnsteinUhlenbeckProcess::standard();
            let distr0 = NormalDistr::new(
                DVector::from_element(1, m0),
                DMatrix::from_element(1, 1, c0),
            ).unwrap();
            let d = p.propagate_distr(t.into(), t.into(), &distr0).unwrap();
            prop_assert_eq!(d, distr0);
        }
    }
}
