//! Wiener process (Brownian motion with drift).
//!
//! The process is described by:
//! ```text
//! dX(t) = mean * dt + vol * dW(t)
//! ```
//! with constant drift `mean` and constant volatility loading `vol`. The
//! transition law is available in closed form for any step size:
//! ```text
//! X(t) | X(t0)=x0  ~  N(x0 + mean*dt, dt * vol*vol')
//! ```
//!
//! ## Usage
//!
//! ```
//! use ito_models::processes::{MarkovProcess, WienerProcess};
//! use ito_core::distributions::NormalDistr;
//! use nalgebra::DVector;
//!
//! // Standard 1-D Brownian motion.
//! let mut p = WienerProcess::default();
//!
//! // Unit step from a known starting value of zero.
//! let d = p
//!     .propagate_distr(1.0.into(), 0.0.into(), &NormalDistr::dirac_delta(DVector::zeros(1)))
//!     .unwrap();
//! assert!((d.cov()[(0, 0)] - 1.0).abs() < 1e-12);
//! ```

use std::fmt;

use chrono::Duration;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

use ito_core::distributions::{self, NormalDistr};
use ito_core::math::linalg::check_len;
use ito_core::types::error::ProcessError;
use ito_core::types::time::{elapsed_step, TimeCoord};

use super::ito::ItoProcess;
use super::markov::{MarkovProcess, SolvedItoMarkovProcess, TransitionCache};

/// Brownian motion with constant drift and constant diffusion.
///
/// `mean`, `vol` and the derived `cov = vol*vol'` are fixed at
/// construction; the only mutable state is the transition cache.
#[derive(Debug)]
pub struct WienerProcess {
    mean: DVector<f64>,
    vol: DMatrix<f64>,
    cov: DMatrix<f64>,
    time_unit: Duration,
    cache: TransitionCache,
}

impl WienerProcess {
    /// Create a Wiener process from optional drift and volatility.
    ///
    /// The dimension is settled once, up front, from whichever arguments
    /// are supplied:
    /// - neither: a 1-D standard process (`mean = 0`, `vol = 1`)
    /// - only `mean`: `vol` defaults to the identity of the same dimension
    /// - only `vol`: `mean` defaults to the zero vector of `vol`'s row count
    /// - both: row counts must agree
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` on a row-count mismatch or a `vol` with no
    /// columns.
    pub fn new(
        mean: Option<DVector<f64>>,
        vol: Option<DMatrix<f64>>,
    ) -> Result<Self, ProcessError> {
        let (mean, vol) = match (mean, vol) {
            (None, None) => (DVector::zeros(1), DMatrix::identity(1, 1)),
            (Some(mean), None) => {
                let dim = mean.len();
                (mean, DMatrix::identity(dim, dim))
            }
            (None, Some(vol)) => (DVector::zeros(vol.nrows()), vol),
            (Some(mean), Some(vol)) => {
                if mean.len() != vol.nrows() {
                    return Err(ProcessError::config(format!(
                        "mean has {} rows but vol has {}",
                        mean.len(),
                        vol.nrows()
                    )));
                }
                (mean, vol)
            }
        };
        if mean.is_empty() || vol.ncols() == 0 {
            return Err(ProcessError::config(
                "process and noise dimensions must be positive",
            ));
        }
        let cov = &vol * vol.transpose();
        debug!(
            process_dim = mean.len(),
            noise_dim = vol.ncols(),
            "constructed Wiener process"
        );
        Ok(Self {
            mean,
            vol,
            cov,
            time_unit: Duration::days(1),
            cache: TransitionCache::new(),
        })
    }

    /// 1-D standard Brownian motion (`mean = 0`, `vol = 1`).
    pub fn standard() -> Self {
        Self::new(None, None).expect("standard 1-D configuration is valid")
    }

    /// 2-D process from per-coordinate drifts, marginal standard
    /// deviations, and their correlation.
    pub fn new_2d(
        mean1: f64,
        mean2: f64,
        sd1: f64,
        sd2: f64,
        cor: f64,
    ) -> Result<Self, ProcessError> {
        Self::new(
            Some(DVector::from_vec(vec![mean1, mean2])),
            Some(distributions::vol_2d(sd1, sd2, cor)?),
        )
    }

    /// Process from a drift vector and a full covariance matrix, decomposed
    /// into a lower-triangular volatility factor.
    pub fn from_cov(mean: DVector<f64>, cov: &DMatrix<f64>) -> Result<Self, ProcessError> {
        Self::new(Some(mean), Some(distributions::vol_from_cov(cov)?))
    }

    /// Replace the time unit used to normalise timestamp differences.
    pub fn with_time_unit(mut self, time_unit: Duration) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Constant drift vector.
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

    /// Cache hit/miss statistics.
    pub fn cache_stats(&self) -> (u64, u64) {
        (self.cache.hits(), self.cache.misses())
    }
}

impl Default for WienerProcess {
    fn default() -> Self {
        Self::standard()
    }
}

impl PartialEq for WienerProcess {
    /// Structural equality on `(mean, vol)`; cache state is not part of the
    /// process identity.
    fn eq(&self, other: &Self) -> bool {
        self.mean == other.mean && self.vol == other.vol
    }
}

impl ItoProcess for WienerProcess {
    fn process_dim(&self) -> usize {
        self.mean.len()
    }

    fn noise_dim(&self) -> usize {
        self.vol.ncols()
    }

    fn drift(&self, _time: f64, _state: &DVector<f64>) -> DVector<f64> {
        self.mean.clone()
    }

    fn diffusion(&self, _time: f64, _state: &DVector<f64>) -> DMatrix<f64> {
        self.vol.clone()
    }
}

impl MarkovProcess for WienerProcess {
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
        let mean = distr0.mean() + &self.mean * step;
        let cov = distr0.cov() + &self.cov * step;
        NormalDistr::new(mean, cov)
    }
}

impl SolvedItoMarkovProcess for WienerProcess {
    /// Closed form: `value0 + mean*dt + vol * sqrt(dt) * variate`.
    ///
    /// Forward steps only: a negative elapsed step has no real square root.
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
        let step = elapsed_step(time, time0, self.time_unit)?;
        Ok(value0 + &self.mean * step + &self.vol * (variate * step.sqrt()))
    }
}

impl fmt::Display for WienerProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WienerProcess(process_dim={}, noise_dim={}, mean={}, vol={})",
            self.process_dim(),
            self.noise_dim(),
            self.mean,
            self.vol
        )
    }
}
