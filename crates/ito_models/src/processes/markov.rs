//! Markov distribution propagation and its single-slot transition cache.
//!
//! Filtering and simulation loops frequently re-evaluate the same
//! transition (predict-then-update, repeated queries at an unchanged step),
//! so each process memoises the most recent
//! `(time, time0, distr0) -> distr` transition. The cache holds exactly one
//! entry, keys are compared by value (distributions on `(mean, cov)`
//! content), and any new key unconditionally evicts the old entry: last
//! write wins, no capacity parameter.
//!
//! Exact state propagation is derived generically from distribution
//! propagation: form a Dirac delta at the starting value, propagate it, and
//! draw `mean + cholesky(cov) * variate`. The variate is always supplied by
//! the caller, never generated here, so simulation stays reproducible under
//! externally controlled random streams.

use chrono::Duration;
use nalgebra::DVector;
use tracing::trace;

use ito_core::distributions::NormalDistr;
use ito_core::math::linalg::{check_len, cholesky_lower};
use ito_core::types::error::ProcessError;
use ito_core::types::time::{elapsed_step, TimeCoord};

use super::ito::ItoProcess;

/// Single-slot memo of the most recent distribution transition.
///
/// Owned by one process instance and mutated in place by
/// `propagate_distr`; concurrent use of one process requires external
/// synchronisation. Hit and miss counters make cache behaviour observable
/// in tests and trace logs.
#[derive(Debug, Default)]
pub struct TransitionCache {
    entry: Option<CacheEntry>,
    hits: u64,
    misses: u64,
}

#[derive(Debug)]
struct CacheEntry {
    time: TimeCoord,
    time0: TimeCoord,
    distr0: NormalDistr,
    distr: NormalDistr,
}

impl TransitionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cached transition for `(time, time0, distr0)`.
    ///
    /// Keys compare by value. A hit returns a clone of the cached result;
    /// a miss (including an empty cache) is counted and returns `None`.
    pub fn lookup(
        &mut self,
        time: TimeCoord,
        time0: TimeCoord,
        distr0: &NormalDistr,
    ) -> Option<NormalDistr> {
        match &self.entry {
            Some(e) if e.time == time && e.time0 == time0 && &e.distr0 == distr0 => {
                self.hits += 1;
                trace!(%time, %time0, "transition cache hit");
                Some(e.distr.clone())
            }
            _ => {
                self.misses += 1;
                trace!(%time, %time0, "transition cache miss");
                None
            }
        }
    }

    /// Store a transition, evicting whatever entry was present.
    pub fn store(
        &mut self,
        time: TimeCoord,
        time0: TimeCoord,
        distr0: NormalDistr,
        distr: NormalDistr,
    ) {
        self.entry = Some(CacheEntry {
            time,
            time0,
            distr0,
            distr,
        });
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of lookups that required recomputation.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// A process with an exact transition law for distributions.
///
/// Implementors supply the analytic kernel
/// [`transition_distr`](Self::transition_distr) over a dimensionless
/// elapsed step; the provided
/// [`propagate_distr`](Self::propagate_distr) handles the equal-times
/// identity, time normalisation, and caching.
pub trait MarkovProcess: ItoProcess {
    /// Reference duration converting timestamp differences into
    /// dimensionless steps (e.g. one trading day).
    fn time_unit(&self) -> Duration;

    /// The transition cache owned by this process.
    fn cache_mut(&mut self) -> &mut TransitionCache;

    /// Analytic transition law: propagate `distr0` over the dimensionless
    /// elapsed `step`.
    ///
    /// Exact, not an Euler approximation; called only with a non-zero step.
    fn transition_distr(
        &mut self,
        step: f64,
        distr0: &NormalDistr,
    ) -> Result<NormalDistr, ProcessError>;

    /// Propagate a distribution from `time0` to `time`.
    ///
    /// If `time == time0` the prior is returned unchanged without touching
    /// the cache. Otherwise the elapsed step is computed,
    /// and the transition is answered from the cache when the
    /// `(time, time0, distr0)` key matches by value, recomputed and
    /// stored otherwise. Timestamp differences are normalised by
    /// [`time_unit`](Self::time_unit).
    fn propagate_distr(
        &mut self,
        time: TimeCoord,
        time0: TimeCoord,
        distr0: &NormalDistr,
    ) -> Result<NormalDistr, ProcessError> {
        check_len("distr0 mean", distr0.mean(), self.process_dim())?;
        if time == time0 {
            return Ok(distr0.clone());
        }
        if let Some(hit) = self.cache_mut().lookup(time, time0, distr0) {
            return Ok(hit);
        }
        let step = elapsed_step(time, time0, self.time_unit())?;
        let distr = self.transition_distr(step, distr0)?;
        self.cache_mut()
            .store(time, time0, distr0.clone(), distr.clone());
        Ok(distr)
    }
}

/// A Markov process with exact state propagation.
///
/// The provided implementation derives `propagate` from `propagate_distr`
/// and is only valid when the noise dimension equals the process dimension;
/// variants where they differ must override it with a closed form of their
/// own or the call fails with `UnsupportedOperation`.
pub trait SolvedItoMarkovProcess: MarkovProcess {
    /// Propagate a realised state from `(time0, value0)` to `time` using
    /// the caller-supplied unit `variate` (length `noise_dim`).
    ///
    /// Default: propagate a Dirac delta at `value0` to obtain the exact
    /// transition Gaussian, then draw `mean + cholesky(cov) * variate`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperation` when `noise_dim != process_dim`
    /// - `NumericalFailure` when the transition covariance is not positive
    ///   definite
    fn propagate(
        &mut self,
        time: TimeCoord,
        variate: &DVector<f64>,
        time0: TimeCoord,
        value0: &DVector<f64>,
    ) -> Result<DVector<f64>, ProcessError> {
        if self.noise_dim() != self.process_dim() {
            return Err(ProcessError::unsupported(format!(
                "cannot derive propagate from propagate_distr when noise_dim ({}) != \
                 process_dim ({}); provide a closed-form propagate",
                self.noise_dim(),
                self.process_dim()
            )));
        }
        check_len("value0", value0, self.process_dim())?;
        check_len("variate", variate, self.noise_dim())?;
        if time == time0 {
            return Ok(value0.clone());
        }
        let distr =
            self.propagate_distr(time, time0, &NormalDistr::dirac_delta(value0.clone()))?;
        let l = cholesky_lower(distr.cov())?;
        Ok(distr.mean() + l * variate)
    }
}
