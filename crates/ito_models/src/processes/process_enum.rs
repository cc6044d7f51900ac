//! Static dispatch enum for process variants.
//!
//! `Process` provides match-based dispatch over the concrete variants
//! instead of `Box<dyn Trait>`, keeping dispatch static and the variant set
//! explicit. The Generic variant has drift and diffusion but no exact
//! transition law, so `propagate` and `propagate_distr` on it answer with
//! `UnsupportedOperation`.
//!
//! ## Example
//!
//! ```
//! use ito_models::processes::{Process, WienerProcess};
//!
//! let p = Process::from(WienerProcess::default());
//! assert_eq!(p.name(), "Wiener");
//! assert_eq!(p.process_dim(), 1);
//! ```

use nalgebra::{DMatrix, DVector};

use ito_core::distributions::NormalDistr;
use ito_core::types::error::ProcessError;
use ito_core::types::time::TimeCoord;

use super::ito::{GenericItoProcess, ItoProcess};
use super::markov::{MarkovProcess, SolvedItoMarkovProcess};
use super::ornstein_uhlenbeck::OrnsteinUhlenbeckProcess;
use super::wiener::WienerProcess;

/// Tagged variant over every process kind.
#[derive(Debug)]
pub enum Process {
    /// Drift/diffusion only; no exact transition law.
    Generic(GenericItoProcess),
    /// Brownian motion with drift.
    Wiener(WienerProcess),
    /// Mean-reverting process.
    OrnsteinUhlenbeck(OrnsteinUhlenbeckProcess),
}

impl Process {
    /// Variant name for logging and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Process::Generic(_) => "GenericIto",
            Process::Wiener(_) => "Wiener",
            Process::OrnsteinUhlenbeck(_) => "OrnsteinUhlenbeck",
        }
    }

    /// Dimension of the process state.
    pub fn process_dim(&self) -> usize {
        match self {
            Process::Generic(p) => p.process_dim(),
            Process::Wiener(p) => p.process_dim(),
            Process::OrnsteinUhlenbeck(p) => p.process_dim(),
        }
    }

    /// Dimension of the driving Brownian noise.
    pub fn noise_dim(&self) -> usize {
        match self {
            Process::Generic(p) => p.noise_dim(),
            Process::Wiener(p) => p.noise_dim(),
            Process::OrnsteinUhlenbeck(p) => p.noise_dim(),
        }
    }

    /// Drift at `(time, state)`.
    pub fn drift(&self, time: f64, state: &DVector<f64>) -> DVector<f64> {
        match self {
            Process::Generic(p) => p.drift(time, state),
            Process::Wiener(p) => p.drift(time, state),
            Process::OrnsteinUhlenbeck(p) => p.drift(time, state),
        }
    }

    /// Diffusion at `(time, state)`.
    pub fn diffusion(&self, time: f64, state: &DVector<f64>) -> DMatrix<f64> {
        match self {
            Process::Generic(p) => p.diffusion(time, state),
            Process::Wiener(p) => p.diffusion(time, state),
            Process::OrnsteinUhlenbeck(p) => p.diffusion(time, state),
        }
    }

    /// Exact state propagation with a caller-supplied variate.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` for the Generic variant.
    pub fn propagate(
        &mut self,
        time: TimeCoord,
        variate: &DVector<f64>,
        time0: TimeCoord,
        value0: &DVector<f64>,
    ) -> Result<DVector<f64>, ProcessError> {
        match self {
            Process::Generic(_) => Err(ProcessError::unsupported(
                "generic Ito process has no exact propagation",
            )),
            Process::Wiener(p) => p.propagate(time, variate, time0, value0),
            Process::OrnsteinUhlenbeck(p) => p.propagate(time, variate, time0, value0),
        }
    }

    /// Exact distribution propagation.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` for the Generic variant.
    pub fn propagate_distr(
        &mut self,
        time: TimeCoord,
        time0: TimeCoord,
        distr0: &NormalDistr,
    ) -> Result<NormalDistr, ProcessError> {
        match self {
            Process::Generic(_) => Err(ProcessError::unsupported(
                "generic Ito process has no exact transition law",
            )),
            Process::Wiener(p) => p.propagate_distr(time, time0, distr0),
            Process::OrnsteinUhlenbeck(p) => p.propagate_distr(time, time0, distr0),
        }
    }
}

impl From<GenericItoProcess> for Process {
    fn from(p: GenericItoProcess) -> Self {
        Process::Generic(p)
    }
}

impl From<WienerProcess> for Process {
    fn from(p: WienerProcess) -> Self {
        Process::Wiener(p)
    }
}

impl From<OrnsteinUhlenbeckProcess> for Process {
    fn from(p: OrnsteinUhlenbeckProcess) -> Self {
        Process::OrnsteinUhlenbeck(p)
    }
}
