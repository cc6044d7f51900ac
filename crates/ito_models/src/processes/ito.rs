//! Ito process capability: drift and diffusion.
//!
//! An Ito process is described by the stochastic differential equation
//! ```text
//! dX(t) = drift(t, X(t)) * dt + diffusion(t, X(t)) * dW(t)
//! ```
//! where:
//! - X(t) = process state, a column vector of length `process_dim`
//! - drift = deterministic rate of change, `process_dim` vector
//! - diffusion = noise loading, `process_dim x noise_dim` matrix
//! - dW(t) = `noise_dim`-dimensional Brownian increment
//!
//! The generic variant carries the drift and diffusion as closures and has
//! no exact solution of its own; the closed-form variants override the
//! closures implicitly through their parameters.

use std::fmt;

use nalgebra::{DMatrix, DVector};

use ito_core::types::error::ProcessError;

/// Drift function: `(time, state) -> vector[process_dim]`.
pub type DriftFn = Box<dyn Fn(f64, &DVector<f64>) -> DVector<f64>>;

/// Diffusion function: `(time, state) -> matrix[process_dim x noise_dim]`.
pub type DiffusionFn = Box<dyn Fn(f64, &DVector<f64>) -> DMatrix<f64>>;

/// Capability surface shared by every process variant.
pub trait ItoProcess {
    /// Dimension of the process state.
    fn process_dim(&self) -> usize;

    /// Dimension of the driving Brownian noise.
    fn noise_dim(&self) -> usize;

    /// Drift at `(time, state)`.
    fn drift(&self, time: f64, state: &DVector<f64>) -> DVector<f64>;

    /// Diffusion at `(time, state)`.
    fn diffusion(&self, time: f64, state: &DVector<f64>) -> DMatrix<f64>;
}

/// An Ito process defined directly by its drift and diffusion closures.
///
/// Both closures are optional and default to the zero vector / zero matrix
/// of the declared shape. A generic process has no exact transition law;
/// `propagate` and `propagate_distr` on the enum wrapper answer with
/// `UnsupportedOperation`.
///
/// # Examples
///
/// ```
/// use ito_models::processes::{GenericItoProcess, ItoProcess};
/// use nalgebra::DVector;
///
/// // Zero-drift, zero-diffusion process of dimension 2.
/// let p = GenericItoProcess::new(2, None, None, None).unwrap();
/// assert_eq!(p.process_dim(), 2);
/// assert_eq!(p.noise_dim(), 2);
/// assert_eq!(p.drift(0.0, &DVector::zeros(2)), DVector::zeros(2));
/// ```
pub struct GenericItoProcess {
    process_dim: usize,
    noise_dim: usize,
    drift: DriftFn,
    diffusion: DiffusionFn,
}

impl GenericItoProcess {
    /// Create a generic Ito process.
    ///
    /// `noise_dim` defaults to `process_dim`; `drift` and `diffusion`
    /// default to zero functions of the declared shape.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if either dimension is zero.
    pub fn new(
        process_dim: usize,
        noise_dim: Option<usize>,
        drift: Option<DriftFn>,
        diffusion: Option<DiffusionFn>,
    ) -> Result<Self, ProcessError> {
        let noise_dim = noise_dim.unwrap_or(process_dim);
        if process_dim == 0 || noise_dim == 0 {
            return Err(ProcessError::config(format!(
                "dimensions must be positive, got process_dim={}, noise_dim={}",
                process_dim, noise_dim
            )));
        }
        let drift =
            drift.unwrap_or_else(|| Box::new(move |_t, _x| DVector::zeros(process_dim)));
        let diffusion = diffusion
            .unwrap_or_else(|| Box::new(move |_t, _x| DMatrix::zeros(process_dim, noise_dim)));
        Ok(Self {
            process_dim,
            noise_dim,
            drift,
            diffusion,
        })
    }
}

impl ItoProcess for GenericItoProcess {
    fn process_dim(&self) -> usize {
        self.process_dim
    }

    fn noise_dim(&self) -> usize {
        self.noise_dim
    }

    fn drift(&self, time: f64, state: &DVector<f64>) -> DVector<f64> {
        (self.drift)(time, state)
    }

    fn diffusion(&self, time: f64, state: &DVector<f64>) -> DMatrix<f64> {
        (self.diffusion)(time, state)
    }
}

impl fmt::Debug for GenericItoProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericItoProcess")
            .field("process_dim", &self.process_dim)
            .field("noise_dim", &self.noise_dim)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for GenericItoProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GenericItoProcess(process_dim={}, noise_dim={})",
            self.process_dim, self.noise_dim
        )
    }
}
