//! # ito_core: Foundation Layer for Exact Stochastic Process Propagation
//!
//! ## Layer 1 (Foundation) Role
//!
//! ito_core serves as the bottom layer of the workspace, providing:
//! - The Gaussian distribution value type (`distributions::NormalDistr`)
//! - Time coordinates and elapsed-step normalisation (`types::time`)
//! - Linear-algebra utilities: Kronecker sum, vec/unvec, validation
//!   helpers (`math::linalg`)
//! - Error types: `ProcessError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other workspace crates, with minimal
//! external dependencies:
//! - nalgebra: dense vectors/matrices, Cholesky, matrix exponential
//! - chrono: timestamp and duration arithmetic
//! - thiserror: structured error enums
//! - serde: serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use ito_core::distributions::NormalDistr;
//! use nalgebra::{DMatrix, DVector};
//!
//! // A standard 2-D Gaussian
//! let distr = NormalDistr::standard(2);
//! assert_eq!(distr.dim(), 2);
//!
//! // Dirac delta as a degenerate Gaussian
//! let dirac = NormalDistr::dirac_delta(DVector::from_vec(vec![1.0, -1.0]));
//! assert_eq!(dirac.cov(), &DMatrix::zeros(2, 2));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for `NormalDistr` and `TimeCoord`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod distributions;
pub mod math;
pub mod types;
