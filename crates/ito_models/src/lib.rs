//! # Ito Models (L2: Process Layer)
//!
//! Continuous-time stochastic ("Ito") processes with exact, closed-form
//! state and distribution propagation.
//!
//! This crate provides:
//! - The process trait hierarchy (drift, diffusion, propagate,
//!   propagate_distr)
//! - The Markov distribution-propagation engine with its single-slot
//!   transition cache
//! - Closed-form Wiener (Brownian motion with drift) and
//!   Ornstein-Uhlenbeck (mean-reverting) processes
//! - A static-dispatch enum over all process variants
//!
//! ## Design Principles
//!
//! - **Enum-based dispatch** over process variants, not `Box<dyn Trait>`
//! - **Exact transition laws**, never Euler discretisations: propagation is
//!   correct for arbitrary step sizes
//! - **Caller-supplied variates** so simulation stays reproducible under
//!   externally controlled random streams
//! - **Fail fast**: constructors validate shapes; steady-state propagation
//!   only surfaces numerical errors

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod processes;

#[cfg(test)]
mod tests {
    #[test]
    fn it_works() {
        assert_eq!(2 + 2, 4);
    }
}
