//! Stochastic process variants and their propagation engines.
//!
//! The hierarchy is capability-based:
//! - [`ito::ItoProcess`]: drift and diffusion
//! - [`markov::MarkovProcess`]: exact distribution propagation through a
//!   single-slot transition cache
//! - [`markov::SolvedItoMarkovProcess`]: exact state propagation, derived
//!   generically from distribution propagation when the noise dimension
//!   equals the process dimension
//!
//! Concrete variants: [`ito::GenericItoProcess`] (drift/diffusion only),
//! [`wiener::WienerProcess`], [`ornstein_uhlenbeck::OrnsteinUhlenbeckProcess`],
//! unified by the static-dispatch [`process_enum::Process`].

pub mod ito;
pub mod markov;
pub mod ornstein_uhlenbeck;
pub mod process_enum;
pub mod wiener;

pub use ito::{GenericItoProcess, ItoProcess};
pub use markov::{MarkovProcess, SolvedItoMarkovProcess, TransitionCache};
pub use ornstein_uhlenbeck::OrnsteinUhlenbeckProcess;
pub use process_enum::Process;
pub use wiener::WienerProcess;
