//! Core types: error taxonomy and time coordinates.

pub mod error;
pub mod time;

pub use error::ProcessError;
pub use time::TimeCoord;
