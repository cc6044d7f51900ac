//! Mathematical utilities: dense linear algebra helpers.

pub mod linalg;
