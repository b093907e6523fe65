//! Strategy module
//!
//! Signal detection, signal verdicts and strike selection.

pub mod detector;
pub mod signal;
pub mod strike;

pub use detector::*;
pub use signal::*;
pub use strike::*;
