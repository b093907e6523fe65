//! Technical indicators module
//!
//! Pure functions over an ordered price series. Nothing is cached between calls.

pub mod bb;
pub mod ema;

pub use bb::*;
pub use ema::*;
