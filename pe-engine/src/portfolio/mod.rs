//! Portfolio management module
//!
//! A single live option position and the state machine that exits it.

pub mod exit;
pub mod position;

pub use exit::*;
pub use position::*;
