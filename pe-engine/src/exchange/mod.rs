//! Exchange integration module
//!
//! Provides the data and order collaborator traits, order types and a paper executor.

pub mod order;
pub mod paper;
pub mod provider;

pub use order::*;
pub use paper::*;
pub use provider::*;
