//! Configuration module

pub mod exit;
pub mod strategy;

pub use exit::*;
pub use strategy::*;
