//! Core types and utilities

pub mod error;
pub mod units;

pub use error::{FlowlineError, Result};
pub use units::*;
