//! Flowline grid geometry

pub mod flowline;

// Re-export main types
pub use flowline::*;
