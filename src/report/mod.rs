//! Operator-facing output: record preview and import summary.

pub mod format;

pub use format::*;
