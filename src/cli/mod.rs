//! Command-line surface: argument parsing and stderr diagnostics.

pub mod args;
pub mod constants;

pub use args::Args;
