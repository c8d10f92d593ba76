//! Cross-cutting utility functions used by the CLI and I/O layers.
//!
//! Submodules:
//! - [`cores`]       — CPU core counting via `num_cpus`
//! - [`file_status`] — file-type queries (`is_reg_file`, `is_directory`)
//!
//! The most commonly needed symbols are re-exported at the `util` module level.

pub mod cores;
pub mod file_status;

pub use cores::count_cores;
pub use file_status::{is_directory, is_reg_file};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_cores_at_least_one() {
        assert!(count_cores() >= 1);
    }
}
