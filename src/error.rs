//! Library-level error type.
//!
//! The orchestrator and its collaborators return this `thiserror`-backed
//! enum so callers can match on error *kind* (spec §7) and derive an exit
//! code directly, rather than parse a message string the way the teacher's
//! `cli/args.rs` parse failures do with `anyhow`. `kmerc` has no
//! corresponding free-form parse-failure path — clap owns argument syntax
//! errors and every other failure already has a named variant here — so
//! `anyhow` isn't part of this crate's dependency stack.

use thiserror::Error;

/// Every distinguished error kind from the error-handling design (spec §7).
#[derive(Debug, Error)]
pub enum KmercError {
    /// Rejected at startup: `k == 0`, `min_slots == 0`, `n_threads == 0`, etc.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Open/stat/read/write failure on the input or output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// FASTA/FASTQ were requested but are declared unimplemented.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// The probe sequence for a k-mer cycled back to its own origin without
    /// finding a free or matching slot: the table is full.
    #[error("hash table full while inserting k-mer with hash {hash} (table size {table_size})")]
    TableFull { hash: u64, table_size: usize },

    /// An internal invariant was violated — predecessor-chain reconstruction
    /// produced a k-mer that didn't match the one that was inserted, a probe
    /// count went negative, or similar. Always a bug, never a user error.
    #[error("internal invariant violation: {0}")]
    InvariantViolation(String),
}

/// Process exit codes, assigned by error kind (spec §6: "0 on clean run;
/// nonzero on table-full, I/O failure, or invalid arguments").
impl KmercError {
    pub fn exit_code(&self) -> i32 {
        match self {
            KmercError::InvalidArgument(_) => 2,
            KmercError::Io(_) => 3,
            KmercError::UnsupportedFormat(_) => 4,
            KmercError::TableFull { .. } => 5,
            KmercError::InvariantViolation(_) => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, KmercError>;
