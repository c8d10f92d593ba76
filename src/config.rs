//! Compile-time configuration constants.
//!
//! Bounds and defaults for the runtime configuration surface exposed by
//! `cli::Args`. Kept as a standalone module, the same way the teacher
//! crate separates compile-time config from argument parsing.

/// Largest k-mer length the CLI accepts by default. The k-mer factory itself
/// is not hardcoded to this width (it grows its block array to
/// `ceil(k / CHARS_PER_BLOCK)`), but an upper bound keeps accidental
/// `--k 999999999` runs from allocating unbounded memory per factory.
pub const K_MAX: usize = 128;

/// Number of 2-bit characters packed into one 64-bit block.
pub const CHARS_PER_BLOCK: usize = 32;

/// Default chunk size in bytes for the chunked file reader (4 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Default number of in-flight chunk buffers.
pub const DEFAULT_ACTIVE_CHUNKS: usize = 8;

/// Default lower bound on hash-table slot count; the actual capacity is
/// `next_prime(min_slots)`.
pub const DEFAULT_MIN_SLOTS: usize = 1 << 20;

/// Default minimum abundance threshold for write-out.
pub const DEFAULT_MIN_ABUNDANCE: u64 = 1;
