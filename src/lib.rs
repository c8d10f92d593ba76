//! `kmerc`: a parallel canonical k-mer counter for DNA sequence files.
//!
//! Given a large text input whose lines contain strings over the alphabet
//! `{A,C,G,T}`, a k-mer length `k`, and a minimum abundance threshold `τ`,
//! `kmerc` emits every k-mer whose canonical count across the input is
//! `>= τ`, together with its count. Canonicalization is per k-mer: for a
//! window `w` and its reverse complement `w'`, the lexicographically
//! smaller of the two is what gets counted.
//!
//! # Module map
//!
//! - [`alphabet`] — 2-bit DNA codec (encode/decode/complement).
//! - [`kmer`] — the sliding-window k-mer factory (forward + reverse
//!   packed representation, canonicality).
//! - [`rolling_hash`] — the dual Rabin–Karp rolling hasher.
//! - [`mathutil`] — `next_prime`, gcd, modular inverse.
//! - [`queue`] — the bounded blocking FIFO used by the chunked pipeline.
//! - [`io`] — the chunked file reader and POSIX file-advise helpers.
//! - [`table`] — the concurrent canonical k-mer hash table (two locking
//!   variants behind one trait).
//! - [`orchestrator`] — wires the I/O thread, worker pool, and table
//!   together and drives a run end to end.
//! - [`cli`] — the `clap`-derived argument surface for the `kmerc` binary.
//! - [`config`] — compile-time bounds and defaults.
//! - [`error`] — the library-level error type ([`error::KmercError`]).

pub mod alphabet;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod kmer;
pub mod mathutil;
pub mod orchestrator;
pub mod queue;
pub mod rolling_hash;
pub mod table;
pub mod util;

pub use error::{KmercError, Result};
pub use orchestrator::{InputFormat, RunConfig};
