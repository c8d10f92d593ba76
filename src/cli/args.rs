//! Command-line argument parsing for the `kmerc` binary.
//!
//! Built with `clap`'s derive API, covering every CLI parameter from
//! spec.md §6: `input_file`, `output_file`, `k`, `chunk_size`,
//! `active_chunks`, `n_threads`, `min_slots`, `min_abundance`, plus a
//! `--format` flag (B.1) and a `--gzip` switch (B.2).
//!
//! [`Args::into_run_config`] resolves defaults (`n_threads` from available
//! parallelism, matching the teacher's `io/prefs.rs::default_nb_workers`
//! pattern) and hands back an [`orchestrator::RunConfig`] ready for
//! [`crate::orchestrator::run`].

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config;
use crate::error::KmercError;
use crate::orchestrator::{InputFormat, RunConfig};

/// Input dialect, as spec.md §6/§7 and SPEC_FULL.md B.1: only `plain` is
/// implemented. `fasta`/`fastq` are accepted as values so misuse produces a
/// named, reportable error instead of a clap parse failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Plain,
    Fasta,
    Fastq,
}

impl From<FormatArg> for InputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Plain => InputFormat::Plain,
            FormatArg::Fasta => InputFormat::Fasta,
            FormatArg::Fastq => InputFormat::Fastq,
        }
    }
}

/// Parallel canonical k-mer counter for DNA sequence files.
#[derive(Parser, Debug)]
#[command(name = "kmerc", version, about, long_about = None)]
pub struct Args {
    /// Input file to scan (one DNA sequence per line).
    pub input_file: PathBuf,

    /// Destination for the canonical-k-mer/count output.
    pub output_file: PathBuf,

    /// K-mer length.
    #[arg(short = 'k', long, default_value_t = 21)]
    pub k: usize,

    /// Target chunk size in bytes handed to each worker.
    #[arg(long, default_value_t = config::DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Number of in-flight chunk buffers in the producer/consumer ring.
    #[arg(long, default_value_t = config::DEFAULT_ACTIVE_CHUNKS)]
    pub active_chunks: usize,

    /// Number of worker threads. `0` resolves to the number of logical CPUs
    /// available (mirrors the teacher's `default_nb_workers`).
    #[arg(long, short = 'j', default_value_t = 0)]
    pub n_threads: usize,

    /// Lower bound on hash-table slot count; actual capacity is the next
    /// prime at or above this value.
    #[arg(long, default_value_t = config::DEFAULT_MIN_SLOTS)]
    pub min_slots: usize,

    /// Minimum abundance threshold for write-out; `0` disables output.
    #[arg(long, short = 't', default_value_t = config::DEFAULT_MIN_ABUNDANCE)]
    pub min_abundance: u64,

    /// Input dialect. Only `plain` is implemented; `fasta`/`fastq` are
    /// reported as unimplemented rather than silently treated as plain.
    #[arg(long, value_enum, default_value_t = FormatArg::Plain)]
    pub format: FormatArg,

    /// Treat the input file as gzip-compressed. Requires the crate's
    /// `gzip` feature; rejected as an invalid argument otherwise.
    #[arg(long)]
    pub gzip: bool,

    /// Verbosity: 0 = silent, 1 = errors, 2 = normal progress (default),
    /// 3 = table statistics, 4 = per-chunk trace.
    #[arg(short = 'v', long, default_value_t = 2)]
    pub verbosity: u32,
}

impl Args {
    /// Resolves defaults and validates ranges, producing the
    /// [`RunConfig`] the orchestrator consumes. Rejects `--gzip` up front
    /// when the crate was built without the `gzip` feature, so the failure
    /// is reported at argument-parsing time rather than deep in `io::open_input`.
    pub fn into_run_config(self) -> Result<RunConfig, KmercError> {
        if !cfg!(feature = "gzip") && self.gzip {
            return Err(KmercError::InvalidArgument(
                "--gzip requires the crate to be built with the `gzip` feature".to_owned(),
            ));
        }

        let n_threads = if self.n_threads == 0 {
            crate::util::count_cores()
        } else {
            self.n_threads
        };

        Ok(RunConfig {
            input_file: self.input_file,
            output_file: self.output_file,
            k: self.k,
            chunk_size: self.chunk_size,
            active_chunks: self.active_chunks,
            n_threads,
            min_slots: self.min_slots,
            min_abundance: self.min_abundance,
            format: self.format.into(),
            gzip: self.gzip,
        })
    }
}
