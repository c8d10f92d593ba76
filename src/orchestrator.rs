//! Wires the I/O thread, worker pool, and hash table together.
//!
//! Mirrors the producer/consumer shape of the teacher's `compress_mt.rs`
//! (one I/O-bound producer, N CPU-bound consumers, two bounded queues) but
//! the consumers here update a shared hash table instead of writing
//! compressed frames, and chunk handoff carries a k-1 byte overlap instead
//! of a dictionary window.

use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::alphabet;
use crate::displaylevel;
use crate::error::KmercError;
use crate::io::chunk_reader::ChunkReader;
use crate::io::file_io;
use crate::kmer::KmerFactory;
use crate::mathutil::next_prime;
use crate::queue::BoundedQueue;
use crate::rolling_hash::RollingHasherDual;
use crate::table::{KmerTable, PredecessorRef};

#[cfg(feature = "atomic-variable-table")]
use crate::table::variable::VariableLockTable as ActiveTable;
#[cfg(not(feature = "atomic-variable-table"))]
use crate::table::flag::FlagLockTable as ActiveTable;

/// The dialect of the input file. Only [`InputFormat::Plain`] is
/// implemented; the others exist so callers get a named, reportable error
/// instead of silent mistreatment as plain text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Plain,
    Fasta,
    Fastq,
}

/// Fully resolved run parameters, already validated by the CLI layer (or by
/// [`RunConfig::validate`] for callers that build one directly, e.g. tests).
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub k: usize,
    pub chunk_size: usize,
    pub active_chunks: usize,
    pub n_threads: usize,
    pub min_slots: usize,
    pub min_abundance: u64,
    pub format: InputFormat,
    pub gzip: bool,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), KmercError> {
        if self.k == 0 || self.k > crate::config::K_MAX {
            return Err(KmercError::InvalidArgument(format!(
                "k must be between 1 and {}, got {}",
                crate::config::K_MAX,
                self.k
            )));
        }
        if self.min_slots == 0 {
            return Err(KmercError::InvalidArgument(
                "min_slots must be at least 1".to_owned(),
            ));
        }
        if self.n_threads == 0 {
            return Err(KmercError::InvalidArgument(
                "n_threads must be at least 1".to_owned(),
            ));
        }
        if self.active_chunks == 0 {
            return Err(KmercError::InvalidArgument(
                "active_chunks must be at least 1".to_owned(),
            ));
        }
        if self.chunk_size < self.k {
            return Err(KmercError::InvalidArgument(format!(
                "chunk_size ({}) must be at least k ({})",
                self.chunk_size, self.k
            )));
        }
        Ok(())
    }
}

struct ChunkBuffer {
    data: Vec<u8>,
    len: usize,
}

/// Runs the full pipeline against `cfg`, selecting the hash table variant
/// compiled in via the `atomic-variable-table` feature.
pub fn run(cfg: RunConfig) -> Result<(), KmercError> {
    cfg.validate()?;

    if cfg.format != InputFormat::Plain {
        return Err(KmercError::UnsupportedFormat(format!(
            "{:?} input is not implemented; only plain one-sequence-per-line text is supported",
            cfg.format
        )));
    }

    let n_slots = next_prime(cfg.min_slots);
    displaylevel!(
        2,
        "kmerc: k={} slots={} threads={} chunk_size={}\n",
        cfg.k,
        n_slots,
        cfg.n_threads,
        cfg.chunk_size
    );
    let table = Arc::new(ActiveTable::new(n_slots));
    run_with_table(&cfg, table)
}

/// The generic engine, split out from [`run`] so tests can exercise either
/// table variant against the same orchestration logic.
pub fn run_with_table<T: KmerTable + 'static>(
    cfg: &RunConfig,
    table: Arc<T>,
) -> Result<(), KmercError> {
    let source = file_io::open_input(&cfg.input_file, cfg.gzip)?;
    let overlap = cfg.k.saturating_sub(1);
    let reader = ChunkReader::new(source, overlap);

    let buffers: Arc<Vec<Mutex<ChunkBuffer>>> = Arc::new(
        (0..cfg.active_chunks)
            .map(|_| {
                Mutex::new(ChunkBuffer {
                    data: vec![0u8; cfg.chunk_size],
                    len: 0,
                })
            })
            .collect(),
    );

    let in_queue = Arc::new(BoundedQueue::new(cfg.active_chunks));
    let out_queue = Arc::new(BoundedQueue::new(cfg.active_chunks));

    let io_handle = {
        let buffers = Arc::clone(&buffers);
        let in_queue = Arc::clone(&in_queue);
        let out_queue = Arc::clone(&out_queue);
        let active_chunks = cfg.active_chunks;
        thread::spawn(move || io_thread_main(reader, buffers, in_queue, out_queue, active_chunks))
    };

    let mut worker_handles = Vec::with_capacity(cfg.n_threads);
    for _ in 0..cfg.n_threads {
        let buffers = Arc::clone(&buffers);
        let in_queue = Arc::clone(&in_queue);
        let out_queue = Arc::clone(&out_queue);
        let table = Arc::clone(&table);
        let k = cfg.k;
        worker_handles.push(thread::spawn(move || {
            worker_main(k, buffers, in_queue, out_queue, table)
        }));
    }

    let io_result = io_handle.join().expect("I/O thread panicked");
    for h in worker_handles {
        h.join().expect("worker thread panicked")?;
    }
    io_result?;

    displaylevel!(3, "kmerc: table capacity {}\n", table.capacity());

    if cfg.min_abundance > 0 {
        let mut out = File::create(&cfg.output_file)?;
        table.write_out(cfg.min_abundance, &mut out)?;
    }

    let input = File::open(&cfg.input_file)?;
    file_io::advise_dont_need(&input);

    Ok(())
}

fn io_thread_main(
    mut reader: ChunkReader,
    buffers: Arc<Vec<Mutex<ChunkBuffer>>>,
    in_queue: Arc<BoundedQueue>,
    out_queue: Arc<BoundedQueue>,
    active_chunks: usize,
) -> Result<(), KmercError> {
    let mut outstanding = 0usize;

    for idx in 0..active_chunks {
        let mut buf = buffers[idx].lock().expect("chunk buffer mutex poisoned");
        buf.len = reader.fill(&mut buf.data)?;
        let got = buf.len;
        drop(buf);
        if got == 0 {
            continue;
        }
        outstanding += 1;
        in_queue.push(idx);
    }

    while outstanding > 0 {
        let idx = match out_queue.pop() {
            Some(idx) => idx,
            None => break,
        };
        let mut buf = buffers[idx].lock().expect("chunk buffer mutex poisoned");
        buf.len = reader.fill(&mut buf.data)?;
        let got = buf.len;
        drop(buf);
        if got == 0 {
            outstanding -= 1;
            continue;
        }
        in_queue.push(idx);
    }

    in_queue.mark_done();
    out_queue.mark_done();
    Ok(())
}

fn worker_main<T: KmerTable>(
    k: usize,
    buffers: Arc<Vec<Mutex<ChunkBuffer>>>,
    in_queue: Arc<BoundedQueue>,
    out_queue: Arc<BoundedQueue>,
    table: Arc<T>,
) -> Result<(), KmercError> {
    let mut factory = KmerFactory::new(k);
    let mut hasher = RollingHasherDual::new(default_modulus(), k);

    while let Some(idx) = in_queue.pop() {
        {
            let buf = buffers[idx].lock().expect("chunk buffer mutex poisoned");
            process_chunk(&buf.data[..buf.len], &mut factory, &mut hasher, table.as_ref())?;
        }
        out_queue.push(idx);
    }

    Ok(())
}

/// A large prime comfortably wider than any practical table size, used as
/// the rolling hasher's internal modulus (distinct from the table's slot
/// count `N`, which the hash is reduced into only at probe time).
fn default_modulus() -> u64 {
    (1u64 << 61) - 1
}

fn process_chunk<T: KmerTable>(
    bytes: &[u8],
    factory: &mut KmerFactory,
    hasher: &mut RollingHasherDual,
    table: &T,
) -> Result<(), KmercError> {
    factory.reset();
    hasher.reset();
    let mut predecessor_slot: Option<usize> = None;

    for &byte in bytes {
        let code = alphabet::encode(byte);
        if code >= alphabet::BREAK {
            factory.reset();
            hasher.reset();
            predecessor_slot = None;
            continue;
        }

        let previous_forward_was_canonical = factory.forward_is_canonical();
        factory.push_character(code);

        // `previous_kmer_exists` is only meaningful *after* this push: it is
        // set from the characters-stored count as it was just before the
        // push that just happened, i.e. whether the window was already full
        // going into this character. Reading it beforehand would see the
        // value left over from the previous character's push instead.
        if factory.previous_kmer_exists() {
            hasher.update_rolling_hash_in_and_out(code, factory.pushed_off_character_forward());
        } else {
            hasher.update_rolling_hash_in(code);
        }

        if !factory.is_full() {
            continue;
        }

        let canonical = factory.forward_is_canonical();
        let hash = if canonical {
            hasher.hash_forward()
        } else {
            hasher.hash_backward()
        };

        let predecessor = match (predecessor_slot, factory.previous_kmer_exists()) {
            (Some(slot), true) => Some(PredecessorRef {
                slot,
                appended_char: code,
                predecessor_was_forward_canonical: previous_forward_was_canonical,
            }),
            _ => None,
        };

        let slot = table.process_kmer(
            factory.canonical_blocks(),
            factory.characters_stored(),
            hash,
            canonical,
            predecessor,
        )?;
        predecessor_slot = Some(slot);
    }

    Ok(())
}
