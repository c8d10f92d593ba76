//! C7b: multi-state atomic status word per slot.
//!
//! Where [`super::flag::FlagLockTable`] serializes every access to a slot
//! behind one spinlock, this variant distinguishes readers from writers so
//! that multiple threads walking predecessor chains through an occupied
//! slot (to compare hashes or resolve a parent during reconstruction) don't
//! block each other; only the one-time FREE -> OCCUPIED transition that
//! installs a slot's record needs exclusivity. Selected over the flag-lock
//! variant by the `atomic-variable-table` Cargo feature.

use std::cell::UnsafeCell;
use std::io::Write;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::alphabet;
use crate::error::KmercError;
use crate::table::{link, KmerTable, PredecessorRef, ProbeSequence, SlotRecord};

const FREE: u32 = 0;
const WRITE_LOCKED: u32 = 1;
const OCCUPIED: u32 = 2;
const READ_LOCKED_BASE: u32 = 3;

struct Slot {
    status: AtomicU32,
    count: AtomicU64,
    hash: UnsafeCell<u64>,
    char_count: UnsafeCell<usize>,
    record: UnsafeCell<Option<SlotRecord>>,
}

impl Slot {
    fn new() -> Self {
        Slot {
            status: AtomicU32::new(FREE),
            count: AtomicU64::new(0),
            hash: UnsafeCell::new(0),
            char_count: UnsafeCell::new(0),
            record: UnsafeCell::new(None),
        }
    }

    /// Spins until this slot is readable (`OCCUPIED` or already
    /// `READ_LOCKED_n`), then registers as one more reader. Returns once
    /// registered; callers must pair with [`Slot::exit_read`].
    fn enter_read(&self) {
        loop {
            let s = self.status.load(Ordering::Acquire);
            if s == FREE || s == WRITE_LOCKED {
                std::hint::spin_loop();
                continue;
            }
            if self
                .status
                .compare_exchange_weak(s, s + 1, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return;
            }
        }
    }

    fn exit_read(&self) {
        self.status.fetch_sub(1, Ordering::Release);
    }

    /// Attempts to claim a `FREE` slot for installation. On success the
    /// caller holds exclusive write access until it calls
    /// [`Slot::finish_claim`].
    fn try_claim_free(&self) -> bool {
        self.status
            .compare_exchange(FREE, WRITE_LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    fn finish_claim(&self) {
        self.status.store(OCCUPIED, Ordering::Release);
    }
}

unsafe impl Sync for Slot {}

/// Quadratic-probed table using [`Slot`]'s reader/writer status word.
pub struct VariableLockTable {
    slots: Vec<Slot>,
}

impl VariableLockTable {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Slot::new);
        VariableLockTable { slots }
    }

    fn record_at(&self, slot: usize) -> Result<SlotRecord, KmercError> {
        let s = &self.slots[slot];
        // `enter_read` spins as long as the slot is FREE, which would hang
        // forever on a predecessor link into a slot that was never
        // installed; a correctly-built chain only ever references slots
        // that were occupied before they became a predecessor, so seeing
        // FREE here is itself the contradiction, not a race to wait out.
        if s.status.load(Ordering::Acquire) == FREE {
            return Err(KmercError::InvariantViolation(format!(
                "slot {slot} is free but was referenced as a predecessor-chain parent"
            )));
        }
        s.enter_read();
        let rec = unsafe { (*s.record.get()).clone() };
        s.exit_read();
        rec.ok_or_else(|| {
            KmercError::InvariantViolation(format!(
                "slot {slot} is occupied but carries no record during predecessor-chain reconstruction"
            ))
        })
    }
}

impl KmerTable for VariableLockTable {
    fn process_kmer(
        &self,
        canonical_blocks: &[u64],
        char_count: usize,
        hash: u64,
        forward_is_canonical: bool,
        predecessor: Option<PredecessorRef>,
    ) -> Result<usize, KmercError> {
        let n = self.slots.len();
        'probe: for idx in ProbeSequence::new(hash, n).take(n) {
            let slot = &self.slots[idx];
            loop {
                let status = slot.status.load(Ordering::Acquire);
                if status == FREE {
                    if slot.try_claim_free() {
                        let record = match predecessor {
                            Some(p) => SlotRecord::Link {
                                parent: p.slot,
                                appended_char: p.appended_char,
                                predecessor_was_forward_canonical: p.predecessor_was_forward_canonical,
                                this_is_forward_canonical: forward_is_canonical,
                            },
                            None => SlotRecord::Root(canonical_blocks.to_vec()),
                        };
                        unsafe {
                            *slot.hash.get() = hash;
                            *slot.char_count.get() = char_count;
                            *slot.record.get() = Some(record);
                        }
                        slot.count.store(1, Ordering::Relaxed);
                        slot.finish_claim();
                        return Ok(idx);
                    }
                    continue;
                }

                if status == WRITE_LOCKED {
                    std::hint::spin_loop();
                    continue;
                }

                // OCCUPIED or READ_LOCKED_n: register as a reader to
                // compare hashes/content safely, then release immediately.
                if slot
                    .status
                    .compare_exchange_weak(status, status + 1, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
                {
                    let existing_hash = unsafe { *slot.hash.get() };
                    let leaf_record = if existing_hash == hash {
                        let rec = unsafe { (*slot.record.get()).clone() };
                        slot.exit_read();
                        Some(rec.ok_or_else(|| {
                            KmercError::InvariantViolation(format!(
                                "slot {idx} is occupied but carries no record"
                            ))
                        })?)
                    } else {
                        slot.exit_read();
                        None
                    };
                    if let Some(leaf_record) = leaf_record {
                        // A matching hash is necessary but not sufficient:
                        // distinct k-mers can collide on the probe key, so
                        // confirm identity against the reconstructed k-mer
                        // before merging counts.
                        let existing_blocks =
                            link::reconstruct_from(leaf_record, |s| self.record_at(s), char_count)?;
                        if existing_blocks == canonical_blocks {
                            slot.count.fetch_add(1, Ordering::Relaxed);
                            return Ok(idx);
                        }
                    }
                    continue 'probe;
                }
            }
        }

        Err(KmercError::TableFull {
            hash,
            table_size: n,
        })
    }

    fn write_out(&self, threshold: u64, writer: &mut dyn Write) -> Result<(), KmercError> {
        for (idx, slot) in self.slots.iter().enumerate() {
            if slot.status.load(Ordering::Relaxed) == FREE {
                continue;
            }
            let count = slot.count.load(Ordering::Relaxed);
            if count < threshold {
                continue;
            }
            let char_count = unsafe { *slot.char_count.get() };
            let blocks = link::reconstruct(|s| self.record_at(s), idx, char_count)?;
            let kmer = alphabet::blocks_to_string(&blocks, char_count);
            writeln!(writer, "{} {}", kmer, count)?;
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mathutil::next_prime;

    #[test]
    fn first_insert_is_a_root_and_counts_one() {
        let table = VariableLockTable::new(next_prime(16));
        let blocks = vec![0b0001_1011u64];
        table.process_kmer(&blocks, 4, 42, true, None).unwrap();
        let mut out = Vec::new();
        table.write_out(1, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with(" 1\n"));
    }

    #[test]
    fn repeated_hash_increments_existing_slot() {
        let table = VariableLockTable::new(next_prime(16));
        let blocks = vec![0b0001_1011u64];
        let s1 = table.process_kmer(&blocks, 4, 7, true, None).unwrap();
        let s2 = table.process_kmer(&blocks, 4, 7, true, None).unwrap();
        assert_eq!(s1, s2);
        let mut out = Vec::new();
        table.write_out(1, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().trim_end().ends_with(" 2"));
    }

    #[test]
    fn table_full_error_when_probe_sequence_exhausted() {
        let table = VariableLockTable::new(3);
        for h in 0..3u64 {
            table.process_kmer(&vec![h], 2, h, true, None).unwrap();
        }
        let err = table
            .process_kmer(&vec![99u64], 2, 0, true, None)
            .unwrap_err();
        assert!(matches!(err, KmercError::TableFull { .. }));
    }

    #[test]
    fn concurrent_inserts_from_multiple_threads_all_land() {
        use std::sync::Arc;
        let table = Arc::new(VariableLockTable::new(next_prime(4096)));
        let mut handles = Vec::new();
        for t in 0..8u64 {
            let table = Arc::clone(&table);
            handles.push(std::thread::spawn(move || {
                for i in 0..200u64 {
                    let hash = t * 1000 + i;
                    table.process_kmer(&vec![hash], 8, hash, true, None).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        let mut out = Vec::new();
        table.write_out(1, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1600);
    }

    #[test]
    fn invariant_violation_when_linked_parent_slot_is_empty() {
        let table = VariableLockTable::new(next_prime(16));
        let leaf_idx = table.process_kmer(&vec![1u64], 4, 50, true, None).unwrap();
        let parent_idx = (leaf_idx + 1) % table.capacity();
        unsafe {
            *table.slots[leaf_idx].record.get() = Some(SlotRecord::Link {
                parent: parent_idx,
                appended_char: 1,
                predecessor_was_forward_canonical: true,
                this_is_forward_canonical: true,
            });
        }
        let mut out = Vec::new();
        let err = table.write_out(1, &mut out).unwrap_err();
        assert!(matches!(err, KmercError::InvariantViolation(_)));
    }

    #[test]
    fn linked_child_reconstructs_through_parent() {
        let table = VariableLockTable::new(next_prime(32));
        let root = vec![0b00_01_10_11u64];
        let parent_slot = table.process_kmer(&root, 4, 5, true, None).unwrap();
        let child_slot = table
            .process_kmer(
                &root,
                4,
                99,
                true,
                Some(PredecessorRef {
                    slot: parent_slot,
                    appended_char: 2,
                    predecessor_was_forward_canonical: true,
                }),
            )
            .unwrap();
        assert_ne!(parent_slot, child_slot);
        let mut out = Vec::new();
        table.write_out(1, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }
}
