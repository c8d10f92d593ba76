//! C7a: one-bit spinlock per slot.
//!
//! Each slot is guarded by an `AtomicBool`; a thread spins
//! (`compare_exchange` + `Ordering::Acquire`) until it wins the lock, reads
//! or writes the slot, then releases with `Ordering::Release`. Simple and
//! fast under the typical case of low contention per slot, at the cost of
//! blocking any other thread that happens to land on the same slot while
//! it's held, even for an unrelated k-mer (false sharing is bounded only by
//! quadratic-probe spread).

use std::cell::UnsafeCell;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::alphabet;
use crate::error::KmercError;
use crate::table::{link, KmerTable, PredecessorRef, ProbeSequence, SlotRecord};

struct Slot {
    locked: AtomicBool,
    occupied: AtomicBool,
    count: AtomicU64,
    hash: UnsafeCell<u64>,
    char_count: UnsafeCell<usize>,
    record: UnsafeCell<Option<SlotRecord>>,
}

impl Slot {
    fn new() -> Self {
        Slot {
            locked: AtomicBool::new(false),
            occupied: AtomicBool::new(false),
            count: AtomicU64::new(0),
            hash: UnsafeCell::new(0),
            char_count: UnsafeCell::new(0),
            record: UnsafeCell::new(None),
        }
    }

    fn lock(&self) {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            std::hint::spin_loop();
        }
    }

    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

// `UnsafeCell` fields are only ever touched while `locked` is held (or after
// all workers have joined, for `write_out`), so sharing `Slot` across
// threads is sound even though `UnsafeCell` itself is not `Sync`.
unsafe impl Sync for Slot {}

/// Quadratic-probed table using [`Slot`]'s per-slot spinlock.
pub struct FlagLockTable {
    slots: Vec<Slot>,
}

impl FlagLockTable {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Slot::new);
        FlagLockTable { slots }
    }

    fn record_at(&self, slot: usize) -> Result<SlotRecord, KmercError> {
        let s = &self.slots[slot];
        s.lock();
        let rec = unsafe { (*s.record.get()).clone() };
        s.unlock();
        rec.ok_or_else(|| {
            KmercError::InvariantViolation(format!(
                "slot {slot} is occupied but carries no record during predecessor-chain reconstruction"
            ))
        })
    }
}

impl KmerTable for FlagLockTable {
    fn process_kmer(
        &self,
        canonical_blocks: &[u64],
        char_count: usize,
        hash: u64,
        forward_is_canonical: bool,
        predecessor: Option<PredecessorRef>,
    ) -> Result<usize, KmercError> {
        let n = self.slots.len();
        for idx in ProbeSequence::new(hash, n).take(n) {
            let slot = &self.slots[idx];
            slot.lock();

            if !slot.occupied.load(Ordering::Relaxed) {
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
                slot.occupied.store(true, Ordering::Release);
                slot.unlock();
                return Ok(idx);
            }

            let existing_hash = unsafe { *slot.hash.get() };
            if existing_hash == hash {
                // A matching hash is necessary but not sufficient: distinct
                // k-mers can collide on the probe key, so confirm identity
                // against the reconstructed k-mer before merging counts.
                let leaf_record = match unsafe { (*slot.record.get()).clone() } {
                    Some(r) => r,
                    None => {
                        slot.unlock();
                        return Err(KmercError::InvariantViolation(format!(
                            "slot {idx} is occupied but carries no record"
                        )));
                    }
                };
                let existing_blocks =
                    match link::reconstruct_from(leaf_record, |s| self.record_at(s), char_count) {
                        Ok(blocks) => blocks,
                        Err(e) => {
                            slot.unlock();
                            return Err(e);
                        }
                    };
                if existing_blocks == canonical_blocks {
                    slot.count.fetch_add(1, Ordering::Relaxed);
                    slot.unlock();
                    return Ok(idx);
                }
            }

            slot.unlock();
        }

        Err(KmercError::TableFull {
            hash,
            table_size: n,
        })
    }

    fn write_out(&self, threshold: u64, writer: &mut dyn Write) -> Result<(), KmercError> {
        for (idx, slot) in self.slots.iter().enumerate() {
            if !slot.occupied.load(Ordering::Relaxed) {
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
        let table = FlagLockTable::new(next_prime(16));
        let blocks = vec![0b0001_1011u64];
        let slot = table
            .process_kmer(&blocks, 4, 42, true, None)
            .expect("table has room");
        let mut out = Vec::new();
        table.write_out(1, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(" 1"));
        let _ = slot;
    }

    #[test]
    fn repeated_hash_increments_existing_slot() {
        let table = FlagLockTable::new(next_prime(16));
        let blocks = vec![0b0001_1011u64];
        let s1 = table.process_kmer(&blocks, 4, 7, true, None).unwrap();
        let s2 = table.process_kmer(&blocks, 4, 7, true, None).unwrap();
        assert_eq!(s1, s2);
        let mut out = Vec::new();
        table.write_out(1, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.trim_end().ends_with(" 2"));
    }

    #[test]
    fn distinct_hashes_land_on_distinct_slots() {
        let table = FlagLockTable::new(next_prime(64));
        let a = vec![0u64];
        let b = vec![1u64];
        let s1 = table.process_kmer(&a, 4, 11, true, None).unwrap();
        let s2 = table.process_kmer(&b, 4, 23, true, None).unwrap();
        assert_ne!(s1, s2);
    }

    #[test]
    fn write_out_respects_threshold() {
        let table = FlagLockTable::new(next_prime(16));
        let blocks = vec![5u64];
        table.process_kmer(&blocks, 3, 1, true, None).unwrap();
        let mut out = Vec::new();
        table.write_out(2, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn table_full_error_when_probe_sequence_exhausted() {
        let table = FlagLockTable::new(3);
        for h in 0..3u64 {
            table.process_kmer(&vec![h], 2, h, true, None).unwrap();
        }
        let err = table
            .process_kmer(&vec![99u64], 2, 0, true, None)
            .unwrap_err();
        assert!(matches!(err, KmercError::TableFull { .. }));
    }

    #[test]
    fn invariant_violation_when_linked_parent_slot_is_empty() {
        let table = FlagLockTable::new(next_prime(16));
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
        let table = FlagLockTable::new(next_prime(32));
        let root = vec![0b00_01_10_11u64]; // 4 chars packed
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
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
