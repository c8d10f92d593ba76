//! Predecessor-chain reconstruction.
//!
//! A [`super::SlotRecord::Link`] stores a parent slot, the character
//! appended to reach this k-mer, and the two orientation bits needed to
//! relate the parent's stable canonical value to this slot's own: whether
//! the predecessor *occurrence* was forward-canonical, and whether this
//! occurrence is. Both bits matter independently — two different
//! occurrences of the very same canonical k-mer can disagree on which
//! orientation was "forward", so neither can be derived from the other.
//!
//! Reconstructing the full k-mer means walking link -> link up to the
//! chain's [`super::SlotRecord::Root`] (whose stored value is already the
//! final canonical form), then replaying each hop root-to-leaf: undo the
//! parent's own orientation to recover its true forward content, append the
//! hop's character, then apply this hop's own orientation to land back on a
//! canonical value.

use crate::alphabet;
use crate::error::KmercError;
use crate::table::SlotRecord;

struct Hop {
    appended_char: u8,
    predecessor_was_forward_canonical: bool,
    this_is_forward_canonical: bool,
}

/// Rebuilds the packed `char_count`-character k-mer stored at `slot`.
///
/// `get_record` fetches the record for a given slot index; it is a closure
/// rather than a direct table reference so both the flag-lock and
/// variable-lock table implementations can supply their own
/// read-locking/cloning strategy around the lookup. It reports
/// [`KmercError::InvariantViolation`] if a slot it visits turns out not to
/// carry a record at all, which this walk then propagates.
pub fn reconstruct<F>(get_record: F, slot: usize, char_count: usize) -> Result<Vec<u64>, KmercError>
where
    F: Fn(usize) -> Result<SlotRecord, KmercError>,
{
    reconstruct_from(get_record(slot)?, get_record, char_count)
}

/// Like [`reconstruct`], but starting from an already-known record for the
/// leaf slot instead of fetching it through `get_record`. Lets a caller that
/// already holds the leaf slot's lock (and so cannot safely re-enter its own
/// locking path) supply that record directly while still using `get_record`
/// to walk any further-up parent slots.
pub fn reconstruct_from<F>(
    leaf: SlotRecord,
    get_record: F,
    char_count: usize,
) -> Result<Vec<u64>, KmercError>
where
    F: Fn(usize) -> Result<SlotRecord, KmercError>,
{
    // Walk up to the root, remembering each hop's orientation bits so they
    // can be replayed in root-to-leaf order afterwards. The root's stored
    // value is already a valid canonical k-mer (whatever occurrence first
    // created this chain); every subsequent hop must be unwound from and
    // re-wound into canonical form using its own pair of orientation bits,
    // not the XOR of the two — see the module docs above for why a single
    // "did orientation flip" bit is not enough to do this correctly.
    let mut hops: Vec<Hop> = Vec::new();
    let mut record = leaf;
    let mut blocks = loop {
        match record {
            SlotRecord::Root(blocks) => break blocks,
            SlotRecord::Link {
                parent,
                appended_char,
                predecessor_was_forward_canonical,
                this_is_forward_canonical,
            } => {
                hops.push(Hop {
                    appended_char,
                    predecessor_was_forward_canonical,
                    this_is_forward_canonical,
                });
                record = get_record(parent)?;
            }
        }
    };

    for hop in hops.into_iter().rev() {
        let mut forward = if hop.predecessor_was_forward_canonical {
            blocks
        } else {
            alphabet::reverse_complement(&blocks, char_count)
        };
        alphabet::shift_left_insert(&mut forward, hop.appended_char);
        blocks = if hop.this_is_forward_canonical {
            forward
        } else {
            alphabet::reverse_complement(&forward, char_count)
        };
    }

    Ok(blocks)
}
