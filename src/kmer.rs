//! Sliding-window k-mer factory.
//!
//! Maintains a 2-bit-packed forward window and its reverse complement,
//! updated one character at a time, plus the bookkeeping (`previous_*`
//! fields) that the hash table's predecessor-link compression needs to
//! decide whether consecutive k-mers in a run can be chained.

use crate::alphabet;

/// Packed forward/backward k-mer window of a fixed length `k`.
///
/// `blocks_forward`/`blocks_backward` are right-aligned, most-significant
/// word first: `blocks[0]` holds the oldest characters, `blocks[blocks.len()
/// - 1]` holds the most recently pushed one in its low-order bits. Both
/// arrays are sized `ceil(k / 32)` words (32 two-bit characters per `u64`),
/// so `k` is not limited to a single machine word.
pub struct KmerFactory {
    k: usize,
    blocks_forward: Vec<u64>,
    blocks_backward: Vec<u64>,
    characters_stored: usize,
    pushed_off_character_forward: u8,
    forward_is_canonical: bool,
    previous_forward_was_canonical: bool,
    previous_kmer_exists: bool,
}

impl KmerFactory {
    /// Creates an empty factory for k-mers of length `k` (`k >= 1`).
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "k must be at least 1");
        let n_blocks = (k + 31) / 32;
        KmerFactory {
            k,
            blocks_forward: vec![0u64; n_blocks],
            blocks_backward: vec![0u64; n_blocks],
            characters_stored: 0,
            pushed_off_character_forward: 0,
            forward_is_canonical: true,
            previous_forward_was_canonical: false,
            previous_kmer_exists: false,
        }
    }

    /// The configured window length.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of characters currently held, `0..=k`.
    #[inline]
    pub fn characters_stored(&self) -> usize {
        self.characters_stored
    }

    /// `true` once the window holds a full k-mer.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.characters_stored == self.k
    }

    /// Clears the window. Called on construction, on an alphabet break, and
    /// whenever the caller wants to start a fresh run.
    pub fn reset(&mut self) {
        for w in self.blocks_forward.iter_mut() {
            *w = 0;
        }
        for w in self.blocks_backward.iter_mut() {
            *w = 0;
        }
        self.characters_stored = 0;
        self.pushed_off_character_forward = 0;
        self.forward_is_canonical = true;
        self.previous_forward_was_canonical = false;
        self.previous_kmer_exists = false;
    }

    /// Pushes one 2-bit-encoded character. A value `>= alphabet::BREAK` is
    /// treated as a break and is equivalent to [`KmerFactory::reset`].
    pub fn push_character(&mut self, code: u8) {
        if code >= alphabet::BREAK {
            self.reset();
            return;
        }

        self.previous_forward_was_canonical = self.forward_is_canonical;
        self.previous_kmer_exists = self.characters_stored == self.k;

        let old_count = self.characters_stored;
        if old_count == self.k {
            self.pushed_off_character_forward =
                alphabet::code_at(&self.blocks_forward, old_count, 0);
        }

        alphabet::shift_left_insert(&mut self.blocks_forward, code);

        if old_count < self.k {
            alphabet::set_code_at(&mut self.blocks_backward, old_count, alphabet::complement(code));
            self.characters_stored += 1;
        } else {
            alphabet::shift_right_zero_fill(&mut self.blocks_backward);
            alphabet::set_code_at(&mut self.blocks_backward, self.k - 1, alphabet::complement(code));
        }

        self.forward_is_canonical = self.compute_forward_is_canonical();
    }

    /// The character that just fell out of the window's low end. Only
    /// meaningful once the window has been full at least once.
    #[inline]
    pub fn pushed_off_character_forward(&self) -> u8 {
        self.pushed_off_character_forward
    }

    /// `true` if the forward orientation is lexicographically <= the
    /// reverse-complement orientation (i.e. forward is canonical).
    #[inline]
    pub fn forward_is_canonical(&self) -> bool {
        self.forward_is_canonical
    }

    /// Snapshot of [`forward_is_canonical`] from before the most recent push.
    #[inline]
    pub fn previous_forward_was_canonical(&self) -> bool {
        self.previous_forward_was_canonical
    }

    /// `true` if a full k-mer already existed before the most recent push.
    #[inline]
    pub fn previous_kmer_exists(&self) -> bool {
        self.previous_kmer_exists
    }

    /// The 2-bit code at logical position `i` (`0` = oldest) of the forward
    /// window.
    #[inline]
    pub fn forward_char(&self, i: usize) -> u8 {
        alphabet::code_at(&self.blocks_forward, self.characters_stored, i)
    }

    /// The 2-bit code at logical position `i` (`0` = oldest, in
    /// reverse-complement order) of the backward window.
    #[inline]
    pub fn backward_char(&self, i: usize) -> u8 {
        alphabet::code_at(&self.blocks_backward, self.characters_stored, i)
    }

    /// Word `i` of the forward block array.
    #[inline]
    pub fn forward_block(&self, i: usize) -> u64 {
        self.blocks_forward[i]
    }

    /// Word `i` of the backward block array.
    #[inline]
    pub fn backward_block(&self, i: usize) -> u64 {
        self.blocks_backward[i]
    }

    /// The block array of whichever orientation is currently canonical.
    #[inline]
    pub fn canonical_blocks(&self) -> &[u64] {
        if self.forward_is_canonical {
            &self.blocks_forward
        } else {
            &self.blocks_backward
        }
    }

    /// The canonical k-mer as an uppercase ACGT string. Only meaningful once
    /// [`KmerFactory::is_full`] is true.
    pub fn canonical_string(&self) -> String {
        alphabet::blocks_to_string(self.canonical_blocks(), self.characters_stored)
    }

    fn compute_forward_is_canonical(&self) -> bool {
        for (f, b) in self.blocks_forward.iter().zip(self.blocks_backward.iter()) {
            if f != b {
                return f < b;
            }
        }
        true
    }
}
