//! Overlap-preserving chunked reads.
//!
//! [`ChunkReader`] is generic over a [`ChunkSource`] (anything byte-readable
//! and `Send`), so the worker/I-O pipeline in `orchestrator` is oblivious to
//! whether bytes are coming straight off disk or through a gzip stream.

use std::io::{self, Read};

/// A byte source a [`ChunkReader`] can pull from. Blanket-implemented for
/// any `Read + Send`, so a plain `File` and a `flate2::GzDecoder<File>`
/// (behind the `gzip` feature) are both usable without a dedicated wrapper
/// type.
pub trait ChunkSource: Read + Send {}
impl<T: Read + Send> ChunkSource for T {}

/// Reads fixed-size chunks from a [`ChunkSource`], re-seeding each chunk
/// after the first with the trailing `overlap_len` bytes of the previous
/// one, so that every k-length window straddling a chunk boundary is still
/// processed exactly once (by the later chunk).
pub struct ChunkReader {
    source: Box<dyn ChunkSource>,
    overlap_len: usize,
    overlap_buf: Vec<u8>,
    eof: bool,
}

impl ChunkReader {
    /// `overlap_len` should be `k - 1`: the number of trailing bytes of one
    /// chunk that the next chunk must re-read to avoid missing a k-window
    /// that straddles the boundary.
    pub fn new(source: Box<dyn ChunkSource>, overlap_len: usize) -> Self {
        ChunkReader {
            source,
            overlap_len,
            overlap_buf: Vec::with_capacity(overlap_len),
            eof: false,
        }
    }

    /// Fills `buf` from the front: the previous chunk's overlap bytes (if
    /// any) first, then freshly read bytes up to `buf.len()`. Returns the
    /// number of valid bytes written, i.e. the usable symbol count for this
    /// chunk. Returns `0` only once the underlying source is exhausted and
    /// no overlap remains to hand back.
    pub fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut total = 0;
        if !self.overlap_buf.is_empty() {
            let n = self.overlap_buf.len().min(buf.len());
            buf[..n].copy_from_slice(&self.overlap_buf[..n]);
            total = n;
        }
        self.overlap_buf.clear();

        if !self.eof {
            while total < buf.len() {
                let n = self.source.read(&mut buf[total..])?;
                if n == 0 {
                    self.eof = true;
                    break;
                }
                total += n;
            }
            // Only a chunk that did *not* itself hit EOF seeds a next
            // overlap: once EOF is observed there is no following chunk to
            // seed, and re-handing back the tail here would spin `fill`
            // forever returning a nonzero, already-fully-processed count.
            if !self.eof && self.overlap_len > 0 && total > 0 {
                let start = total.saturating_sub(self.overlap_len);
                self.overlap_buf.extend_from_slice(&buf[start..total]);
            }
        }

        Ok(total)
    }

    /// `true` once the underlying source has returned EOF (overlap bytes
    /// from the final real chunk may still be pending one more `fill`).
    pub fn source_exhausted(&self) -> bool {
        self.eof
    }
}
