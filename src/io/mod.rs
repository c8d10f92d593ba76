//! File-backed input for the chunked pipeline.
//!
//! Submodules:
//! - [`file_io`]       — opening the input file and applying POSIX read-ahead /
//!                       drop-cache advice.
//! - [`chunk_reader`]  — overlap-preserving fixed-size reads over whichever
//!                       [`chunk_reader::ChunkSource`] is in play (plain file or,
//!                       with the `gzip` feature, a gzip stream).

pub mod chunk_reader;
pub mod file_io;

pub use chunk_reader::{ChunkReader, ChunkSource};
pub use file_io::open_input;
