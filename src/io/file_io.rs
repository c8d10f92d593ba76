//! Opening the input file and applying POSIX file-advise hints.
//!
//! Grounded in the teacher's `util::file_status` POSIX/non-POSIX cfg split:
//! the readahead/dontneed advice is Linux-only and a documented no-op
//! elsewhere, rather than a `cfg`-gated absence of the function itself.

use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use crate::error::KmercError;
use crate::io::chunk_reader::ChunkSource;
use crate::util;

/// Opens `path` for reading, rejecting directories, and applying a
/// sequential-access read-ahead hint on supported platforms.
///
/// If the `gzip` Cargo feature is enabled and `gzip` is `true`, the returned
/// source transparently decompresses; callers downstream (`ChunkReader`)
/// are oblivious to which case applies.
pub fn open_input(path: &Path, gzip: bool) -> Result<Box<dyn ChunkSource>, KmercError> {
    if util::is_directory(path) {
        return Err(KmercError::InvalidArgument(format!(
            "{} is a directory, not a file",
            path.display()
        )));
    }
    if path.exists() && !util::is_reg_file(path) {
        return Err(KmercError::InvalidArgument(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    let file = File::open(path)?;
    advise_sequential(&file);

    if gzip {
        #[cfg(feature = "gzip")]
        {
            Ok(Box::new(flate2::read::GzDecoder::new(file)))
        }
        #[cfg(not(feature = "gzip"))]
        {
            Err(KmercError::InvalidArgument(
                "gzip input requested but the crate was built without the `gzip` feature"
                    .to_owned(),
            ))
        }
    } else {
        Ok(Box::new(file))
    }
}

/// Advises the kernel that `file` will be read sequentially from start to
/// end. A no-op outside Linux.
#[cfg(target_os = "linux")]
pub fn advise_sequential(file: &File) {
    use nix::fcntl::{posix_fadvise, PosixFadviseAdvice};
    let _ = posix_fadvise(file.as_raw_fd(), 0, 0, PosixFadviseAdvice::POSIX_FADV_SEQUENTIAL);
}

#[cfg(not(target_os = "linux"))]
pub fn advise_sequential(_file: &File) {}

/// Advises the kernel to drop `file`'s pages from cache. Called once the
/// orchestrator has finished reading the input. A no-op outside Linux.
#[cfg(target_os = "linux")]
pub fn advise_dont_need(file: &File) {
    use nix::fcntl::{posix_fadvise, PosixFadviseAdvice};
    let _ = posix_fadvise(file.as_raw_fd(), 0, 0, PosixFadviseAdvice::POSIX_FADV_DONTNEED);
}

#[cfg(not(target_os = "linux"))]
pub fn advise_dont_need(_file: &File) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::TempDir;

    #[test]
    fn open_input_rejects_directory() {
        let dir = TempDir::new().unwrap();
        let err = open_input(dir.path(), false).unwrap_err();
        assert!(matches!(err, KmercError::InvalidArgument(_)));
    }

    #[test]
    fn open_input_reads_plain_file_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, b"ACGT\n").unwrap();
        let mut src = open_input(&path, false).unwrap();
        let mut out = Vec::new();
        src.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"ACGT\n");
    }

    #[test]
    fn open_input_errors_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");
        let err = open_input(&path, false).unwrap_err();
        assert!(matches!(err, KmercError::Io(_)));
    }

    #[test]
    fn open_input_rejects_non_regular_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fifo");
        nix::unistd::mkfifo(&path, nix::sys::stat::Mode::from_bits_truncate(0o600)).unwrap();
        let err = open_input(&path, false).unwrap_err();
        assert!(matches!(err, KmercError::InvalidArgument(_)));
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn open_input_decodes_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.txt.gz");
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"ACGT\n").unwrap();
        let compressed = enc.finish().unwrap();
        std::fs::write(&path, compressed).unwrap();

        let mut src = open_input(&path, true).unwrap();
        let mut out = Vec::new();
        src.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"ACGT\n");
    }
}
