//! Files and directories.

use crate::arena::Arena;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which standard stream, used by [`super::is_tty`] and process pipe capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdStream {
    Stdin = 0,
    Stdout = 1,
    Stderr = 2,
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, #[source] source: io::Error },
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, #[source] source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, #[source] source: io::Error },
    #[error("failed to stat {path}: {source}")]
    Stat { path: PathBuf, #[source] source: io::Error },
}

/// Open-mode flags. `directory` requests a directory handle (for fstat-style
/// queries); POSIX and Windows both support this via a read-only open.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub truncate: bool,
    pub create: bool,
    pub execute: bool,
    pub directory: bool,
}

/// Opens `path` per `flags`. Mirrors the contract's `FileDescriptor?`
/// nullable-on-failure convention as `Option`, so callers that want a hard
/// failure can `.ok_or_else(..)?` at the boundary.
#[must_use]
pub fn file_open(path: &Path, flags: OpenFlags) -> Option<File> {
    let mut options = OpenOptions::new();
    options.read(flags.read || flags.directory);
    options.write(flags.write);
    options.truncate(flags.truncate);
    options.create(flags.create);
    options.open(path).ok()
}

pub struct FileStats {
    pub size: u64,
    pub modified_time_s: i64,
    pub modified_time_ns: i64,
}

pub fn file_get_size(file: &File) -> io::Result<u64> {
    Ok(file.metadata()?.len())
}

pub fn file_get_stats(file: &File) -> io::Result<FileStats> {
    let metadata = file.metadata()?;
    let modified = metadata.modified()?;
    let duration = modified
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    Ok(FileStats {
        size: metadata.len(),
        modified_time_s: duration.as_secs() as i64,
        modified_time_ns: i64::from(duration.subsec_nanos()),
    })
}

/// Loops internally over partial reads until EOF or `buffer.len()` is reached.
pub fn file_read(mut file: &File, buffer: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buffer.len() {
        match file.read(&mut buffer[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

/// Loops until all bytes are written. A partial-write error is fatal to the caller.
pub fn file_write(mut file: &File, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes)
}

/// Creates the leaf directory, ignoring "already exists".
pub fn make_directory(path: &Path) -> io::Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

/// Creates every missing parent directory, ignoring "already exists" —
/// used before writing a compilation unit's object file.
pub fn make_directory_all(path: &Path) -> io::Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

/// Canonicalizes `relative` against the current directory. Returns `None`
/// (the spec's "empty string on overflow") if the path cannot be resolved.
#[must_use]
pub fn path_absolute(relative: &Path) -> Option<PathBuf> {
    fs::canonicalize(relative).ok().or_else(|| {
        std::env::current_dir()
            .ok()
            .map(|cwd| cwd.join(relative))
    })
}

#[must_use]
pub fn copy_file(original: &Path, new: &Path) -> bool {
    fs::copy(original, new).is_ok()
}

/// Padding/alignment request for [`read_file_into_arena`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadPadding {
    pub start_padding: usize,
    pub end_padding: usize,
    pub start_alignment: usize,
    pub end_alignment: usize,
}

/// Open + size + alloc-with-padding + read-all + close in one call, for
/// loading whole files with the alignment guarantees downstream consumers
/// (object files, shaders, TTF tables) require.
pub fn read_file_into_arena<'a>(
    arena: &'a mut Arena,
    path: &Path,
    padding: ReadPadding,
) -> Result<&'a [u8], FileError> {
    let mut file = File::open(path).map_err(|source| FileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let size = file
        .metadata()
        .map_err(|source| FileError::Stat {
            path: path.to_path_buf(),
            source,
        })?
        .len() as usize;

    let align = padding.start_alignment.max(1);
    let total = padding.start_padding + size + padding.end_padding;
    let total = crate::bytes::align_forward(total, padding.end_alignment.max(1));

    let buffer = arena
        .allocate_slice(total, align)
        .map_err(|_| FileError::Read {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::OutOfMemory, "arena exhausted"),
        })?;

    let data_region = &mut buffer[padding.start_padding..padding.start_padding + size];
    file.read_exact(data_region).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(buffer)
}

/// Create/truncate/write-all/close in one call.
#[must_use]
pub fn write_file(path: &Path, bytes: &[u8]) -> bool {
    fs::write(path, bytes).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.bin");
        assert!(write_file(&path, b"hello world"));

        let file = File::open(&path).unwrap();
        let mut buf = [0u8; 32];
        let n = file_read(&file, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello world");
    }

    #[test]
    fn make_directory_ignores_already_exists() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("child");
        make_directory(&sub).unwrap();
        make_directory(&sub).unwrap();
    }

    #[test]
    fn read_file_into_arena_applies_padding() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("padded.bin");
        write_file(&path, b"abcd");

        let mut arena = Arena::create(1024 * 1024, 4096, 4096).unwrap();
        let data = read_file_into_arena(
            &mut arena,
            &path,
            ReadPadding {
                start_padding: 4,
                end_padding: 0,
                start_alignment: 16,
                end_alignment: 1,
            },
        )
        .unwrap();
        assert_eq!(&data[4..8], b"abcd");
    }
}
