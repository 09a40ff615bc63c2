use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

use tarfs_core::EntryKind;

use crate::Whence;

#[derive(thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] tarfs_core::Error),

    #[error("{context}: {}", .path.display())]
    Io {
        source: io::Error,
        path: PathBuf,
        context: &'static str,
    },

    #[error("Not a tar archive: {}", .0.display())]
    NotATarArchive(PathBuf),

    #[error("No archive loaded")]
    NoArchiveLoaded,

    #[error("No such entry: {0}")]
    NotFound(String),

    #[error("Entry {path} is a {kind}, not a file")]
    NotAFile { path: String, kind: EntryKind },

    #[error("Buffer of {len} bytes cannot hold {count} items of {size} bytes")]
    BadBuffer {
        len: usize,
        size: usize,
        count: usize,
    },

    #[error("Seek to {offset} from {whence:?} is out of range")]
    SeekOutOfRange { offset: i64, whence: Whence },

    #[error("Invalid whence value {0}")]
    InvalidWhence(i32),

    #[error("Read-only file system")]
    ReadOnlyFilesystem,
}

/// The category of an [`Error`], kept as the sticky error of a file handle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    /// No archive is loaded
    OutOfResources,
    BadBuffer,
    SeekOutOfRange,
    ReadOnlyFilesystem,
    /// Underlying read or seek failure, with the OS error code if there was one
    IoFailure(Option<i32>),
    NotATarArchive,
    NotAFile,
    /// Truncated archive or invalid header
    Malformed,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Core(_) => ErrorKind::Malformed,
            Error::Io { source, .. } => ErrorKind::IoFailure(source.raw_os_error()),
            Error::NotATarArchive(_) => ErrorKind::NotATarArchive,
            Error::NoArchiveLoaded => ErrorKind::OutOfResources,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::NotAFile { .. } => ErrorKind::NotAFile,
            Error::BadBuffer { .. } => ErrorKind::BadBuffer,
            Error::SeekOutOfRange { .. } | Error::InvalidWhence(_) => ErrorKind::SeekOutOfRange,
            Error::ReadOnlyFilesystem => ErrorKind::ReadOnlyFilesystem,
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{self}")?;

        let mut source = self.source();
        while let Some(err) = source {
            writeln!(f, "\tCaused by: {err}")?;
            source = err.source();
        }

        Ok(())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        let kind = match &err {
            Error::Io { source, .. } => source.kind(),
            Error::NotFound(_) | Error::NoArchiveLoaded => io::ErrorKind::NotFound,
            Error::BadBuffer { .. }
            | Error::SeekOutOfRange { .. }
            | Error::InvalidWhence(_)
            | Error::NotAFile { .. } => io::ErrorKind::InvalidInput,
            Error::ReadOnlyFilesystem => io::ErrorKind::PermissionDenied,
            Error::Core(_) | Error::NotATarArchive(_) => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}
