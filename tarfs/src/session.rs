use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tarfs_core::{ArchiveSrc, Entry, Index};
use tracing::{debug, trace, warn};

use crate::{ArchiveFile, Error, Options, VirtualFile};

/// An open archive: the backing stream and the directory scanned from it.
///
/// Every [`VirtualFile`] borrows the session it was opened from, so the
/// session cannot be closed while any handle is still alive. Reads through
/// different handles may interleave; each one repositions and reads the
/// stream under a single lock.
#[derive(Debug)]
pub struct Session<S = ArchiveFile> {
    src: Mutex<S>,
    index: Index,
    options: Options,
    handles: AtomicUsize,
}

impl Session<ArchiveFile> {
    /// Open the archive at `path`, check that it looks like a tar archive and
    /// scan it
    pub fn open(path: impl AsRef<Path>, options: Options) -> Result<Session, Error> {
        let path = path.as_ref();
        let mut src = ArchiveFile::open(path)?;

        if !src.is_tar()? {
            warn!(path = %path.display(), "missing end-of-archive blocks");
            return Err(Error::NotATarArchive(path.to_path_buf()));
        }

        let session = Session::from_src(src, options).inspect_err(|err| {
            warn!(path = %path.display(), %err, "failed to scan archive");
        })?;
        debug!(path = %path.display(), entries = session.index.len(), "loaded archive");
        Ok(session)
    }
}

impl<S> Session<S>
where
    S: ArchiveSrc,
    Error: From<S::Err>,
{
    /// Scan `src`. No format probe is done; see [`ArchiveSrc::is_tar`].
    pub fn from_src(mut src: S, options: Options) -> Result<Session<S>, Error> {
        let entries = if options.verify_checksums {
            src.read_entries_checked()?
        } else {
            src.read_entries()?
        };

        Ok(Session {
            src: Mutex::new(src),
            index: Index::new(entries),
            options,
            handles: AtomicUsize::new(0),
        })
    }

    /// Open the file-like entry stored under `path`
    pub fn open_entry(&self, path: &str) -> Result<VirtualFile<'_, S>, Error> {
        let entry = self
            .index
            .get(path)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;

        if !entry.kind().is_file() {
            return Err(Error::NotAFile {
                path: path.to_string(),
                kind: entry.kind(),
            });
        }

        trace!(path, offset = entry.data_offset(), size = entry.size(), "open");
        Ok(VirtualFile::new(self, entry))
    }

    /// Bounded read of `entry` data, holding the stream lock for the
    /// reposition and the transfer
    pub(crate) fn read_entry(&self, entry: &Entry, offset: u64, buf: &mut [u8]) -> Result<usize, Error> {
        let mut src = self.src.lock();
        Ok(src.read_entry(entry, offset, buf)?)
    }

    /// Raw bytes of the archive at an absolute offset
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize, Error> {
        let mut src = self.src.lock();
        Ok(src.read_at(offset, buf)?)
    }
}

impl<S> Session<S> {
    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Number of virtual files currently open on this session
    pub fn open_handles(&self) -> usize {
        self.handles.load(Ordering::Acquire)
    }

    pub(crate) fn handle_opened(&self) {
        self.handles.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn handle_closed(&self) {
        self.handles.fetch_sub(1, Ordering::AcqRel);
    }

    /// Release the directory and give back the backing stream
    pub fn into_inner(self) -> S {
        self.src.into_inner()
    }
}
