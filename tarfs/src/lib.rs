//! Read-only access to the members of a tar archive through file handles.
//!
//! A [`TarFs`] routes paths that start with a reserved marker (`@/` by
//! default) to an archive loaded with [`TarFs::init_from_file`], and opens
//! every other path from the file system. Both kinds of handle share the same
//! `fread`/`fseek`/`ftell` shaped interface on [`FsFile`].
//!
//! ```no_run
//! use tarfs::{Options, TarFs, Whence};
//!
//! # fn main() -> Result<(), tarfs::Error> {
//! let mut fs = TarFs::new(Options::default());
//! fs.init_from_file("assets.tar")?;
//!
//! let mut file = fs.open("@/notes.txt")?;
//! let mut buf = [0; 64];
//! let items = file.read(&mut buf, 1, 64)?;
//! file.seek(0, Whence::Start)?;
//! assert_eq!(file.tell()?, 0);
//! file.close()?;
//! # let _ = items;
//! # Ok(())
//! # }
//! ```

/// Build a closure mapping an [`std::io::Error`] into [`Error::Io`]
macro_rules! wrap_io_err {
    ($path:expr, $context:expr) => {
        |source| $crate::Error::Io {
            source,
            path: $path.to_path_buf(),
            context: $context,
        }
    };
}

mod bin;
mod error;
mod file;
mod fs;
mod options;
mod session;
mod vfile;

pub use bin::*;
pub use error::{Error, ErrorKind};
pub use file::ArchiveFile;
pub use fs::{FsFile, NativeFile, TarFs};
pub use options::{Options, SeekEndPolicy, DEFAULT_PREFIX};
pub use session::Session;
pub use vfile::{VirtualFile, Whence};

pub use tarfs_core::{ArchiveSrc, Entry, EntryKind, Index, Mode, Ustar, BLOCK_SIZE, RECORD_SIZE};
