use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tarfs_core::ArchiveSrc;

use crate::Error;

/// A tar archive on disk
#[derive(Debug)]
pub struct ArchiveFile {
    path: PathBuf,
    src: File,
}

impl ArchiveFile {
    pub fn open(path: impl AsRef<Path>) -> Result<ArchiveFile, Error> {
        let path = path.as_ref().to_path_buf();
        let src = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(wrap_io_err!(path, "Opening archive"))?;
        Ok(ArchiveFile { path, src })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchiveSrc for ArchiveFile {
    type Err = Error;

    /// Repositions the file before every read, since other readers of the
    /// same file may have moved it
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Error> {
        self.src
            .seek(SeekFrom::Start(offset))
            .map_err(wrap_io_err!(self.path, "Seeking archive"))?;
        loop {
            match self.src.read(buf) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                res => return res.map_err(wrap_io_err!(self.path, "Reading archive")),
            }
        }
    }

    fn stream_len(&mut self) -> Result<u64, Error> {
        self.src
            .metadata()
            .map(|metadata| metadata.len())
            .map_err(wrap_io_err!(self.path, "Reading archive metadata"))
    }
}
