use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, ErrorKind, Options, Session, VirtualFile, Whence};

/// Routes paths either into a loaded archive or to the file system
#[derive(Debug, Default)]
pub struct TarFs {
    options: Options,
    session: Option<Session>,
}

impl TarFs {
    pub fn new(options: Options) -> TarFs {
        TarFs {
            options,
            session: None,
        }
    }

    /// Load the archive at `path`, replacing any archive loaded before.
    ///
    /// On failure no archive is loaded.
    pub fn init_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.deinit();
        self.session = Some(Session::open(path, self.options.clone())?);
        Ok(())
    }

    /// Unload the archive and close it. Does nothing if none is loaded.
    pub fn deinit(&mut self) {
        if self.session.take().is_some() {
            debug!("unloaded archive");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Open `path` for reading
    pub fn open(&self, path: &str) -> Result<FsFile<'_>, Error> {
        self.open_with(path, OpenOptions::new().read(true))
    }

    /// Open `path`, using `native` for paths outside the archive. Archive
    /// paths are always opened read-only.
    pub fn open_with(&self, path: &str, native: &OpenOptions) -> Result<FsFile<'_>, Error> {
        let name = match path.strip_prefix(self.options.prefix) {
            Some(rest) => rest
                .strip_prefix('/')
                .ok_or_else(|| Error::NotFound(path.to_string()))?,
            None => return NativeFile::open_with(path, native).map(FsFile::Native),
        };

        let session = self.session.as_ref().ok_or(Error::NoArchiveLoaded)?;
        session.open_entry(name).map(FsFile::Virtual)
    }
}

/// A file system file behind the same interface as [`VirtualFile`]
#[derive(Debug)]
pub struct NativeFile {
    file: File,
    path: PathBuf,
    last_error: Option<ErrorKind>,
}

impl NativeFile {
    pub fn open(path: impl AsRef<Path>) -> Result<NativeFile, Error> {
        NativeFile::open_with(path, OpenOptions::new().read(true))
    }

    pub fn open_with(path: impl AsRef<Path>, options: &OpenOptions) -> Result<NativeFile, Error> {
        let path = path.as_ref().to_path_buf();
        let file = options
            .open(&path)
            .map_err(wrap_io_err!(path, "Opening file"))?;
        Ok(NativeFile {
            file,
            path,
            last_error: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read up to `count` items of `size` bytes, returning the number of
    /// whole items read
    pub fn read(&mut self, buf: &mut [u8], size: usize, count: usize) -> Result<usize, Error> {
        let total = self.check_buffer(buf.len(), size, count)?;

        let mut done = 0;
        while done < total {
            match self.file.read(&mut buf[done..total]) {
                Ok(0) => break,
                Ok(read) => done += read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    let err = wrap_io_err!(self.path, "Reading file")(err);
                    return self.fail(err);
                }
            }
        }

        Ok(done / size)
    }

    /// Write `count` items of `size` bytes from `buf`
    pub fn write(&mut self, buf: &[u8], size: usize, count: usize) -> Result<usize, Error> {
        let total = self.check_buffer(buf.len(), size, count)?;
        match self.file.write_all(&buf[..total]) {
            Ok(()) => Ok(count),
            Err(err) => {
                let err = wrap_io_err!(self.path, "Writing file")(err);
                self.fail(err)
            }
        }
    }

    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, Error> {
        let pos = match whence {
            Whence::Start => match u64::try_from(offset) {
                Ok(offset) => SeekFrom::Start(offset),
                Err(_) => return self.fail(Error::SeekOutOfRange { offset, whence }),
            },
            Whence::Current => SeekFrom::Current(offset),
            Whence::End => SeekFrom::End(offset),
        };

        match self.file.seek(pos) {
            Ok(pos) => Ok(pos),
            Err(err) if err.kind() == io::ErrorKind::InvalidInput => {
                self.fail(Error::SeekOutOfRange { offset, whence })
            }
            Err(err) => {
                let err = wrap_io_err!(self.path, "Seeking file")(err);
                self.fail(err)
            }
        }
    }

    pub fn tell(&mut self) -> Result<u64, Error> {
        match self.file.stream_position() {
            Ok(pos) => Ok(pos),
            Err(err) => {
                let err = wrap_io_err!(self.path, "Seeking file")(err);
                self.fail(err)
            }
        }
    }

    /// Flush and close the file
    pub fn close(mut self) -> Result<(), Error> {
        self.file
            .flush()
            .map_err(wrap_io_err!(self.path, "Closing file"))
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn check_buffer(&mut self, len: usize, size: usize, count: usize) -> Result<usize, Error> {
        match size.checked_mul(count) {
            Some(total) if total != 0 && total <= len => Ok(total),
            _ => self.fail(Error::BadBuffer { len, size, count }),
        }
    }

    fn fail<T>(&mut self, err: Error) -> Result<T, Error> {
        self.last_error = Some(err.kind());
        Err(err)
    }
}

impl Read for NativeFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for NativeFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for NativeFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

/// A file opened through [`TarFs::open`]
#[derive(Debug)]
pub enum FsFile<'a> {
    Native(NativeFile),
    Virtual(VirtualFile<'a>),
}

impl FsFile<'_> {
    pub fn is_virtual(&self) -> bool {
        matches!(self, FsFile::Virtual(_))
    }

    /// Read up to `count` items of `size` bytes into `buf`, returning the
    /// number of whole items read
    pub fn read(&mut self, buf: &mut [u8], size: usize, count: usize) -> Result<usize, Error> {
        match self {
            FsFile::Native(file) => file.read(buf, size, count),
            FsFile::Virtual(file) => file.read(buf, size, count),
        }
    }

    pub fn write(&mut self, buf: &[u8], size: usize, count: usize) -> Result<usize, Error> {
        match self {
            FsFile::Native(file) => file.write(buf, size, count),
            FsFile::Virtual(file) => file.write(buf, size, count),
        }
    }

    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, Error> {
        match self {
            FsFile::Native(file) => file.seek(offset, whence),
            FsFile::Virtual(file) => file.seek(offset, whence),
        }
    }

    pub fn tell(&mut self) -> Result<u64, Error> {
        match self {
            FsFile::Native(file) => file.tell(),
            FsFile::Virtual(file) => Ok(file.tell()),
        }
    }

    pub fn close(self) -> Result<(), Error> {
        match self {
            FsFile::Native(file) => file.close(),
            FsFile::Virtual(file) => file.close(),
        }
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            FsFile::Native(file) => file.error(),
            FsFile::Virtual(file) => file.error(),
        }
    }

    pub fn clear_error(&mut self) {
        match self {
            FsFile::Native(file) => file.clear_error(),
            FsFile::Virtual(file) => file.clear_error(),
        }
    }
}

impl Read for FsFile<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            FsFile::Native(file) => Read::read(file, buf),
            FsFile::Virtual(file) => Read::read(file, buf),
        }
    }
}

impl Seek for FsFile<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            FsFile::Native(file) => Seek::seek(file, pos),
            FsFile::Virtual(file) => Seek::seek(file, pos),
        }
    }
}
