use std::io::{self, SeekFrom};

use tarfs_core::{ArchiveSrc, Entry};
use tracing::trace;

use crate::{ArchiveFile, Error, ErrorKind, SeekEndPolicy, Session};

/// Reference point of a seek, with the conventional `SEEK_SET`, `SEEK_CUR`
/// and `SEEK_END` values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum Whence {
    Start = 0,
    Current = 1,
    End = 2,
}

impl TryFrom<i32> for Whence {
    type Error = Error;

    fn try_from(value: i32) -> Result<Whence, Error> {
        match value {
            0 => Ok(Whence::Start),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            _ => Err(Error::InvalidWhence(value)),
        }
    }
}

/// A read-only handle on the data of one archive entry.
///
/// The handle keeps its own cursor; the shared archive stream is repositioned
/// on every read. Failed operations leave a sticky [`ErrorKind`] behind until
/// [`clear_error`](VirtualFile::clear_error) is called.
#[derive(Debug)]
pub struct VirtualFile<'a, S = ArchiveFile> {
    session: &'a Session<S>,
    entry: &'a Entry,
    cursor: u64,
    last_error: Option<ErrorKind>,
}

impl<'a, S> VirtualFile<'a, S> {
    pub(crate) fn new(session: &'a Session<S>, entry: &'a Entry) -> VirtualFile<'a, S> {
        session.handle_opened();
        VirtualFile {
            session,
            entry,
            cursor: 0,
            last_error: None,
        }
    }

    pub fn entry(&self) -> &'a Entry {
        self.entry
    }

    /// Size of the entry data
    pub fn len(&self) -> u64 {
        self.entry.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current position, never more than [`len`](VirtualFile::len)
    pub fn tell(&self) -> u64 {
        self.cursor
    }

    /// Move the cursor and return the new position.
    ///
    /// A target outside `0..=len` fails with [`Error::SeekOutOfRange`] and
    /// leaves the cursor where it was. Positive offsets from the end follow
    /// the session's [`SeekEndPolicy`].
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, Error> {
        let len = i128::from(self.len());
        let target = match whence {
            Whence::Start => Some(i128::from(offset)),
            Whence::Current => Some(i128::from(self.cursor) + i128::from(offset)),
            Whence::End if -i128::from(offset) > len => None,
            Whence::End => {
                let target = i128::from(offset) + len;
                match self.session.options().seek_end {
                    SeekEndPolicy::Wrap => Some(target % (len + 1)),
                    SeekEndPolicy::Strict => Some(target),
                }
            }
        };

        match target.filter(|target| (0..=len).contains(target)) {
            Some(target) => {
                // In range, so it fits
                self.cursor = target as u64;
                Ok(self.cursor)
            }
            None => {
                trace!(path = self.entry.path(), offset, ?whence, "seek rejected");
                self.fail(Error::SeekOutOfRange { offset, whence })
            }
        }
    }

    /// Virtual files are never writable
    pub fn write(&mut self, _buf: &[u8], _size: usize, _count: usize) -> Result<usize, Error> {
        self.fail(Error::ReadOnlyFilesystem)
    }

    /// Release the handle. The archive stream stays open.
    pub fn close(self) -> Result<(), Error> {
        Ok(())
    }

    /// The sticky error left by the last failed operation
    pub fn error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn fail<T>(&mut self, err: Error) -> Result<T, Error> {
        self.last_error = Some(err.kind());
        Err(err)
    }
}

impl<'a, S> VirtualFile<'a, S>
where
    S: ArchiveSrc,
    Error: From<S::Err>,
{
    /// Read up to `count` items of `size` bytes into `buf` and return the
    /// number of whole items read.
    ///
    /// Reading stops early at the end of the entry; a trailing partial item
    /// is still copied and advances the cursor but is not counted. A failing
    /// read of the archive after some data was transferred returns the short
    /// count and leaves the failure in [`error`](VirtualFile::error).
    pub fn read(&mut self, buf: &mut [u8], size: usize, count: usize) -> Result<usize, Error> {
        let total = match size.checked_mul(count) {
            Some(total) if total != 0 && total <= buf.len() => total,
            _ => {
                return self.fail(Error::BadBuffer {
                    len: buf.len(),
                    size,
                    count,
                })
            }
        };

        let mut done = 0;
        while done < total && self.cursor < self.len() {
            let remaining = self.len() - self.cursor;
            let chunk = size.min(total - done);
            let chunk = usize::try_from(remaining).map_or(chunk, |remaining| chunk.min(remaining));

            let read = match self
                .session
                .read_entry(self.entry, self.cursor, &mut buf[done..done + chunk])
            {
                Ok(read) => read,
                Err(err) if done == 0 => return self.fail(err),
                Err(err) => {
                    trace!(path = self.entry.path(), %err, "short read");
                    self.last_error = Some(err.kind());
                    break;
                }
            };
            if read == 0 {
                break;
            }

            self.cursor += read as u64;
            done += read;
        }

        Ok(done / size)
    }
}

impl<S> Drop for VirtualFile<'_, S> {
    fn drop(&mut self) {
        trace!(path = self.entry.path(), "close");
        self.session.handle_closed();
    }
}

impl<S> io::Read for VirtualFile<'_, S>
where
    S: ArchiveSrc,
    Error: From<S::Err>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = buf.len();
        Ok(VirtualFile::read(self, buf, 1, len)?)
    }
}

impl<S> io::Seek for VirtualFile<'_, S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            SeekFrom::Start(offset) => match i64::try_from(offset) {
                Ok(offset) => (offset, Whence::Start),
                Err(_) => {
                    let err = Error::SeekOutOfRange {
                        offset: i64::MAX,
                        whence: Whence::Start,
                    };
                    self.last_error = Some(err.kind());
                    return Err(err.into());
                }
            },
            SeekFrom::Current(offset) => (offset, Whence::Current),
            SeekFrom::End(offset) => (offset, Whence::End),
        };
        Ok(VirtualFile::seek(self, offset, whence)?)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.tell())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read, Seek, SeekFrom};
    use std::ops::Range;

    use tarfs_core::ArchiveSrc;

    use super::Whence;
    use crate::{Error, ErrorKind, Options, SeekEndPolicy, Session};

    const NOTES: &[u8] = b"0123456789";

    fn fixture(options: Options) -> Session<Vec<u8>> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in [("notes.txt", NOTES), ("empty", &b""[..])] {
            let mut header = tar::Header::new_ustar();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, path, data).unwrap();
        }
        Session::from_src(builder.into_inner().unwrap(), options).unwrap()
    }

    #[test]
    fn whence_values() {
        assert_eq!(Whence::try_from(0).unwrap(), Whence::Start);
        assert_eq!(Whence::try_from(1).unwrap(), Whence::Current);
        assert_eq!(Whence::try_from(2).unwrap(), Whence::End);
        assert!(matches!(Whence::try_from(3), Err(Error::InvalidWhence(3))));
        assert_eq!(Whence::End as i32, 2);
    }

    #[test]
    fn read_items() {
        let session = fixture(Options::default());
        let mut file = session.open_entry("notes.txt").unwrap();
        let mut buf = [0; 64];

        assert_eq!(file.read(&mut buf, 3, 2).unwrap(), 2);
        assert_eq!(&buf[..6], b"012345");
        assert_eq!(file.tell(), 6);

        // Partial trailing item is copied but not counted
        assert_eq!(file.read(&mut buf, 3, 2).unwrap(), 1);
        assert_eq!(&buf[..4], b"6789");
        assert_eq!(file.tell(), 10);

        assert_eq!(file.read(&mut buf, 1, 1).unwrap(), 0);
        assert_eq!(file.error(), None);
    }

    #[test]
    fn read_one_large_item() {
        let session = fixture(Options::default());
        let mut file = session.open_entry("notes.txt").unwrap();
        let mut buf = [0; 64];
        assert_eq!(file.read(&mut buf, 64, 1).unwrap(), 0);
        assert_eq!(&buf[..10], NOTES);
        assert_eq!(file.tell(), 10);
    }

    #[test]
    fn bad_buffer() {
        let session = fixture(Options::default());
        let mut file = session.open_entry("notes.txt").unwrap();
        let mut buf = [0; 4];

        assert!(matches!(file.read(&mut buf, 0, 4), Err(Error::BadBuffer { .. })));
        assert_eq!(file.error(), Some(ErrorKind::BadBuffer));
        file.clear_error();

        assert!(matches!(file.read(&mut buf, 1, 5), Err(Error::BadBuffer { .. })));
        assert!(matches!(file.read(&mut buf, usize::MAX, 2), Err(Error::BadBuffer { .. })));
        assert_eq!(file.tell(), 0);
    }

    #[test]
    fn seek_bounds() {
        let session = fixture(Options::default());
        let mut file = session.open_entry("notes.txt").unwrap();

        assert_eq!(file.seek(10, Whence::Start).unwrap(), 10);
        assert_eq!(file.seek(-4, Whence::Current).unwrap(), 6);
        assert_eq!(file.seek(-10, Whence::End).unwrap(), 0);
        assert_eq!(file.seek(0, Whence::End).unwrap(), 10);

        file.seek(3, Whence::Start).unwrap();
        for (offset, whence) in [(11, Whence::Start), (-1, Whence::Start), (-4, Whence::Current), (-11, Whence::End)] {
            assert!(matches!(
                file.seek(offset, whence),
                Err(Error::SeekOutOfRange { .. })
            ));
            assert_eq!(file.tell(), 3);
        }
        assert_eq!(file.error(), Some(ErrorKind::SeekOutOfRange));
    }

    #[test]
    fn seek_past_end() {
        let session = fixture(Options::default());
        let mut file = session.open_entry("notes.txt").unwrap();
        assert_eq!(file.seek(3, Whence::End).unwrap(), 2);
        assert_eq!(file.seek(1, Whence::End).unwrap(), 0);

        let session = fixture(Options::new().seek_end(SeekEndPolicy::Strict));
        let mut file = session.open_entry("notes.txt").unwrap();
        file.seek(5, Whence::Start).unwrap();
        assert!(matches!(file.seek(1, Whence::End), Err(Error::SeekOutOfRange { .. })));
        assert_eq!(file.tell(), 5);
    }

    /// Serves an archive from memory but fails reads inside `broken`
    struct Flaky {
        data: Vec<u8>,
        broken: Range<u64>,
    }

    impl ArchiveSrc for Flaky {
        type Err = Error;

        fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Error> {
            if self.broken.contains(&offset) {
                return Err(Error::Io {
                    source: io::Error::new(io::ErrorKind::Other, "bad sector"),
                    path: "flaky.tar".into(),
                    context: "Reading archive",
                });
            }
            Ok(self.data.read_at(offset, buf)?)
        }

        fn stream_len(&mut self) -> Result<u64, Error> {
            Ok(self.data.stream_len()?)
        }
    }

    #[test]
    fn failed_read_keeps_short_count() {
        let data = fixture(Options::default()).into_inner();
        // notes.txt data starts after the first header
        let session = Session::from_src(Flaky { data, broken: 516..522 }, Options::default()).unwrap();
        let mut file = session.open_entry("notes.txt").unwrap();

        let mut buf = [0; 10];
        assert_eq!(file.read(&mut buf, 2, 5).unwrap(), 2);
        assert_eq!(&buf[..4], b"0123");
        assert_eq!(file.tell(), 4);
        assert_eq!(file.error(), Some(ErrorKind::IoFailure(None)));

        file.clear_error();
        assert!(matches!(file.read(&mut buf, 2, 1), Err(Error::Io { .. })));
        assert_eq!(file.tell(), 4);
        assert_eq!(file.error(), Some(ErrorKind::IoFailure(None)));
    }

    #[test]
    fn write_is_rejected() {
        let session = fixture(Options::default());
        let mut file = session.open_entry("notes.txt").unwrap();
        assert!(matches!(file.write(b"x", 1, 1), Err(Error::ReadOnlyFilesystem)));
        assert_eq!(file.error(), Some(ErrorKind::ReadOnlyFilesystem));
        file.clear_error();
        assert_eq!(file.error(), None);
    }

    #[test]
    fn empty_entry() {
        let session = fixture(Options::default());
        let mut file = session.open_entry("empty").unwrap();
        let mut buf = [0; 8];
        assert_eq!(file.read(&mut buf, 1, 8).unwrap(), 0);
        assert_eq!(file.seek(0, Whence::End).unwrap(), 0);
        assert!(file.seek(1, Whence::Start).is_err());
    }

    #[test]
    fn interleaved_handles() {
        let session = fixture(Options::default());
        let mut a = session.open_entry("notes.txt").unwrap();
        let mut b = session.open_entry("notes.txt").unwrap();
        let mut buf = [0; 2];

        a.read(&mut buf, 1, 2).unwrap();
        assert_eq!(&buf, b"01");
        b.seek(8, Whence::Start).unwrap();
        b.read(&mut buf, 1, 2).unwrap();
        assert_eq!(&buf, b"89");
        a.read(&mut buf, 1, 2).unwrap();
        assert_eq!(&buf, b"23");
    }

    #[test]
    fn std_io() {
        let session = fixture(Options::default());
        let mut file = session.open_entry("notes.txt").unwrap();

        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        assert_eq!(data, NOTES);

        assert_eq!(Seek::seek(&mut file, SeekFrom::Start(4)).unwrap(), 4);
        assert_eq!(file.stream_position().unwrap(), 4);
        let mut rest = String::new();
        file.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "456789");

        let err = Seek::seek(&mut file, SeekFrom::Start(u64::MAX)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert_eq!(file.tell(), 10);
    }
}
