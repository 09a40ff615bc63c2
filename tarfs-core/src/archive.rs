use alloc::vec::Vec;
use core::convert::AsRef;

use crate::{padded_size, Entry, Error, Header, BLOCK_SIZE, TERMINATOR_SIZE};

/// A seekable source of tar archive bytes.
///
/// Implementors provide positioned reads; the provided methods build the
/// archive directory and serve bounded reads of member data on top of them.
pub trait ArchiveSrc {
    type Err: From<Error>;

    /// A single physical read at `offset`. May return fewer bytes than
    /// requested, and 0 at the end of the stream.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Self::Err>;

    /// Total length of the stream in bytes
    fn stream_len(&mut self) -> Result<u64, Self::Err>;

    /// Fill `block` from `offset`, returning false if the stream ends first
    fn read_block(&mut self, offset: u64, block: &mut [u8; BLOCK_SIZE]) -> Result<bool, Self::Err> {
        read_full(self, offset, block)
    }

    /// Check that the stream ends with the two zeroed terminator blocks
    fn is_tar(&mut self) -> Result<bool, Self::Err> {
        let len = self.stream_len()?;
        let Some(offset) = len.checked_sub(TERMINATOR_SIZE as u64) else {
            return Ok(false);
        };

        let mut tail = [0; TERMINATOR_SIZE];
        if !read_full(self, offset, &mut tail)? {
            return Ok(false);
        }
        Ok(tail.iter().all(|&b| b == 0))
    }

    /// Scan the whole archive, without reading any member data
    fn read_entries(&mut self) -> Result<Vec<Entry>, Self::Err> {
        scan(self, false)
    }

    /// Like [`read_entries`](ArchiveSrc::read_entries), but fail on the first
    /// header whose checksum does not match
    fn read_entries_checked(&mut self) -> Result<Vec<Entry>, Self::Err> {
        scan(self, true)
    }

    /// Read from this src at a given entry's data with a given offset within that entry
    fn read_entry(&mut self, entry: &Entry, offset: u64, buf: &mut [u8]) -> Result<usize, Self::Err> {
        if offset >= entry.size() {
            return Ok(0);
        }

        let end = (entry.size() - offset).min(buf.len() as u64) as usize;
        let offset = entry
            .data_offset()
            .checked_add(offset)
            .ok_or(Error::Overflow)?;

        self.read_at(offset, &mut buf[..end])
    }
}

fn read_full<S: ArchiveSrc + ?Sized>(src: &mut S, offset: u64, buf: &mut [u8]) -> Result<bool, S::Err> {
    let mut got = 0;
    while got < buf.len() {
        let count = src.read_at(offset + got as u64, &mut buf[got..])?;
        if count == 0 {
            return Ok(false);
        }
        got += count;
    }
    Ok(true)
}

fn scan<S: ArchiveSrc + ?Sized>(src: &mut S, verify: bool) -> Result<Vec<Entry>, S::Err> {
    let mut entries = Vec::new();
    let mut offset = 0u64;
    let mut block = [0; BLOCK_SIZE];

    loop {
        if !src.read_block(offset, &mut block)? {
            return Err(Error::ShortRead { offset }.into());
        }

        if Header::from_block(&block).is_zeroed() {
            // A lone zeroed block is padding; two in a row end the archive
            offset += BLOCK_SIZE as u64;
            if !src.read_block(offset, &mut block)? {
                return Err(Error::ShortRead { offset }.into());
            }
            if Header::from_block(&block).is_zeroed() {
                break;
            }
        }

        let header = Header::from_block(&block);
        if verify && !header.checksum_ok() {
            return Err(Error::Checksum {
                offset,
                stored: header.stored_checksum(),
                computed: header.computed_checksum(),
            }
            .into());
        }

        let entry = Entry::from_header(header, offset);
        offset = entry.next_header_offset().ok_or(Error::Overflow)?;
        entries.push(entry);
    }

    Ok(entries)
}

impl<T: AsRef<[u8]>> ArchiveSrc for T {
    type Err = Error;

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Error> {
        let data = self.as_ref();
        let start = match usize::try_from(offset) {
            Ok(start) if start < data.len() => start,
            _ => return Ok(0),
        };
        let end = start.saturating_add(buf.len()).min(data.len());
        let count = end - start;
        buf[..count].copy_from_slice(&data[start..end]);
        Ok(count)
    }

    fn stream_len(&mut self) -> Result<u64, Error> {
        Ok(self.as_ref().len() as u64)
    }
}
