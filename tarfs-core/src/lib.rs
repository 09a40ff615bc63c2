#![no_std]
extern crate alloc;

use core::mem;

pub use crate::archive::ArchiveSrc;
pub use crate::entry::{Entry, EntryKind, Ustar};
pub use crate::error::Error;
pub use crate::header::Header;
pub use crate::index::Index;
pub use crate::mode::Mode;

mod archive;
mod entry;
mod error;
mod header;
mod index;
mod mode;
pub mod octal;

#[cfg(test)]
mod test;

/// Size of a header block and the unit all data regions are padded to
pub const BLOCK_SIZE: usize = 512;
/// Blocks per record
pub const BLOCKING_FACTOR: usize = 20;
pub const RECORD_SIZE: usize = BLOCK_SIZE * BLOCKING_FACTOR;
/// Two zeroed blocks end an archive
pub const TERMINATOR_SIZE: usize = BLOCK_SIZE * 2;
pub const HEADER_SIZE: usize = mem::size_of::<Header>();

/// Round `size` up to the next multiple of [`BLOCK_SIZE`]
pub fn padded_size(size: u64) -> Option<u64> {
    let mask = BLOCK_SIZE as u64 - 1;
    size.checked_add(mask).map(|size| size & !mask)
}

#[cfg(test)]
mod tests {
    use core::mem;

    use crate::{padded_size, Header, BLOCK_SIZE, HEADER_SIZE, RECORD_SIZE};

    #[test]
    fn header_size() {
        assert_eq!(mem::size_of::<Header>(), 512);
        assert_eq!(HEADER_SIZE, BLOCK_SIZE);
        assert_eq!(RECORD_SIZE, 10240);
    }

    #[test]
    fn padding() {
        assert_eq!(padded_size(0), Some(0));
        assert_eq!(padded_size(1), Some(512));
        assert_eq!(padded_size(512), Some(512));
        assert_eq!(padded_size(513), Some(1024));
        assert_eq!(padded_size(u64::MAX), None);
    }
}
