//! The packed struct represents the on-disk layout of a tar header block
use core::mem;
use core::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::{octal, BLOCK_SIZE};

/// First five bytes of the magic field of POSIX and GNU headers
pub const USTAR_MAGIC: &[u8; 5] = b"ustar";
/// Full magic field of POSIX headers
pub const POSIX_MAGIC: &[u8; 6] = b"ustar\0";

#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct Header {
    /// NUL-terminated member name
    pub name: [u8; 100],
    /// Permission bits (octal)
    pub mode: [u8; 8],
    /// Owner id (octal)
    pub uid: [u8; 8],
    /// Group id (octal)
    pub gid: [u8; 8],
    /// Size in bytes of the member data (octal or base-256)
    pub size: [u8; 12],
    /// Modification time in seconds since the epoch (octal)
    pub mtime: [u8; 12],
    /// Unsigned byte sum of the block, taken with this field as spaces
    pub checksum: [u8; 8],
    pub typeflag: u8,
    /// Target of a hard or symbolic link
    pub link_name: [u8; 100],
    /// `ustar\0` for POSIX archives, `ustar ` for GNU ones
    pub magic: [u8; 6],
    pub version: [u8; 2],
    pub user_name: [u8; 32],
    pub group_name: [u8; 32],
    pub dev_major: [u8; 8],
    pub dev_minor: [u8; 8],
    /// Leading path components of names that do not fit in `name`
    pub prefix: [u8; 155],
    pub pad: [u8; 12],
}

impl Header {
    const CHECKSUM_RANGE: Range<usize> = 148..156;

    /// View a raw block as a header
    pub fn from_block(block: &[u8; BLOCK_SIZE]) -> &Header {
        bytemuck::cast_ref(block)
    }

    pub fn as_block(&self) -> &[u8; BLOCK_SIZE] {
        bytemuck::cast_ref(self)
    }

    /// An all-zero block marks padding or the end of an archive
    pub fn is_zeroed(&self) -> bool {
        self.as_block().iter().all(|&b| b == 0)
    }

    /// True if the owner names and device numbers are meaningful. Holds for
    /// both POSIX and GNU headers.
    pub fn is_ustar(&self) -> bool {
        self.magic.starts_with(USTAR_MAGIC)
    }

    /// True for POSIX headers only. GNU headers keep access and change times
    /// and sparse data where POSIX keeps the name prefix.
    pub fn has_prefix(&self) -> bool {
        self.magic == *POSIX_MAGIC
    }

    pub fn size(&self) -> u64 {
        octal::decode_numeric(&self.size)
    }

    pub fn mode(&self) -> u32 {
        octal::decode(&self.mode, self.mode.len()) as u32
    }

    pub fn uid(&self) -> u64 {
        octal::decode_numeric(&self.uid)
    }

    pub fn gid(&self) -> u64 {
        octal::decode_numeric(&self.gid)
    }

    pub fn mtime(&self) -> u64 {
        octal::decode_numeric(&self.mtime)
    }

    pub fn dev_major(&self) -> u32 {
        octal::decode(&self.dev_major, self.dev_major.len()) as u32
    }

    pub fn dev_minor(&self) -> u32 {
        octal::decode(&self.dev_minor, self.dev_minor.len()) as u32
    }

    /// Checksum as stored in the header
    pub fn stored_checksum(&self) -> u32 {
        octal::decode(&self.checksum, self.checksum.len()) as u32
    }

    /// Checksum computed over the block
    pub fn computed_checksum(&self) -> u32 {
        let spaces = Self::CHECKSUM_RANGE.len() as u32 * u32::from(b' ');
        self.as_block()
            .iter()
            .enumerate()
            .filter(|(i, _)| !Self::CHECKSUM_RANGE.contains(i))
            .fold(spaces, |sum, (_, &b)| sum + u32::from(b))
    }

    pub fn checksum_ok(&self) -> bool {
        self.stored_checksum() == self.computed_checksum()
    }

    /// Retrieve the name, ending at the first NUL
    pub fn name_bytes(&self) -> &[u8] {
        until_nul(&self.name)
    }

    pub fn link_name_bytes(&self) -> &[u8] {
        until_nul(&self.link_name)
    }

    pub fn prefix_bytes(&self) -> &[u8] {
        until_nul(&self.prefix)
    }

    pub fn user_name_bytes(&self) -> &[u8] {
        until_nul(&self.user_name)
    }

    pub fn group_name_bytes(&self) -> &[u8] {
        until_nul(&self.group_name)
    }
}

fn until_nul(field: &[u8]) -> &[u8] {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    &field[..end]
}

const _: () = assert!(mem::size_of::<Header>() == BLOCK_SIZE);
