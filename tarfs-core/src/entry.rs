use alloc::format;
use alloc::string::String;
use core::fmt::{self, Display, Formatter};

use crate::{padded_size, Header, Mode, BLOCK_SIZE};

/// Type of an archive member, from the header typeflag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Regular,
    HardLink,
    Symlink,
    CharDevice,
    BlockDevice,
    Directory,
    Fifo,
    Contiguous,
    /// Typeflags not interpreted here (pax and GNU extension headers, vendor types)
    Other(u8),
}

impl EntryKind {
    pub fn from_typeflag(flag: u8) -> EntryKind {
        match flag {
            // pre-POSIX archives leave the flag blank
            0 | b'0' => EntryKind::Regular,
            b'1' => EntryKind::HardLink,
            b'2' => EntryKind::Symlink,
            b'3' => EntryKind::CharDevice,
            b'4' => EntryKind::BlockDevice,
            b'5' => EntryKind::Directory,
            b'6' => EntryKind::Fifo,
            b'7' => EntryKind::Contiguous,
            other => EntryKind::Other(other),
        }
    }

    /// Only file-like entries can be opened for reading
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::Regular | EntryKind::Contiguous)
    }

    pub fn is_device(&self) -> bool {
        matches!(self, EntryKind::CharDevice | EntryKind::BlockDevice)
    }

    /// Leading character of an `ls -l` style listing
    pub fn as_char(&self) -> char {
        match self {
            EntryKind::Regular | EntryKind::Contiguous => '-',
            EntryKind::HardLink => 'h',
            EntryKind::Symlink => 'l',
            EntryKind::CharDevice => 'c',
            EntryKind::BlockDevice => 'b',
            EntryKind::Directory => 'd',
            EntryKind::Fifo => 'p',
            EntryKind::Other(_) => '?',
        }
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Regular => write!(f, "regular file"),
            EntryKind::HardLink => write!(f, "hard link"),
            EntryKind::Symlink => write!(f, "symbolic link"),
            EntryKind::CharDevice => write!(f, "character device"),
            EntryKind::BlockDevice => write!(f, "block device"),
            EntryKind::Directory => write!(f, "directory"),
            EntryKind::Fifo => write!(f, "fifo"),
            EntryKind::Contiguous => write!(f, "contiguous file"),
            EntryKind::Other(flag) => write!(f, "unknown entry type {:#04x}", flag),
        }
    }
}

/// Fields only present in UStar headers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ustar {
    pub user_name: String,
    pub group_name: String,
    pub dev_major: u32,
    pub dev_minor: u32,
    pub prefix: String,
}

/// A decoded archive member. Entries are produced by a scan and never change
/// afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    path: String,
    kind: EntryKind,
    size: u64,
    mode: Mode,
    uid: u64,
    gid: u64,
    mtime: u64,
    checksum: u32,
    link_name: String,
    ustar: Option<Ustar>,
    header_offset: u64,
}

impl Entry {
    /// Decode `header`, found at `header_offset` in the archive
    pub fn from_header(header: &Header, header_offset: u64) -> Entry {
        let name = lossy(header.name_bytes());
        let ustar = header.is_ustar().then(|| Ustar {
            user_name: lossy(header.user_name_bytes()),
            group_name: lossy(header.group_name_bytes()),
            dev_major: header.dev_major(),
            dev_minor: header.dev_minor(),
            prefix: if header.has_prefix() {
                lossy(header.prefix_bytes())
            } else {
                String::new()
            },
        });

        let path = match &ustar {
            Some(ustar) if !ustar.prefix.is_empty() => format!("{}/{}", ustar.prefix, name),
            _ => name,
        };

        Entry {
            path,
            kind: EntryKind::from_typeflag(header.typeflag),
            size: header.size(),
            mode: Mode::from_bits_truncate(header.mode()),
            uid: header.uid(),
            gid: header.gid(),
            mtime: header.mtime(),
            checksum: header.stored_checksum(),
            link_name: lossy(header.link_name_bytes()),
            ustar,
            header_offset,
        }
    }

    /// Logical name: `prefix/name` for UStar headers with a prefix, else `name`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Size in bytes of the member data
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn gid(&self) -> u64 {
        self.gid
    }

    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Link target, empty unless this is a link
    pub fn link_name(&self) -> &str {
        &self.link_name
    }

    pub fn ustar(&self) -> Option<&Ustar> {
        self.ustar.as_ref()
    }

    /// Offset of the header block in the archive
    pub fn header_offset(&self) -> u64 {
        self.header_offset
    }

    /// Offset of the first data byte in the archive
    pub fn data_offset(&self) -> u64 {
        self.header_offset + BLOCK_SIZE as u64
    }

    /// Offset where the next header would start, if representable
    pub fn next_header_offset(&self) -> Option<u64> {
        padded_size(self.size)?.checked_add(self.data_offset())
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path={:?} kind={} offset={} size={} mode={:o}",
            self.path,
            self.kind,
            self.header_offset,
            self.size,
            self.mode.bits()
        )
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
