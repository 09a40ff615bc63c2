use core::error;
use core::fmt::{Display, Formatter, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Stored header checksum does not match the block contents
    Checksum {
        offset: u64,
        stored: u32,
        computed: u32,
    },
    Overflow,
    /// The stream ended in the middle of a block
    ShortRead { offset: u64 },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> Result {
        use Error::*;

        match self {
            Checksum {
                offset,
                stored,
                computed,
            } => write!(
                f,
                "Invalid checksum at offset {}: stored {:o}, computed {:o}",
                offset, stored, computed
            ),
            Overflow => write!(f, "Overflow"),
            ShortRead { offset } => write!(f, "Short read at offset {}", offset),
        }
    }
}

impl error::Error for Error {}
