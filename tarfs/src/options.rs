/// Marker that routes a path into the loaded archive, as in `@/notes.txt`
pub const DEFAULT_PREFIX: char = '@';

/// How a seek relative to the end treats a positive offset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeekEndPolicy {
    /// The target wraps around modulo `len + 1`, so `seek(3, End)` on a
    /// 10 byte file lands on 2. Matches the historical behavior.
    #[default]
    Wrap,
    /// Targets past the end fail with [`Error::SeekOutOfRange`](crate::Error::SeekOutOfRange)
    Strict,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Paths starting with this character followed by `/` are archive paths
    pub prefix: char,
    pub seek_end: SeekEndPolicy,
    /// Reject archives with a header whose checksum does not match
    pub verify_checksums: bool,
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    pub fn prefix(mut self, prefix: char) -> Options {
        self.prefix = prefix;
        self
    }

    pub fn seek_end(mut self, policy: SeekEndPolicy) -> Options {
        self.seek_end = policy;
        self
    }

    pub fn verify_checksums(mut self, verify: bool) -> Options {
        self.verify_checksums = verify;
        self
    }
}

impl Default for Options {
    fn default() -> Options {
        Options {
            prefix: DEFAULT_PREFIX,
            seek_end: SeekEndPolicy::Wrap,
            verify_checksums: false,
        }
    }
}
