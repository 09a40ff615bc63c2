use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::slice::Iter;

use crate::Entry;

/// Name lookup over the entries of one archive, in scan order.
///
/// Names need not be unique in a tar archive. The first occurrence of a name
/// shadows any later one.
#[derive(Clone, Debug, Default)]
pub struct Index {
    entries: Vec<Entry>,
    by_path: BTreeMap<String, usize>,
}

impl Index {
    pub fn new(entries: Vec<Entry>) -> Index {
        let mut by_path = BTreeMap::new();
        for (i, entry) in entries.iter().enumerate() {
            by_path.entry(String::from(entry.path())).or_insert(i);
        }
        Index { entries, by_path }
    }

    /// Exact match on the logical name
    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.by_path.get(path).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Entry> for Index {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Index {
        Index::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Index {
    type Item = &'a Entry;
    type IntoIter = Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::test::{archive, sample};
    use crate::{ArchiveSrc, EntryKind, Index};

    #[test]
    fn lookup() {
        let index = Index::new(sample().read_entries().unwrap());
        assert_eq!(index.len(), 3);
        assert!(index.contains("notes.txt"));
        assert_eq!(index.get("docs").unwrap().kind(), EntryKind::Directory);
        assert_eq!(index.get("docs/readme").unwrap().size(), 33);
        assert!(index.get("missing").is_none());
        // no normalisation of separators
        assert!(index.get("/notes.txt").is_none());
        assert!(index.get("docs/").is_none());
    }

    #[test]
    fn first_occurrence_wins() {
        let mut data = archive(&[
            ("dup", b'0', &b"first"[..]),
            ("other", b'0', &b"x"[..]),
            ("dup", b'0', &b"second!"[..]),
        ]);
        let index: Index = data.read_entries().unwrap().into_iter().collect();
        assert_eq!(index.len(), 3);

        let dup = index.get("dup").unwrap();
        assert_eq!(dup.size(), 5);
        assert_eq!(dup.header_offset(), 0);
    }

    #[test]
    fn scan_order() {
        let index = Index::new(sample().read_entries().unwrap());
        let paths: Vec<&str> = index.iter().map(|e| e.path()).collect();
        assert_eq!(paths, ["notes.txt", "docs", "docs/readme"]);
        assert_eq!((&index).into_iter().count(), 3);
    }

    #[test]
    fn empty() {
        let index = Index::default();
        assert!(index.is_empty());
        assert!(index.get("").is_none());
    }
}
