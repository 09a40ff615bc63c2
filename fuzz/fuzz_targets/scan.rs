#![no_main]
use libfuzzer_sys::fuzz_target;
use tarfs_core::{ArchiveSrc, Entry, Header, BLOCK_SIZE};

fuzz_target!(|data: &[u8]| {
    let block: Option<&[u8; BLOCK_SIZE]> = data.get(..BLOCK_SIZE).and_then(|block| block.try_into().ok());
    if let Some(block) = block {
        let header = Header::from_block(block);
        let _entry = Entry::from_header(header, 0);
        let _ok = header.checksum_ok();
    }

    let mut src = data;
    if let Ok(entries) = src.read_entries() {
        let mut buf = [0; 64];
        for entry in &entries {
            let _result = src.read_entry(entry, 0, &mut buf);
        }
    }
});
