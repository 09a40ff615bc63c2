//! Hand-built archives for unit tests
use alloc::format;
use alloc::vec::Vec;

use crate::{padded_size, BLOCK_SIZE, TERMINATOR_SIZE};

#[derive(Clone, Copy, PartialEq)]
pub enum Format {
    V7,
    Ustar,
}

pub const V7: Format = Format::V7;
pub const USTAR: Format = Format::Ustar;

pub const NOTES: &[u8] = b"0123456789";
pub const README: &[u8] = b"some random string file contents\n";

fn put_octal(field: &mut [u8], value: u64) {
    let width = field.len() - 1;
    let digits = format!("{:0width$o}", value, width = width);
    field[..width].copy_from_slice(digits.as_bytes());
    field[width] = 0;
}

fn put_str(field: &mut [u8], value: &str) {
    field[..value.len()].copy_from_slice(value.as_bytes());
}

/// A header block with a valid checksum
pub fn header_block(name: &str, typeflag: u8, size: u64, format: Format) -> [u8; BLOCK_SIZE] {
    let mut block = [0u8; BLOCK_SIZE];
    put_str(&mut block[0..100], name);
    put_octal(&mut block[100..108], 0o644);
    put_octal(&mut block[108..116], 1000);
    put_octal(&mut block[116..124], 100);
    put_octal(&mut block[124..136], size);
    put_octal(&mut block[136..148], 1_700_000_000);
    block[156] = typeflag;
    if format == USTAR {
        block[257..263].copy_from_slice(b"ustar\0");
        block[263..265].copy_from_slice(b"00");
        put_str(&mut block[265..297], "user");
        put_str(&mut block[297..329], "users");
    }

    block[148..156].fill(b' ');
    let sum: u32 = block.iter().map(|&b| u32::from(b)).sum();
    put_octal(&mut block[148..155], u64::from(sum));
    block
}

/// Append a member (header, data and padding) to `archive`
pub fn push_member(archive: &mut Vec<u8>, name: &str, typeflag: u8, data: &[u8]) {
    archive.extend_from_slice(&header_block(name, typeflag, data.len() as u64, USTAR));
    archive.extend_from_slice(data);
    let padded = padded_size(data.len() as u64).unwrap() as usize;
    archive.resize(archive.len() + padded - data.len(), 0);
}

pub fn terminate(archive: &mut Vec<u8>) {
    archive.resize(archive.len() + TERMINATOR_SIZE, 0);
}

/// `members` as (name, typeflag, data), followed by the terminator
pub fn archive(members: &[(&str, u8, &[u8])]) -> Vec<u8> {
    let mut archive = Vec::new();
    for (name, typeflag, data) in members {
        push_member(&mut archive, name, *typeflag, data);
    }
    terminate(&mut archive);
    archive
}

/// A small archive with two files and a directory
pub fn sample() -> Vec<u8> {
    archive(&[
        ("notes.txt", b'0', NOTES),
        ("docs", b'5', &b""[..]),
        ("docs/readme", b'0', README),
    ])
}
