// Block signature generation.
//
// The receiver describes its copy of a file as an ordered list of
// fixed-size block signatures (last block may be short, never empty).
// The sender's matcher later uses the weak checksum for cheap candidate
// lookup and the strong hash for confirmation.

use std::io::Read;

use crate::error::{Error, Result};
use crate::hash::rolling::RollingChecksum;
use crate::hash::strong::StrongHash;

/// Signature of one block of the receiver's file.
///
/// Offsets are monotonically non-decreasing and non-overlapping in the
/// order produced; the list order is the stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSignature {
    /// 128-bit strong digest of the block content.
    pub strong_hash: [u8; 16],
    /// Weak rolling checksum of the block content.
    pub checksum: u32,
    /// Byte offset of the block in the receiver's file.
    pub offset: u64,
    /// Block length; equals the block size except possibly for the last block.
    pub length: u32,
}

/// Chunks a stream into fixed-size blocks and signs each one.
pub struct SignatureGenerator<H> {
    hasher: H,
    block_size: usize,
}

impl<H: StrongHash> SignatureGenerator<H> {
    /// Create a generator for `block_size`-byte blocks.
    pub fn new(hasher: H, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidArgument("block size must be greater than zero"));
        }
        if block_size > u32::MAX as usize {
            return Err(Error::InvalidArgument("block size exceeds u32::MAX"));
        }
        Ok(Self { hasher, block_size })
    }

    /// Lazily sign `input` block by block.
    ///
    /// The returned iterator is single-pass and reads one block ahead of
    /// each item it yields; iterating it fully consumes the stream.
    pub fn signatures<R: Read>(&self, input: R) -> Signatures<'_, R, H> {
        Signatures {
            hasher: &self.hasher,
            reader: input,
            buf: vec![0; self.block_size],
            offset: 0,
            done: false,
        }
    }
}

/// Lazy, single-pass signature sequence over a stream.
pub struct Signatures<'a, R, H> {
    hasher: &'a H,
    reader: R,
    buf: Vec<u8>,
    offset: u64,
    done: bool,
}

impl<R: Read, H: StrongHash> Iterator for Signatures<'_, R, H> {
    type Item = Result<BlockSignature>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let read = match read_block(&mut self.reader, &mut self.buf) {
            Ok(0) => {
                self.done = true;
                return None;
            }
            Ok(n) => n,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        let block = &self.buf[..read];
        let sig = BlockSignature {
            strong_hash: self.hasher.digest(block),
            checksum: RollingChecksum::checksum_of(block),
            offset: self.offset,
            length: read as u32,
        };
        self.offset += read as u64;
        Some(Ok(sig))
    }
}

/// Fill `buf` from `reader`, tolerating short reads; returns bytes read,
/// which is less than `buf.len()` only at end-of-stream.
fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
