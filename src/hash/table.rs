// Checksum lookup table for delta matching.
//
// Maps each weak checksum to the receiver blocks that carry it. Collisions
// are expected: several blocks may share a checksum, and an unrelated
// window may alias one. Both cases are resolved downstream by strong-hash
// plus length verification, so buckets keep every candidate, in receiver
// block order (the matcher's tie-break is first-verified-in-that-order).
//
// Built once per `DeltaGenerator::initialize`, read-only while scanning.

use std::collections::HashMap;

use crate::signature::BlockSignature;

/// Index of receiver block signatures keyed by weak checksum.
pub struct ChecksumIndex {
    blocks: Vec<BlockSignature>,
    by_checksum: HashMap<u32, Vec<u32>>,
}

impl ChecksumIndex {
    /// Index `blocks`, preserving their order within each checksum bucket.
    pub fn new(blocks: Vec<BlockSignature>) -> Self {
        let mut by_checksum: HashMap<u32, Vec<u32>> = HashMap::with_capacity(blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            by_checksum.entry(block.checksum).or_default().push(i as u32);
        }
        Self {
            blocks,
            by_checksum,
        }
    }

    /// Candidate blocks carrying `checksum`, in receiver block order.
    /// Empty when the checksum is unknown.
    #[inline]
    pub fn candidates(&self, checksum: u32) -> &[u32] {
        self.by_checksum
            .get(&checksum)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The signature at `index` (as returned by `candidates`).
    #[inline]
    pub fn block(&self, index: u32) -> &BlockSignature {
        &self.blocks[index as usize]
    }

    /// Number of indexed blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(checksum: u32, offset: u64) -> BlockSignature {
        BlockSignature {
            strong_hash: [0; 16],
            checksum,
            offset,
            length: 8,
        }
    }

    #[test]
    fn lookup_hit_and_miss() {
        let index = ChecksumIndex::new(vec![sig(7, 0), sig(9, 8)]);
        assert_eq!(index.candidates(7), &[0]);
        assert_eq!(index.candidates(9), &[1]);
        assert!(index.candidates(1234).is_empty());
    }

    #[test]
    fn colliding_checksums_keep_insertion_order() {
        let index = ChecksumIndex::new(vec![sig(5, 0), sig(6, 8), sig(5, 16), sig(5, 24)]);
        assert_eq!(index.candidates(5), &[0, 2, 3]);
        assert_eq!(index.block(2).offset, 16);
    }

    #[test]
    fn empty_index() {
        let index = ChecksumIndex::new(Vec::new());
        assert!(index.is_empty());
        assert!(index.candidates(0).is_empty());
    }
}
