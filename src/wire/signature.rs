// Block signature list framing.
//
// Layout, little-endian throughout:
//
//   u32 block_count
//   repeated block_count times:
//     16 bytes  strong_hash
//     u32       length
//     u32       offset      (truncated to 32 bits on the wire)
//     u32       checksum
//
// Fixed format, no version field. Reading fails with a short-read fault
// when fewer records are available than the count declares.

use std::io::{Read, Write};

use crate::error::Result;
use crate::signature::BlockSignature;
use crate::wire::{read_exact_or_short, read_u32, write_u32};

/// Serialize an ordered signature list.
///
/// Offsets at or above 2^32 lose their high bits on the wire; round-trip
/// equality holds for offsets below that.
pub fn write_signatures<W: Write>(blocks: &[BlockSignature], out: &mut W) -> Result<()> {
    write_u32(out, blocks.len() as u32)?;
    for block in blocks {
        out.write_all(&block.strong_hash)?;
        write_u32(out, block.length)?;
        write_u32(out, block.offset as u32)?;
        write_u32(out, block.checksum)?;
    }
    Ok(())
}

/// Deserialize a signature list written by `write_signatures`.
pub fn read_signatures<R: Read>(input: &mut R) -> Result<Vec<BlockSignature>> {
    let count = read_u32(input)?;
    let mut blocks = Vec::with_capacity(count.min(1 << 16) as usize);
    for _ in 0..count {
        let mut strong_hash = [0u8; 16];
        read_exact_or_short(input, &mut strong_hash)?;
        let length = read_u32(input)?;
        let offset = read_u32(input)? as u64;
        let checksum = read_u32(input)?;
        blocks.push(BlockSignature {
            strong_hash,
            checksum,
            offset,
            length,
        });
    }
    Ok(blocks)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample(n: u32) -> Vec<BlockSignature> {
        (0..n)
            .map(|i| BlockSignature {
                strong_hash: [i as u8; 16],
                checksum: i,
                offset: i as u64 * 2,
                length: i * 3,
            })
            .collect()
    }

    #[test]
    fn roundtrip_preserves_every_field() {
        let blocks = sample(5);
        let mut wire = Vec::new();
        write_signatures(&blocks, &mut wire).unwrap();
        let back = read_signatures(&mut Cursor::new(wire)).unwrap();
        assert_eq!(back, blocks);
    }

    #[test]
    fn record_size_is_28_bytes_plus_count() {
        let blocks = sample(5);
        let mut wire = Vec::new();
        write_signatures(&blocks, &mut wire).unwrap();
        assert_eq!(wire.len(), 4 + 5 * 28);
    }

    #[test]
    fn count_prefix_is_written_first() {
        let blocks = sample(5);
        let mut wire = Vec::new();
        write_signatures(&blocks, &mut wire).unwrap();
        assert_eq!(u32::from_le_bytes(wire[..4].try_into().unwrap()), 5);
    }

    #[test]
    fn empty_list_roundtrips() {
        let mut wire = Vec::new();
        write_signatures(&[], &mut wire).unwrap();
        assert_eq!(wire, [0, 0, 0, 0]);
        assert!(read_signatures(&mut Cursor::new(wire)).unwrap().is_empty());
    }

    #[test]
    fn truncated_stream_is_short_read() {
        let blocks = sample(3);
        let mut wire = Vec::new();
        write_signatures(&blocks, &mut wire).unwrap();
        wire.truncate(wire.len() - 5);
        assert!(matches!(
            read_signatures(&mut Cursor::new(wire)),
            Err(crate::error::Error::ShortRead { .. })
        ));
    }

    #[test]
    fn offset_truncates_to_32_bits() {
        let block = BlockSignature {
            strong_hash: [9; 16],
            checksum: 1,
            offset: (1u64 << 32) | 7,
            length: 8,
        };
        let mut wire = Vec::new();
        write_signatures(std::slice::from_ref(&block), &mut wire).unwrap();
        let back = read_signatures(&mut Cursor::new(wire)).unwrap();
        assert_eq!(back[0].offset, 7);
    }
}
