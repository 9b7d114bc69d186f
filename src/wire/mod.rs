// Wire formats.
//
// Both formats are byte-exact, little-endian, fixed-width, and carry no
// version field:
//
// - `signature`: the receiver's ordered block signature list
// - `delta`: the delta record stream plus the send/receive machinery
//
// The helpers below read and write the fixed-width integers; a read that
// cannot produce the full width is a short-read fault, never a partial
// value.

use std::io::{Read, Write};

use crate::error::{Error, Result};

pub mod delta;
pub mod signature;

pub use delta::{DataSource, DeltaStreamer, ForwardOnly};
pub use signature::{read_signatures, write_signatures};

pub(crate) fn write_u32<W: Write>(out: &mut W, v: u32) -> Result<()> {
    out.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_i64<W: Write>(out: &mut W, v: i64) -> Result<()> {
    out.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_u32<R: Read>(input: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact_or_short(input, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_i64<R: Read>(input: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    read_exact_or_short(input, &mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

/// `read_exact` that reports how much actually arrived.
pub(crate) fn read_exact_or_short<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Error::ShortRead {
                    expected: buf.len() as u64,
                    actual: filled as u64,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn u32_roundtrip_is_little_endian() {
        let mut out = Vec::new();
        write_u32(&mut out, 0x0403_0201).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(read_u32(&mut Cursor::new(out)).unwrap(), 0x0403_0201);
    }

    #[test]
    fn i64_roundtrip_is_little_endian() {
        let mut out = Vec::new();
        write_i64(&mut out, 42).unwrap();
        assert_eq!(out, [42, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(read_i64(&mut Cursor::new(out)).unwrap(), 42);
    }

    #[test]
    fn truncated_integer_is_short_read() {
        let err = read_u32(&mut Cursor::new([1u8, 2])).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortRead { expected: 4, actual: 2 }
        ));
    }
}
