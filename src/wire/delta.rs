// Delta record stream: framing, send, and receive.
//
// Record layout, little-endian:
//
//   byte  marker          'N' = literal, 'C' = copy
//   -- literal --
//   u32   length
//   <length> bytes        payload, taken from the sender's data stream
//   -- copy --
//   i64   offset          position in the receiver's reference file
//   u32   length
//
// `send` turns a delta sequence plus the sender's data stream into the
// record stream; `receive` turns the record stream plus the receiver's
// reference file back into the reconstructed output. Literal payloads are
// moved in chunks bounded by the streamer's chunk size so a large run
// never needs a matching allocation.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::delta::Delta;
use crate::error::{Error, Result};
use crate::wire::{read_i64, read_u32, write_i64, write_u32};

/// Marker byte opening a literal record.
pub const LITERAL_MARKER: u8 = b'N';
/// Marker byte opening a copy record.
pub const COPY_MARKER: u8 = b'C';

/// Default granularity for moving literal payload bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 16384;

// ---------------------------------------------------------------------------
// Data source capability
// ---------------------------------------------------------------------------

/// A byte stream with optional random access.
///
/// `send` repositions the sender's data stream per literal and skips it
/// past copy-covered ranges; `receive` repositions the receiver's
/// reference file per copy. Sources that cannot seek fail those calls at
/// runtime with a not-seekable fault instead of ruling themselves out at
/// the type level, because a delta sequence with no copy records is
/// perfectly servable from a forward-only source.
pub trait DataSource {
    /// Read up to `buf.len()` bytes from the current position.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Reposition to an absolute offset.
    fn seek_to(&mut self, offset: u64) -> Result<u64>;

    /// Advance the cursor `len` bytes without transferring data.
    fn skip(&mut self, len: u64) -> Result<u64>;
}

impl<T: Read + Seek> DataSource for T {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Read::read(self, buf)
    }

    fn seek_to(&mut self, offset: u64) -> Result<u64> {
        Ok(self.seek(SeekFrom::Start(offset))?)
    }

    fn skip(&mut self, len: u64) -> Result<u64> {
        let len = i64::try_from(len)
            .map_err(|_| Error::InvalidArgument("skip length exceeds i64::MAX"))?;
        Ok(self.seek(SeekFrom::Current(len))?)
    }
}

/// Wrapper declaring a reader forward-only: reads pass through, seeks
/// fail with a not-seekable fault.
pub struct ForwardOnly<R>(pub R);

impl<R: Read> DataSource for ForwardOnly<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }

    fn seek_to(&mut self, _offset: u64) -> Result<u64> {
        Err(Error::NotSeekable("forward-only stream"))
    }

    fn skip(&mut self, _len: u64) -> Result<u64> {
        Err(Error::NotSeekable("forward-only stream"))
    }
}

// ---------------------------------------------------------------------------
// Streamer
// ---------------------------------------------------------------------------

/// Writes and reads the delta record stream.
#[derive(Debug, Clone)]
pub struct DeltaStreamer {
    chunk_size: usize,
}

impl Default for DeltaStreamer {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl DeltaStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Streamer with a custom literal-copy granularity.
    pub fn with_chunk_size(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidArgument("chunk size must be greater than zero"));
        }
        Ok(Self { chunk_size })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Serialize `deltas`, pulling literal payloads from `data`.
    ///
    /// The data stream's cursor is kept consistent with the sender's read
    /// position: literals reposition it to their own offset, copies skip
    /// it forward by their length. Any fault aborts mid-stream and leaves
    /// `output` truncated; the caller must discard it.
    pub fn send<D, W>(&self, deltas: &[Delta], data: &mut D, output: &mut W) -> Result<()>
    where
        D: DataSource,
        W: Write,
    {
        if deltas.is_empty() {
            return Err(Error::InvalidArgument("delta sequence must not be empty"));
        }
        for delta in deltas {
            match *delta {
                Delta::Literal { offset, length } => {
                    data.seek_to(offset)?;
                    output.write_all(&[LITERAL_MARKER])?;
                    write_u32(output, length)?;
                    self.copy_bytes(&mut SourceReader(&mut *data), output, length as u64)?;
                }
                Delta::Copy { offset, length } => {
                    data.skip(length as u64)?;
                    output.write_all(&[COPY_MARKER])?;
                    write_i64(output, offset as i64)?;
                    write_u32(output, length)?;
                }
            }
        }
        Ok(())
    }

    /// Reconstruct output from a delta record stream and the receiver's
    /// reference file. Terminates at end-of-stream on `delta_stream`.
    pub fn receive<D, S, W>(&self, delta_stream: &mut D, reference: &mut S, output: &mut W) -> Result<()>
    where
        D: Read,
        S: DataSource,
        W: Write,
    {
        while let Some(marker) = read_marker(delta_stream)? {
            match marker {
                LITERAL_MARKER => {
                    let length = read_u32(delta_stream)?;
                    self.copy_bytes(delta_stream, output, length as u64)?;
                }
                COPY_MARKER => {
                    let offset = read_i64(delta_stream)?;
                    let length = read_u32(delta_stream)?;
                    let offset = u64::try_from(offset).map_err(|_| {
                        Error::CorruptDelta(format!("copy record with negative offset {offset}"))
                    })?;
                    reference.seek_to(offset)?;
                    self.copy_bytes(&mut SourceReader(&mut *reference), output, length as u64)?;
                }
                other => {
                    return Err(Error::CorruptDelta(format!(
                        "unknown record marker {other:#04x}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Move exactly `length` bytes from `input` to `output` in
    /// chunk-size-bounded reads. A dry source is a short-read fault.
    fn copy_bytes<R: Read, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
        length: u64,
    ) -> Result<()> {
        if length == 0 {
            return Ok(());
        }
        let mut buf = vec![0u8; self.chunk_size.min(length as usize)];
        let mut moved: u64 = 0;
        while moved < length {
            let want = buf.len().min((length - moved) as usize);
            let n = match input.read(&mut buf[..want]) {
                Ok(0) => {
                    return Err(Error::ShortRead {
                        expected: length,
                        actual: moved,
                    });
                }
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            output.write_all(&buf[..n])?;
            moved += n as u64;
        }
        Ok(())
    }
}

/// Adapts a `DataSource` to `Read` for the chunked copy loop.
struct SourceReader<'a, D>(&'a mut D);

impl<D: DataSource> Read for SourceReader<'_, D> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

/// Next record marker, or `None` at end-of-stream.
fn read_marker<R: Read>(input: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
