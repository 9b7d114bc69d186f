// Sliding window over a forward-only byte stream.
//
// Decouples the matching scan from raw stream reads: the scan needs
// byte-level slides, and issuing one read per slide would be ruinous.
// The window owns a buffer of `window + padding` bytes; `advance` shifts
// the valid region left and refills with at most one read, sized to the
// remaining buffer capacity, so a padding of at least one block amortizes
// reads across the common single-byte-advance loop.
//
// The window fills lazily: the first access performs the warm-up read.
// Once the stream returns zero bytes the window is permanently exhausted
// and drains as the scan advances past the tail.

use std::io::Read;

use crate::error::{Error, Result};

/// Buffered view of the next `window` bytes of a stream.
pub struct SlidingWindow<R> {
    reader: R,
    buf: Vec<u8>,
    window: usize,
    valid: usize,
    position: u64,
    primed: bool,
    exhausted: bool,
}

impl<R: Read> SlidingWindow<R> {
    /// Window without read-ahead padding.
    pub fn new(reader: R, window: usize) -> Result<Self> {
        Self::with_padding(reader, window, 0)
    }

    /// Window with `padding` bytes of read-ahead beyond the window proper.
    pub fn with_padding(reader: R, window: usize, padding: usize) -> Result<Self> {
        if window == 0 {
            return Err(Error::InvalidArgument("window size must be greater than zero"));
        }
        Ok(Self {
            reader,
            buf: vec![0; window + padding],
            window,
            valid: 0,
            position: 0,
            primed: false,
            exhausted: false,
        })
    }

    /// Absolute stream offset of the first byte in the window.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The valid window contents: `min(window, valid)` bytes. Shorter than
    /// the window size only near end-of-stream.
    pub fn buffer(&mut self) -> Result<&[u8]> {
        self.warm_up()?;
        Ok(&self.buf[..self.window.min(self.valid)])
    }

    /// Byte at logical offset `i` within the window.
    pub fn byte_at(&mut self, i: usize) -> Result<u8> {
        if i >= self.window {
            return Err(Error::IndexOutOfRange {
                index: i,
                limit: self.window,
            });
        }
        self.warm_up()?;
        if i >= self.valid {
            return Err(Error::IndexOutOfRange {
                index: i,
                limit: self.valid,
            });
        }
        Ok(self.buf[i])
    }

    /// Count of valid bytes currently visible through the window.
    pub fn available(&mut self) -> Result<usize> {
        self.warm_up()?;
        Ok(self.window.min(self.valid))
    }

    /// Shift the window forward by `n` bytes and refill from the stream.
    ///
    /// Refills with at most one read, never requesting more than the
    /// buffer's remaining capacity. Advancing past end-of-stream saturates:
    /// the window empties rather than erroring.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(Error::InvalidArgument("advance must move at least one byte"));
        }
        self.warm_up()?;
        if n >= self.valid {
            let skip = (n - self.valid) as u64;
            self.valid = 0;
            if skip > 0 && !self.exhausted {
                self.discard(skip)?;
            }
        } else {
            self.buf.copy_within(n..self.valid, 0);
            self.valid -= n;
        }
        self.position += n as u64;
        if !self.exhausted && self.valid < self.window {
            self.fill()?;
        }
        Ok(())
    }

    /// First read, filling the whole buffer. Idempotent.
    fn warm_up(&mut self) -> Result<()> {
        if self.primed {
            return Ok(());
        }
        self.primed = true;
        self.fill()
    }

    /// Drop `skip` bytes the window jumped over without buffering them.
    fn discard(&mut self, skip: u64) -> Result<()> {
        let dropped = std::io::copy(
            &mut (&mut self.reader).take(skip),
            &mut std::io::sink(),
        )?;
        if dropped < skip {
            self.exhausted = true;
        }
        Ok(())
    }

    /// One read into the unused tail of the buffer.
    fn fill(&mut self) -> Result<()> {
        debug_assert!(self.valid < self.buf.len());
        let n = loop {
            match self.reader.read(&mut self.buf[self.valid..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if n == 0 {
            self.exhausted = true;
        }
        self.valid += n;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Cursor;
    use std::rc::Rc;

    /// Read-call observations shared with the test body.
    #[derive(Clone, Default)]
    struct ReadProbe {
        reads: Rc<Cell<usize>>,
        max_request: Rc<Cell<usize>>,
    }

    impl ReadProbe {
        fn reads(&self) -> usize {
            self.reads.get()
        }

        fn max_request(&self) -> usize {
            self.max_request.get()
        }

        fn reset_max_request(&self) {
            self.max_request.set(0);
        }
    }

    /// Reader that records calls in a `ReadProbe` and caps each read at
    /// `chunk` bytes.
    struct ChunkedReader {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
        probe: ReadProbe,
    }

    impl ChunkedReader {
        fn new(data: Vec<u8>, chunk: usize) -> (Self, ReadProbe) {
            let probe = ReadProbe::default();
            (
                Self {
                    data,
                    pos: 0,
                    chunk,
                    probe: probe.clone(),
                },
                probe,
            )
        }
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.probe.reads.set(self.probe.reads.get() + 1);
            self.probe
                .max_request
                .set(self.probe.max_request.get().max(buf.len()));
            let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn descending(len: usize) -> Vec<u8> {
        (0..len).map(|i| (200usize.wrapping_sub(i)) as u8).collect()
    }

    #[test]
    fn zero_window_rejected() {
        assert!(matches!(
            SlidingWindow::new(Cursor::new(vec![]), 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn construction_reads_nothing() {
        let (reader, probe) = ChunkedReader::new(descending(200), usize::MAX);
        let _w = SlidingWindow::new(reader, 100).unwrap();
        assert_eq!(probe.reads(), 0);
    }

    #[test]
    fn first_access_triggers_warm_up() {
        let (reader, probe) = ChunkedReader::new(descending(200), usize::MAX);
        let mut w = SlidingWindow::new(reader, 100).unwrap();
        let buf = w.buffer().unwrap();
        assert_eq!(buf.len(), 100);
        assert_eq!(buf, &descending(200)[..100]);
        assert_eq!(probe.reads(), 1);
    }

    #[test]
    fn buffer_len_matches_available() {
        let data = descending(50);
        let mut w = SlidingWindow::new(Cursor::new(data), 100).unwrap();
        let available = w.available().unwrap();
        assert_eq!(available, 50);
        assert_eq!(w.buffer().unwrap().len(), available);
    }

    #[test]
    fn short_warm_up_read_reports_short_window() {
        // A single warm-up read capped at 50 bytes leaves a short window.
        let (reader, _probe) = ChunkedReader::new(descending(200), 50);
        let mut w = SlidingWindow::new(reader, 100).unwrap();
        assert_eq!(w.available().unwrap(), 50);
    }

    #[test]
    fn byte_at_retrieves_correct_byte() {
        let data = descending(100);
        let mut w = SlidingWindow::new(Cursor::new(data.clone()), 100).unwrap();
        assert_eq!(w.byte_at(5).unwrap(), data[5]);
    }

    #[test]
    fn byte_at_rejects_index_at_window() {
        let mut w = SlidingWindow::new(Cursor::new(descending(200)), 100).unwrap();
        assert!(matches!(
            w.byte_at(100),
            Err(Error::IndexOutOfRange { index: 100, limit: 100 })
        ));
    }

    #[test]
    fn advance_shifts_byte_indexing() {
        let data = descending(200);
        let mut w = SlidingWindow::new(Cursor::new(data.clone()), 100).unwrap();
        assert_eq!(w.byte_at(5).unwrap(), data[5]);
        w.advance(1).unwrap();
        w.advance(3).unwrap();
        assert_eq!(w.byte_at(5).unwrap(), data[9]);
        assert_eq!(w.position(), 4);
    }

    #[test]
    fn advance_zero_rejected() {
        let mut w = SlidingWindow::new(Cursor::new(descending(200)), 100).unwrap();
        assert!(matches!(w.advance(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn advance_without_padding_reads_every_time() {
        let (reader, probe) = ChunkedReader::new(descending(200), usize::MAX);
        let mut w = SlidingWindow::new(reader, 100).unwrap();
        w.buffer().unwrap();
        w.advance(1).unwrap();
        w.byte_at(0).unwrap();
        assert_eq!(probe.reads(), 2);
    }

    #[test]
    fn padding_absorbs_small_advances() {
        let (reader, probe) = ChunkedReader::new(descending(200), usize::MAX);
        let mut w = SlidingWindow::with_padding(reader, 100, 3).unwrap();
        w.buffer().unwrap();
        w.advance(1).unwrap();
        w.advance(1).unwrap();
        w.advance(1).unwrap();
        w.byte_at(0).unwrap();
        assert_eq!(probe.reads(), 1);
    }

    #[test]
    fn refill_never_requests_beyond_capacity() {
        let (reader, probe) = ChunkedReader::new(descending(400), usize::MAX);
        let mut w = SlidingWindow::with_padding(reader, 100, 100).unwrap();
        w.buffer().unwrap();
        probe.reset_max_request();
        w.advance(101).unwrap();
        w.advance(1).unwrap();
        // valid was 99 after the jump, so the refill may request at most
        // window + padding - valid = 101 bytes.
        assert!(probe.max_request() <= 101);
    }

    #[test]
    fn advance_to_end_of_stream_empties_window() {
        let data = descending(20);
        let mut w = SlidingWindow::with_padding(Cursor::new(data), 10, 10).unwrap();
        w.buffer().unwrap();
        w.advance(20).unwrap();
        assert_eq!(w.available().unwrap(), 0);
        assert!(w.buffer().unwrap().is_empty());
    }

    #[test]
    fn advance_past_end_of_stream_saturates() {
        let data = descending(20);
        let mut w = SlidingWindow::with_padding(Cursor::new(data), 10, 10).unwrap();
        w.buffer().unwrap();
        w.advance(21).unwrap();
        assert_eq!(w.available().unwrap(), 0);
    }

    #[test]
    fn window_shrinks_below_window_size_at_tail() {
        let data = descending(20);
        let mut w = SlidingWindow::with_padding(Cursor::new(data), 10, 10).unwrap();
        w.buffer().unwrap();
        w.advance(11).unwrap();
        assert_eq!(w.available().unwrap(), 9);
    }

    #[test]
    fn jump_beyond_buffered_bytes_lands_at_right_offset() {
        let data = descending(200);
        let mut w = SlidingWindow::new(Cursor::new(data.clone()), 10).unwrap();
        w.buffer().unwrap();
        // Only 10 bytes are buffered; jumping 25 must discard 15 more.
        w.advance(25).unwrap();
        assert_eq!(w.position(), 25);
        assert_eq!(w.byte_at(0).unwrap(), data[25]);
    }

    #[test]
    fn exhaustion_is_permanent() {
        let (reader, probe) = ChunkedReader::new(descending(20), usize::MAX);
        let mut w = SlidingWindow::new(reader, 10).unwrap();
        w.buffer().unwrap();
        w.advance(10).unwrap();
        w.advance(10).unwrap();
        let reads_at_exhaustion = probe.reads();
        w.advance(1).unwrap();
        w.advance(1).unwrap();
        assert_eq!(probe.reads(), reads_at_exhaustion);
        assert_eq!(w.available().unwrap(), 0);
    }
}
