// The matching engine.
//
// Scans the sender's stream through a sliding window one block wide,
// looking up the window's weak checksum in the index built from the
// receiver's block signatures. A candidate only matches if the window
// still holds at least `candidate.length` valid bytes and the strong
// hash of those bytes equals the candidate's; the first candidate to
// verify wins, in receiver block order. A verified match emits a copy
// reference and jumps the window a whole block, which invalidates the
// incremental checksum, so the next window is re-primed with a full
// recomputation. A miss moves a single byte into the pending literal
// run and slides the window by one, updating the checksum in O(1).
//
// Consecutive misses coalesce into one growing literal; the run is cut
// only by the next match or by end-of-stream.

use std::io::Read;

use crate::delta::{Delta, RunningStats};
use crate::error::{Error, Result};
use crate::hash::rolling::RollingChecksum;
use crate::hash::strong::StrongHash;
use crate::hash::table::ChecksumIndex;
use crate::signature::BlockSignature;
use crate::window::SlidingWindow;

/// Computes the delta sequence between a signed receiver file and a
/// sender stream.
pub struct DeltaGenerator<H> {
    hasher: H,
    stats: RunningStats,
    scan: Option<ScanConfig>,
}

struct ScanConfig {
    block_size: usize,
    index: ChecksumIndex,
}

impl<H: StrongHash> DeltaGenerator<H> {
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            stats: RunningStats::default(),
            scan: None,
        }
    }

    /// Build the checksum index from the receiver's signatures.
    ///
    /// An empty signature list is valid and means the receiver has
    /// nothing: every sender byte will be literal.
    pub fn initialize(&mut self, block_size: usize, signatures: Vec<BlockSignature>) -> Result<()> {
        if block_size == 0 {
            return Err(Error::InvalidArgument("block size must be greater than zero"));
        }
        let index = ChecksumIndex::new(signatures);
        log::debug!(
            "delta generator: indexed {} signatures, block size {}",
            index.len(),
            block_size
        );
        self.scan = Some(ScanConfig { block_size, index });
        Ok(())
    }

    /// Lazily compute the delta sequence for `reader`.
    ///
    /// The returned iterator is single-pass and not restartable; it pulls
    /// from the stream as items are requested. Fails if `initialize` has
    /// not been called.
    pub fn deltas<R: Read>(&mut self, reader: R) -> Result<Deltas<'_, R, H>> {
        let scan = self
            .scan
            .as_ref()
            .ok_or(Error::InvalidState("deltas requested before initialize"))?;
        self.stats = RunningStats::default();
        let window = SlidingWindow::with_padding(reader, scan.block_size, scan.block_size)?;
        Ok(Deltas {
            hasher: &self.hasher,
            index: &scan.index,
            stats: &mut self.stats,
            window,
            checksum: RollingChecksum::new(),
            block_size: scan.block_size,
            pending_start: 0,
            pending_len: 0,
            queued: None,
            primed: false,
            done: false,
        })
    }

    /// Counters from the most recent scan.
    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }
}

/// Lazy delta sequence over a sender stream.
pub struct Deltas<'a, R, H> {
    hasher: &'a H,
    index: &'a ChecksumIndex,
    stats: &'a mut RunningStats,
    window: SlidingWindow<R>,
    checksum: RollingChecksum,
    block_size: usize,
    pending_start: u64,
    pending_len: u64,
    queued: Option<Delta>,
    primed: bool,
    done: bool,
}

impl<R: Read, H: StrongHash> Deltas<'_, R, H> {
    fn take_pending(&mut self) -> Option<Delta> {
        if self.pending_len == 0 {
            return None;
        }
        let literal = Delta::Literal {
            offset: self.pending_start,
            length: self.pending_len as u32,
        };
        self.pending_len = 0;
        Some(literal)
    }

    /// Find the first verified candidate for the current window, in
    /// receiver block order. Returns its copy target.
    fn find_match(&mut self, available: usize) -> Result<Option<(u64, u32)>> {
        let value = self.checksum.value();
        for &ci in self.index.candidates(value) {
            let sig = self.index.block(ci);
            let len = sig.length as usize;
            if len == 0 || len > available {
                continue;
            }
            let (strong_hash, offset, length) = (sig.strong_hash, sig.offset, sig.length);
            let buf = self.window.buffer()?;
            if self.hasher.digest(&buf[..len]) == strong_hash {
                return Ok(Some((offset, length)));
            }
        }
        Ok(None)
    }

    fn scan_next(&mut self) -> Result<Option<Delta>> {
        if !self.primed {
            self.primed = true;
            let buf = self.window.buffer()?;
            self.checksum.reset_over(buf);
        }
        loop {
            let available = self.window.available()?;
            if available == 0 {
                return Ok(self.take_pending());
            }

            if let Some((offset, length)) = self.find_match(available)? {
                self.stats.matched_bytes += length as u64;
                self.stats.matched_blocks += 1;
                let pending = self.take_pending();
                self.window.advance(length as usize)?;
                // The jump invalidated the incremental state.
                let buf = self.window.buffer()?;
                self.checksum.reset_over(buf);
                let copy = Delta::Copy { offset, length };
                return match pending {
                    Some(literal) => {
                        self.queued = Some(copy);
                        Ok(Some(literal))
                    }
                    None => Ok(Some(copy)),
                };
            }

            // Miss: the window's leading byte joins the pending literal.
            let outgoing = self.window.byte_at(0)?;
            if self.pending_len == 0 {
                self.pending_start = self.window.position();
            }
            self.pending_len += 1;
            self.stats.literal_bytes += 1;
            // Cut the run before it overflows the wire's 4-byte length.
            let run_full = self.pending_len == u32::MAX as u64;
            self.window.advance(1)?;
            if self.window.available()? >= self.block_size {
                let incoming = self.window.byte_at(self.block_size - 1)?;
                self.checksum.roll(outgoing, incoming);
            } else {
                // Shrinking tail window: no byte entered, recompute.
                let buf = self.window.buffer()?;
                self.checksum.reset_over(buf);
            }
            if run_full {
                return Ok(self.take_pending());
            }
        }
    }
}

impl<R: Read, H: StrongHash> Iterator for Deltas<'_, R, H> {
    type Item = Result<Delta>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(queued) = self.queued.take() {
            return Some(Ok(queued));
        }
        if self.done {
            return None;
        }
        match self.scan_next() {
            Ok(Some(delta)) => Some(Ok(delta)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
