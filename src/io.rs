// File-level helpers for the signature/delta/patch pipeline.
//
// Wraps the streaming components with buffered file I/O:
//   - `signature_file`: sign the receiver's copy, write the signature wire
//   - `delta_file`: read a signature file, scan the sender's copy, write
//     the delta wire
//   - `patch_file`: apply a delta wire against the receiver's copy
//
// `delta_file` opens the sender's file twice: the scan and the literal
// payload reads each need their own cursor, and interleaving them on one
// handle would corrupt both.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::delta::generator::DeltaGenerator;
use crate::delta::{Delta, RunningStats};
use crate::error::Result;
use crate::hash::strong::StrongHash;
use crate::signature::{BlockSignature, SignatureGenerator};
use crate::wire::delta::DeltaStreamer;
use crate::wire::signature::{read_signatures, write_signatures};

/// Block size used when the caller does not choose one.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `signature_file`.
#[derive(Debug, Clone)]
pub struct SignatureStats {
    /// Input file size in bytes.
    pub input_size: u64,
    /// Number of blocks signed.
    pub block_count: u64,
    /// Signature output size in bytes.
    pub signature_size: u64,
}

/// Statistics returned by `delta_file`.
#[derive(Debug, Clone)]
pub struct DeltaFileStats {
    /// Sender file size in bytes.
    pub source_size: u64,
    /// Delta output size in bytes.
    pub delta_size: u64,
    /// Number of delta records written.
    pub record_count: u64,
    /// Scan counters (literal/matched bytes, match count).
    pub scan: RunningStats,
}

/// Statistics returned by `patch_file`.
#[derive(Debug, Clone)]
pub struct PatchStats {
    /// Delta input size in bytes.
    pub delta_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
}

// ---------------------------------------------------------------------------
// signature_file
// ---------------------------------------------------------------------------

/// Sign `input` block by block and write the signature wire to `sig_out`.
pub fn signature_file<H: StrongHash>(
    hasher: H,
    input: &Path,
    sig_out: &Path,
    block_size: usize,
) -> Result<SignatureStats> {
    let input_file = File::open(input)?;
    let input_size = input_file.metadata()?.len();
    let reader = BufReader::with_capacity(BUF_SIZE, input_file);

    let generator = SignatureGenerator::new(hasher, block_size)?;
    let blocks: Vec<BlockSignature> = generator.signatures(reader).collect::<Result<_>>()?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(sig_out)?);
    write_signatures(&blocks, &mut writer)?;
    writer.flush()?;

    let signature_size = std::fs::metadata(sig_out)?.len();
    log::debug!(
        "signed {}: {} blocks of {} bytes, signature {} bytes",
        input.display(),
        blocks.len(),
        block_size,
        signature_size
    );
    Ok(SignatureStats {
        input_size,
        block_count: blocks.len() as u64,
        signature_size,
    })
}

// ---------------------------------------------------------------------------
// delta_file
// ---------------------------------------------------------------------------

/// Scan `source` against the signatures in `sig_in` and write the delta
/// wire to `delta_out`.
///
/// An empty sender file produces an empty delta stream (zero records),
/// which `patch_file` reconstructs as an empty output.
pub fn delta_file<H: StrongHash>(
    hasher: H,
    sig_in: &Path,
    source: &Path,
    delta_out: &Path,
    block_size: usize,
    chunk_size: usize,
) -> Result<DeltaFileStats> {
    let mut sig_reader = BufReader::with_capacity(BUF_SIZE, File::open(sig_in)?);
    let signatures = read_signatures(&mut sig_reader)?;

    let scan_file = File::open(source)?;
    let source_size = scan_file.metadata()?.len();
    let scan_reader = BufReader::with_capacity(BUF_SIZE, scan_file);

    let mut generator = DeltaGenerator::new(hasher);
    generator.initialize(block_size, signatures)?;
    let deltas: Vec<Delta> = generator.deltas(scan_reader)?.collect::<Result<_>>()?;
    let scan = *generator.stats();
    scan.log_summary();

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(delta_out)?);
    if !deltas.is_empty() {
        let mut data = BufReader::with_capacity(BUF_SIZE, File::open(source)?);
        let streamer = DeltaStreamer::with_chunk_size(chunk_size)?;
        streamer.send(&deltas, &mut data, &mut writer)?;
    }
    writer.flush()?;

    let delta_size = std::fs::metadata(delta_out)?.len();
    Ok(DeltaFileStats {
        source_size,
        delta_size,
        record_count: deltas.len() as u64,
        scan,
    })
}

// ---------------------------------------------------------------------------
// patch_file
// ---------------------------------------------------------------------------

/// Reconstruct the sender's file from `delta_in` and the receiver's copy
/// at `reference`, writing to `output`.
pub fn patch_file(
    reference: &Path,
    delta_in: &Path,
    output: &Path,
    chunk_size: usize,
) -> Result<PatchStats> {
    let delta_file = File::open(delta_in)?;
    let delta_size = delta_file.metadata()?.len();
    let mut delta_reader = BufReader::with_capacity(BUF_SIZE, delta_file);

    let mut reference_file = File::open(reference)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output)?);

    let streamer = DeltaStreamer::with_chunk_size(chunk_size)?;
    streamer.receive(&mut delta_reader, &mut reference_file, &mut writer)?;
    writer.flush()?;

    let output_size = std::fs::metadata(output)?.len();
    log::debug!(
        "patched {}: {} delta bytes into {} output bytes",
        output.display(),
        delta_size,
        output_size
    );
    Ok(PatchStats {
        delta_size,
        output_size,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
