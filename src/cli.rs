// Command-line interface for rollsync.
//
// Three subcommands mirror the pipeline: `signature` signs the receiver's
// copy, `delta` scans the sender's copy against a signature file, `patch`
// rebuilds the sender's copy from a delta file and the receiver's copy.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::hash::strong::Md5;
use crate::io::{self, DEFAULT_BLOCK_SIZE};
use crate::wire::delta::DEFAULT_CHUNK_SIZE;

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// rsync-style delta transfer: sign, diff, patch.
#[derive(Parser, Debug)]
#[command(
    name = "rollsync",
    version,
    about = "rsync-style delta transfer",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Sign a file's blocks for later delta computation.
    Signature {
        /// File to sign (the receiver's copy).
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Signature output file.
        #[arg(value_hint = ValueHint::FilePath)]
        signature: PathBuf,
        /// Block size (supports K/M/G suffix).
        #[arg(long = "block-size", short = 'b', value_parser = parse_byte_size, default_value_t = DEFAULT_BLOCK_SIZE as u64)]
        block_size: u64,
    },
    /// Compute a delta from a signature file and the sender's copy.
    Delta {
        /// Signature file produced by `signature`.
        #[arg(value_hint = ValueHint::FilePath)]
        signature: PathBuf,
        /// The sender's current copy.
        #[arg(value_hint = ValueHint::FilePath)]
        source: PathBuf,
        /// Delta output file.
        #[arg(value_hint = ValueHint::FilePath)]
        delta: PathBuf,
        /// Block size; must match the one used by `signature`.
        #[arg(long = "block-size", short = 'b', value_parser = parse_byte_size, default_value_t = DEFAULT_BLOCK_SIZE as u64)]
        block_size: u64,
        /// Literal-copy read granularity (supports K/M/G suffix).
        #[arg(long = "chunk-size", value_parser = parse_byte_size, default_value_t = DEFAULT_CHUNK_SIZE as u64)]
        chunk_size: u64,
    },
    /// Rebuild the sender's copy from a delta and the receiver's copy.
    Patch {
        /// The receiver's existing copy (reference).
        #[arg(value_hint = ValueHint::FilePath)]
        reference: PathBuf,
        /// Delta file produced by `delta`.
        #[arg(value_hint = ValueHint::FilePath)]
        delta: PathBuf,
        /// Reconstructed output file.
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Copy granularity (supports K/M/G suffix).
        #[arg(long = "chunk-size", value_parser = parse_byte_size, default_value_t = DEFAULT_CHUNK_SIZE as u64)]
        chunk_size: u64,
    },
    /// Print build/configuration details.
    Config,
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn refuse_overwrite(path: &PathBuf, force: bool) -> bool {
    if path.exists() && !force {
        eprintln!(
            "rollsync: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return true;
    }
    false
}

fn cmd_signature(cli: &Cli, input: &PathBuf, signature: &PathBuf, block_size: u64) -> i32 {
    if refuse_overwrite(signature, cli.force) {
        return 1;
    }
    match io::signature_file(Md5, input, signature, block_size as usize) {
        Ok(stats) => {
            if cli.json_output {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "input_size": stats.input_size,
                        "block_count": stats.block_count,
                        "signature_size": stats.signature_size,
                    })
                );
            } else if !cli.quiet && cli.verbose > 0 {
                eprintln!(
                    "rollsync: signed {} bytes as {} blocks ({} signature bytes)",
                    stats.input_size, stats.block_count, stats.signature_size
                );
            }
            0
        }
        Err(e) => {
            eprintln!("rollsync: signature: {e}");
            1
        }
    }
}

fn cmd_delta(
    cli: &Cli,
    signature: &PathBuf,
    source: &PathBuf,
    delta: &PathBuf,
    block_size: u64,
    chunk_size: u64,
) -> i32 {
    if refuse_overwrite(delta, cli.force) {
        return 1;
    }
    match io::delta_file(
        Md5,
        signature,
        source,
        delta,
        block_size as usize,
        chunk_size as usize,
    ) {
        Ok(stats) => {
            if cli.json_output {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "source_size": stats.source_size,
                        "delta_size": stats.delta_size,
                        "record_count": stats.record_count,
                        "literal_bytes": stats.scan.literal_bytes,
                        "matched_bytes": stats.scan.matched_bytes,
                        "matched_blocks": stats.scan.matched_blocks,
                    })
                );
            } else if !cli.quiet && cli.verbose > 0 {
                eprintln!(
                    "rollsync: {} records, {} literal / {} matched bytes, delta {} bytes",
                    stats.record_count,
                    stats.scan.literal_bytes,
                    stats.scan.matched_bytes,
                    stats.delta_size
                );
            }
            0
        }
        Err(e) => {
            eprintln!("rollsync: delta: {e}");
            1
        }
    }
}

fn cmd_patch(
    cli: &Cli,
    reference: &PathBuf,
    delta: &PathBuf,
    output: &PathBuf,
    chunk_size: u64,
) -> i32 {
    if refuse_overwrite(output, cli.force) {
        return 1;
    }
    match io::patch_file(reference, delta, output, chunk_size as usize) {
        Ok(stats) => {
            if cli.json_output {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "delta_size": stats.delta_size,
                        "output_size": stats.output_size,
                    })
                );
            } else if !cli.quiet && cli.verbose > 0 {
                eprintln!(
                    "rollsync: reconstructed {} bytes from {} delta bytes",
                    stats.output_size, stats.delta_size
                );
            }
            0
        }
        Err(e) => {
            eprintln!("rollsync: patch: {e}");
            1
        }
    }
}

fn cmd_config() -> i32 {
    println!("rollsync {}", env!("CARGO_PKG_VERSION"));
    println!("default block size: {DEFAULT_BLOCK_SIZE}");
    println!("default chunk size: {DEFAULT_CHUNK_SIZE}");
    println!("strong hash: md5");
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Cmd::Signature {
            ref input,
            ref signature,
            block_size,
        } => cmd_signature(&cli, input, signature, block_size),
        Cmd::Delta {
            ref signature,
            ref source,
            ref delta,
            block_size,
            chunk_size,
        } => cmd_delta(&cli, signature, source, delta, block_size, chunk_size),
        Cmd::Patch {
            ref reference,
            ref delta,
            ref output,
            chunk_size,
        } => cmd_patch(&cli, reference, delta, output, chunk_size),
        Cmd::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
