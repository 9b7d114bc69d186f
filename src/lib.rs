//! Rollsync: rsync-style delta transfer in Rust.
//!
//! The crate provides:
//! - Block signature generation over the receiver's copy (`signature`)
//! - Rolling-checksum matching against a sender stream (`delta`)
//! - Byte-exact wire formats for signatures and deltas (`wire`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::io::Cursor;
//! use rollsync::delta::DeltaGenerator;
//! use rollsync::hash::Md5;
//! use rollsync::signature::SignatureGenerator;
//! use rollsync::wire::DeltaStreamer;
//!
//! # fn main() -> rollsync::error::Result<()> {
//! let receiver_copy = b"hello old world";
//! let sender_copy = b"hello new world";
//! let block_size = 4;
//!
//! // Receiver side: sign what it already has.
//! let signatures = SignatureGenerator::new(Md5, block_size)?
//!     .signatures(Cursor::new(receiver_copy))
//!     .collect::<rollsync::error::Result<Vec<_>>>()?;
//!
//! // Sender side: scan its copy and encode the delta.
//! let mut generator = DeltaGenerator::new(Md5);
//! generator.initialize(block_size, signatures)?;
//! let deltas = generator
//!     .deltas(Cursor::new(sender_copy))?
//!     .collect::<rollsync::error::Result<Vec<_>>>()?;
//! let mut wire = Vec::new();
//! DeltaStreamer::new().send(&deltas, &mut Cursor::new(sender_copy), &mut wire)?;
//!
//! // Receiver side: rebuild the sender's copy from the wire.
//! let mut rebuilt = Vec::new();
//! DeltaStreamer::new().receive(
//!     &mut Cursor::new(wire),
//!     &mut Cursor::new(receiver_copy),
//!     &mut rebuilt,
//! )?;
//! assert_eq!(rebuilt, sender_copy);
//! # Ok(())
//! # }
//! ```

pub mod delta;
pub mod error;
pub mod hash;
pub mod io;
pub mod signature;
pub mod window;
pub mod wire;

#[cfg(feature = "cli")]
pub mod cli;
