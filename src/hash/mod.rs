// Hashing for block matching.
//
// This module provides:
// - The rolling weak checksum driving the sliding-window scan
// - The pluggable 128-bit strong hash that confirms weak matches
// - The checksum-indexed candidate table built from receiver signatures

pub mod rolling;
pub mod strong;
pub mod table;

pub use rolling::RollingChecksum;
#[cfg(feature = "md5")]
pub use strong::Md5;
pub use strong::StrongHash;
pub use table::ChecksumIndex;
