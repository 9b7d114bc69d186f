// Strong hash capability.
//
// The matcher confirms every weak-checksum hit with a 128-bit digest of the
// candidate bytes, so the digest only has to be collision-resistant enough
// that checksum+digest verification practically eliminates false matches.
// The provider is supplied at construction of the signature generator and
// the delta generator; the default is MD5 (what the wire format's 16-byte
// hash field was defined against).

/// Pluggable 128-bit digest used to confirm weak-checksum matches.
///
/// Implementations must be deterministic: equal input, equal digest.
pub trait StrongHash {
    fn digest(&self, data: &[u8]) -> [u8; 16];
}

impl<T: StrongHash + ?Sized> StrongHash for &T {
    fn digest(&self, data: &[u8]) -> [u8; 16] {
        (**self).digest(data)
    }
}

/// MD5 digest provider, the default strong hash.
#[cfg(feature = "md5")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5;

#[cfg(feature = "md5")]
impl StrongHash for Md5 {
    fn digest(&self, data: &[u8]) -> [u8; 16] {
        use md5::{Digest, Md5 as Hasher};
        let mut hasher = Hasher::new();
        hasher.update(data);
        hasher.finalize().into()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
