//! Key derivation: byte strings to two-part hash keys.

use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault};

use ahash::AHasher;

use crate::error::Error;

/// A derived key.
///
/// `primary` routes to a bucket of the primary table, `secondary` picks the
/// starting slot inside that bucket. Two byte strings whose hashes agree on
/// both halves are the same key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Key {
    pub primary: u32,
    pub secondary: u32,
}

impl Key {
    /// Split a 64-bit hash: low half is primary, high half is secondary.
    #[inline]
    pub const fn from_hash(hash: u64) -> Self {
        Key {
            primary: hash as u32,
            secondary: (hash >> 32) as u32,
        }
    }

    #[inline]
    pub const fn to_hash(self) -> u64 {
        (self.primary as u64) | ((self.secondary as u64) << 32)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}:{:08x}", self.primary, self.secondary)
    }
}

/// Hash function injected into a map.
///
/// Must be deterministic for the lifetime of the map. Collisions are fine,
/// the map resolves them.
pub trait KeyHasher {
    fn hash_bytes(&self, bytes: &[u8]) -> u64;
}

impl<F> KeyHasher for F
where
    F: Fn(&[u8]) -> u64,
{
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        self(bytes)
    }
}

/// Default hasher, aHash with its fixed default keys.
#[derive(Clone, Default)]
pub struct AHashKeys {
    hasher: BuildHasherDefault<AHasher>,
}

impl KeyHasher for AHashKeys {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        self.hasher.hash_one(bytes)
    }
}

/// XXH3 64-bit, seed 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3Keys;

impl KeyHasher for Xxh3Keys {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        xxhash_rust::xxh3::xxh3_64(bytes)
    }
}

/// Derive the key for `bytes`. Empty input is rejected.
#[inline]
pub fn derive_key<H: KeyHasher + ?Sized>(hasher: &H, bytes: &[u8]) -> Result<Key, Error> {
    if bytes.is_empty() {
        return Err(Error::EmptyKey);
    }
    Ok(Key::from_hash(hasher.hash_bytes(bytes)))
}
