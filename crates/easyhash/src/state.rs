// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Accumulator state and digest value types.

use std::fmt;
use std::str::FromStr;

use crate::constants::{DIGEST_LEN, IV};
use crate::error::HashError;

/// Four 32-bit accumulator words `(a, b, c, d)`.
///
/// Callers cannot assign words directly: a `State` only comes out of the
/// initialization vector, the Mixer, the Chunk Hasher, or the State Merger.
/// All arithmetic on it is modulo 2³².
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct State([u32; 4]);

impl State {
    /// The initialization vector.
    pub const IV: Self = Self(IV);

    pub(crate) const fn from_words(words: [u32; 4]) -> Self {
        Self(words)
    }

    /// Read-only view of the four words in lane order `a, b, c, d`.
    pub const fn words(&self) -> [u32; 4] {
        self.0
    }

    pub(crate) fn words_mut(&mut self) -> &mut [u32; 4] {
        &mut self.0
    }

    /// The cross-mixing chain shared by the Mixer and the State Merger:
    /// `a ^= d; b ^= a; c ^= b; d ^= c`, each step using the updated neighbour.
    #[inline]
    pub(crate) fn cross_mix(&mut self) {
        let [a, b, c, d] = &mut self.0;
        *a ^= *d;
        *b ^= *a;
        *c ^= *b;
        *d ^= *c;
    }
}

impl Default for State {
    fn default() -> Self {
        Self::IV
    }
}

/// A finished 128-bit digest.
///
/// `Display` renders lowercase hex; `FromStr` accepts the same form (either
/// case).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// View the digest as bytes.
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex encoding, always 32 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Number of bits that differ between two digests.
    pub fn hamming_distance(&self, other: &Self) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut out).map_err(|e| HashError::InvalidHex(e.to_string()))?;
        Ok(Self(out))
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Digest> for [u8; DIGEST_LEN] {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}
