// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `std::io` adapters.

use std::io::{self, Read};

use tracing::debug;

use crate::config::HasherConfig;
use crate::engine::Hasher;
use crate::error::HashError;
use crate::state::Digest;

const READ_BUF_LEN: usize = 64 * 1024;

/// Bytes per `update` issued by [`hash_reader`].
///
/// With the parallel path on, a batch must reach `min_size_for_parallel` or
/// the fan-out could never engage.
pub fn batch_len(config: &HasherConfig) -> usize {
    if config.parallel {
        config.min_size_for_parallel.max(READ_BUF_LEN)
    } else {
        READ_BUF_LEN
    }
}

/// Hash everything `reader` yields until EOF.
///
/// Input is fed to the hasher in full batches of [`batch_len`] bytes (the
/// last one short), so the digest does not depend on how `reader` splits its
/// reads. `Interrupted` reads are retried.
pub fn hash_reader<R: Read>(mut reader: R, config: HasherConfig) -> Result<Digest, HashError> {
    let mut hasher = Hasher::with_config(config)?;
    let mut buf = vec![0u8; batch_len(&config)];
    loop {
        let n = fill(&mut reader, &mut buf)?;
        if n > 0 {
            hasher.update(&buf[..n])?;
        }
        if n < buf.len() {
            break;
        }
    }
    debug!(bytes = hasher.len(), "hashed reader to EOF");
    Ok(hasher.finish())
}

/// Read until `buf` is full or the reader hits EOF.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reader that hashes the bytes passing through it.
///
/// # Errors
///
/// If hashing a read fails (a parallel batch whose chunk task fails), `read`
/// returns that error and the bytes it already pulled from `inner` are
/// neither hashed nor handed to the caller. The hasher state is unchanged,
/// but `inner` has moved past those bytes, so the stream cannot resume with a
/// digest that covers everything it produced. Discard the reader after such
/// an error.
#[derive(Debug)]
pub struct HashingReader<R> {
    inner: R,
    hasher: Hasher,
}

impl<R: Read> HashingReader<R> {
    /// Wrap `inner`, hashing with `hasher`.
    pub fn new(inner: R, hasher: Hasher) -> Self {
        Self { inner, hasher }
    }

    /// Digest of the bytes read so far.
    pub fn digest(&self) -> Digest {
        self.hasher.digest()
    }

    /// Bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.hasher.len()
    }

    /// Split back into the inner reader and the hasher.
    pub fn into_parts(self) -> (R, Hasher) {
        (self.inner, self.hasher)
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n])?;
        Ok(n)
    }
}
