// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;

use common::{fixture, small_parallel, FailingExecutor, FIXTURE_CHUNK256_W4, FIXTURE_SEQUENTIAL};
use easyhash::{hash_reader, HashError, Hasher, HasherConfig, HashingReader, SequentialExecutor};

/// Yields `Interrupted` once, then one byte per read.
struct Trickle {
    data: Vec<u8>,
    pos: usize,
    interrupted: bool,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.interrupted {
            self.interrupted = true;
            return Err(io::ErrorKind::Interrupted.into());
        }
        match (self.data.get(self.pos), buf.first_mut()) {
            (Some(&b), Some(slot)) => {
                *slot = b;
                self.pos += 1;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

struct Broken;

impl Read for Broken {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk on fire"))
    }
}

#[test]
fn reader_single_read_reaches_parallel_path() {
    let d = fixture();
    let got = hash_reader(Cursor::new(&d), small_parallel(4)).unwrap();
    assert_eq!(got.to_hex(), FIXTURE_CHUNK256_W4);
}

#[test]
fn reader_retries_interrupted_reads() {
    let d = fixture();
    let reader = Trickle {
        data: d,
        pos: 0,
        interrupted: false,
    };
    let got = hash_reader(reader, HasherConfig::sequential()).unwrap();
    assert_eq!(got.to_hex(), FIXTURE_SEQUENTIAL);
}

#[test]
fn reader_errors_are_wrapped() {
    let err = hash_reader(Broken, HasherConfig::sequential()).unwrap_err();
    assert!(matches!(err, HashError::Io(_)));
    assert!(err.to_string().starts_with("[EASYHASH_IO]"));
}

#[test]
fn hashing_reader_tees_into_hasher() {
    let d = fixture();
    let hasher = Hasher::with_config(HasherConfig::sequential()).unwrap();
    let mut reader = HashingReader::new(Cursor::new(d.clone()), hasher);
    io::copy(&mut reader, &mut io::sink()).unwrap();
    assert_eq!(reader.bytes_read(), d.len() as u64);
    assert_eq!(reader.digest().to_hex(), FIXTURE_SEQUENTIAL);
}

#[test]
fn write_sink_matches_update() {
    let d = fixture();
    let mut h = Hasher::with_config(small_parallel(4))
        .unwrap()
        .with_executor(Arc::new(SequentialExecutor));
    h.write_all(&d).unwrap();
    assert_eq!(h.hex_digest(), FIXTURE_CHUNK256_W4);
}

#[test]
fn write_sink_reports_batch_failure() {
    let mut h = Hasher::with_config(small_parallel(4))
        .unwrap()
        .with_executor(Arc::new(FailingExecutor));
    let err = h.write(&fixture()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::Other);
    assert!(err.to_string().contains("[EASYHASH_CHUNK_TASK]"));
    assert!(h.is_empty());
}

#[test]
fn hashing_reader_failure_consumes_inner_bytes() {
    let hasher = Hasher::with_config(small_parallel(4))
        .unwrap()
        .with_executor(Arc::new(FailingExecutor));
    let mut reader = HashingReader::new(Cursor::new(fixture()), hasher);
    let mut buf = vec![0u8; 1024];
    let err = reader.read(&mut buf).unwrap_err();
    assert!(err.to_string().contains("[EASYHASH_CHUNK_TASK]"));
    assert_eq!(reader.bytes_read(), 0);
    let (inner, _) = reader.into_parts();
    assert_eq!(inner.position(), 1024);
}
