//! MD5 digests for archive integrity.
//!
//! `Md5Stream` is the incremental accumulator fed chunk by chunk from the
//! streamed archive GET; the reader/path helpers hash local data the same way.

use anyhow::{Context, Result};
use md5::{Digest, Md5};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub(crate) const BUF_SIZE: usize = 64 * 1024;

/// Incremental MD5 over a byte stream. Memory use is constant regardless of
/// how many bytes pass through.
#[derive(Clone, Default)]
pub struct Md5Stream {
    hasher: Md5,
    bytes: u64,
}

impl Md5Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.bytes += chunk.len() as u64;
    }

    /// Bytes hashed so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Lowercase hex digest.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// One-pass MD5 of an in-memory buffer, as lowercase hex.
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// MD5 of everything `reader` yields, read in `BUF_SIZE` chunks.
pub fn md5_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut stream = Md5Stream::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        stream.update(&buf[..n]);
    }
    Ok(stream.finish())
}

/// MD5 of a local file, e.g. an archive already downloaded by hand.
pub fn md5_path(path: &Path) -> Result<String> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    md5_reader(f).with_context(|| format!("read {}", path.display()))
}
