//! Gzip streaming compression.
//!
//! The sync core streams a file through a gzip encoder. The async wrapper
//! is the one operation in this crate that suspends: it runs the encoder
//! on the blocking pool and resolves with the output path, or rejects with
//! the underlying I/O error.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
#[cfg(feature = "async")]
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::debug;

/// Stream `src` through a gzip encoder into `dst`. Returns the number of
/// uncompressed bytes consumed.
pub fn gzip_file(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut reader = BufReader::new(File::open(src)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(dst)?), Compression::default());
    let bytes_in = io::copy(&mut reader, &mut encoder)?;
    encoder
        .finish()?
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?;
    debug!(src = %src.display(), dst = %dst.display(), bytes_in, "compressed file");
    Ok(bytes_in)
}

/// Async variant of [`gzip_file`]; resolves with the output path.
#[cfg(feature = "async")]
pub async fn gzip_file_async(src: PathBuf, dst: PathBuf) -> io::Result<PathBuf> {
    tokio::task::spawn_blocking(move || gzip_file(&src, &dst).map(|_| dst))
        .await
        .map_err(io::Error::other)?
}
