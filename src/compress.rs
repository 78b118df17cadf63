//! # Compression Stage
//!
//! Wraps the CSV artifact in a single-member gzip stream. This is a batch
//! pipeline, so the level favors smallest output over speed. The source file
//! is read-only input and is never mutated or deleted here.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;

use crate::domain::errors::{ExportError, Result};

/// Compresses `src` into a gzip stream at `dest`, returning the number of
/// uncompressed bytes consumed. Any I/O fault is fatal to the run.
pub fn gzip_file(src: &Path, dest: &Path) -> Result<u64> {
    let input = File::open(src)
        .map_err(|e| ExportError::Compression(format!("open {}: {}", src.display(), e)))?;
    let output = File::create(dest)
        .map_err(|e| ExportError::Compression(format!("create {}: {}", dest.display(), e)))?;

    let mut reader = BufReader::new(input);
    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::best());

    let bytes = std::io::copy(&mut reader, &mut encoder)
        .map_err(|e| ExportError::Compression(format!("compress {}: {}", src.display(), e)))?;

    encoder
        .finish()
        .and_then(|mut w| w.flush().map(|_| w))
        .map_err(|e| ExportError::Compression(format!("finalize {}: {}", dest.display(), e)))?;

    info!(
        "Compressed {} ({} bytes in) -> {}",
        src.display(),
        bytes,
        dest.display()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_gzip_round_trips_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("data.csv");
        let dest = dir.path().join("data.csv.gz");

        let content = "id,name\n1,alice\n2,\"b,c\"\n";
        std::fs::write(&src, content).unwrap();

        let bytes = gzip_file(&src, &dest).unwrap();
        assert_eq!(bytes, content.len() as u64);

        let mut decoder = GzDecoder::new(File::open(&dest).unwrap());
        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, content);
    }

    #[test]
    fn test_source_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("data.csv");
        let dest = dir.path().join("data.csv.gz");

        let content = "a\n1\n";
        std::fs::write(&src, content).unwrap();
        gzip_file(&src, &dest).unwrap();
        assert_eq!(std::fs::read_to_string(&src).unwrap(), content);
    }

    #[test]
    fn test_missing_source_maps_to_compression_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = gzip_file(&dir.path().join("absent.csv"), &dir.path().join("out.gz"))
            .unwrap_err();
        assert!(matches!(err, ExportError::Compression(_)));
    }
}
