//! Reading and writing of annotated molecule records.
//!
//! The only on-disk format the pipeline consumes is SDF (MDL V2000), plain
//! or gzip-compressed; compression is sniffed from the gzip magic bytes so
//! that misnamed files still open correctly.

pub mod sdf;
pub mod traits;

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Opens a file for reading, transparently decompressing gzip input.
///
/// Detection is by magic bytes, not extension.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or probed.
pub fn open_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let mut probe = File::open(&path)?;
    let mut magic = [0u8; 2];
    let bytes_read = probe.read(&mut magic)?;
    drop(probe);

    let file = File::open(&path)?;
    if bytes_read == 2 && magic == GZIP_MAGIC {
        Ok(Box::new(BufReader::new(GzDecoder::new(BufReader::new(
            file,
        )))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn write_plain(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn write_gzip(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap();
        path
    }

    #[test]
    fn open_reader_reads_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_plain(&dir, "plain.sdf", "hello\nworld\n");

        let mut content = String::new();
        open_reader(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello\nworld\n");
    }

    #[test]
    fn open_reader_decompresses_gzip_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gzip(&dir, "misnamed.sdf", "compressed content\n");

        let mut content = String::new();
        open_reader(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "compressed content\n");
    }

    #[test]
    fn open_reader_handles_files_shorter_than_the_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_plain(&dir, "tiny", "x");

        let mut content = String::new();
        open_reader(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "x");
    }

    #[test]
    fn open_reader_fails_for_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_reader(dir.path().join("absent.sdf")).is_err());
    }
}
