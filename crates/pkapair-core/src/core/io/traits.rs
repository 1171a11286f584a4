use crate::core::io::open_reader;
use crate::core::models::record::MoleculeRecord;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing multi-record chemical files.
///
/// This trait provides a common API for chemical file I/O operations.
/// Implementors handle format-specific parsing and serialization; the
/// path-based helpers add buffered file handling and transparent gzip
/// detection on the read side.
pub trait ChemicalFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads all molecule records from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<MoleculeRecord>, Self::Error>;

    /// Writes molecule records to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(records: &[MoleculeRecord], writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads all molecule records from a file path.
    ///
    /// The file may be gzip-compressed; compression is detected from the
    /// file's magic bytes, not its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<MoleculeRecord>, Self::Error> {
        let mut reader = open_reader(path)?;
        Self::read_from(&mut reader)
    }

    /// Writes molecule records to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        records: &[MoleculeRecord],
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(records, &mut writer)
    }
}
