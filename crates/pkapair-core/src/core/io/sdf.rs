use crate::core::io::traits::ChemicalFile;
use crate::core::models::atom::Atom;
use crate::core::models::bond::BondOrder;
use crate::core::models::element::Element;
use crate::core::models::molecule::MoleculeGraph;
use crate::core::models::record::MoleculeRecord;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Annotation key holding the SDF title line of the source record.
pub const KEY_TITLE: &str = "title";

const RECORD_TERMINATOR: &str = "$$$$";
const PROPERTIES_END: &str = "M  END";
const CHARGE_LINE_PREFIX: &str = "M  CHG";

#[derive(Debug, Error)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: SdfParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

#[derive(Debug, Error)]
pub enum SdfParseErrorKind {
    #[error("Record is too short to contain a counts line")]
    TruncatedHeader,
    #[error("Record body ended before the declared atom/bond blocks")]
    TruncatedBlock,
    #[error("Invalid integer in field '{field}' (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float in field '{field}' (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Atom line has too few columns")]
    AtomLineTooShort,
    #[error("Bond line has too few columns")]
    BondLineTooShort,
    #[error("Unknown element symbol '{symbol}'")]
    UnknownElement { symbol: String },
    #[error("Invalid bond order code '{value}'")]
    InvalidBondOrder { value: String },
    #[error("Bond references atom {index} outside the atom block")]
    BondIndexOutOfRange { index: usize },
}

/// Maps the atom-block charge code of MDL V2000 to a formal charge.
fn charge_from_code(code: i32) -> i8 {
    match code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

/// Fills implicit hydrogen counts up to the charge-adjusted element valence.
///
/// Input records follow the `removeHs` convention of the original pipeline:
/// exchangeable hydrogens are not written as explicit atoms, so the count is
/// reconstructed from the free valence. Explicit hydrogen neighbors already
/// contribute to the bond-order sum and are therefore not double-counted.
fn fill_implicit_hydrogens(graph: &mut MoleculeGraph) {
    for index in 0..graph.atom_count() {
        let bond_sum = graph.bond_order_sum(index).round() as i64;
        let atom = graph.atom_mut(index).expect("index is in range");
        let Some(allowed) = atom.element.valence_for_charge(atom.formal_charge) else {
            continue;
        };
        atom.implicit_hydrogens = (allowed as i64 - bond_sum).max(0) as u8;
    }
}

/// A streaming reader over the records of an SDF file.
///
/// Yields one [`MoleculeRecord`] per `$$$$`-terminated block. A malformed
/// block yields an `Err` item and the reader continues with the next block,
/// mirroring how the pipeline treats unreadable molecules as skippable
/// rather than fatal.
pub struct SdfReader<R: BufRead> {
    reader: R,
    line: usize,
    done: bool,
}

impl<R: BufRead> SdfReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            done: false,
        }
    }

    fn read_block(&mut self) -> Result<Option<(Vec<String>, usize)>, io::Error> {
        let mut block = Vec::new();
        let first_line = self.line + 1;
        let mut buffer = String::new();

        loop {
            buffer.clear();
            let bytes = self.reader.read_line(&mut buffer)?;
            if bytes == 0 {
                self.done = true;
                if block.iter().any(|l: &String| !l.trim().is_empty()) {
                    return Ok(Some((block, first_line)));
                }
                return Ok(None);
            }
            self.line += 1;
            let line = buffer.trim_end_matches(['\n', '\r']);
            if line.trim() == RECORD_TERMINATOR {
                return Ok(Some((block, first_line)));
            }
            block.push(line.to_string());
        }
    }
}

impl<R: BufRead> Iterator for SdfReader<R> {
    type Item = Result<MoleculeRecord, SdfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_block() {
            Err(e) => {
                self.done = true;
                Some(Err(SdfError::Io(e)))
            }
            Ok(None) => None,
            Ok(Some((block, first_line))) => Some(parse_record(&block, first_line)),
        }
    }
}

fn parse_record(block: &[String], base_line: usize) -> Result<MoleculeRecord, SdfError> {
    let line_of = |offset: usize| base_line + offset;

    if block.len() < 4 {
        return Err(SdfError::Parse {
            line: line_of(block.len().saturating_sub(1)),
            kind: SdfParseErrorKind::TruncatedHeader,
        });
    }

    let counts_cols: Vec<&str> = block[3].split_whitespace().collect();
    if counts_cols.len() < 2 {
        return Err(SdfError::Parse {
            line: line_of(3),
            kind: SdfParseErrorKind::TruncatedHeader,
        });
    }
    let n_atoms: usize = counts_cols[0].parse().map_err(|_| SdfError::Parse {
        line: line_of(3),
        kind: SdfParseErrorKind::InvalidInt {
            field: "atom count",
            value: counts_cols[0].to_string(),
        },
    })?;
    let n_bonds: usize = counts_cols[1].parse().map_err(|_| SdfError::Parse {
        line: line_of(3),
        kind: SdfParseErrorKind::InvalidInt {
            field: "bond count",
            value: counts_cols[1].to_string(),
        },
    })?;

    let first_atom_line = 4;
    let first_bond_line = first_atom_line + n_atoms;
    let block_end = first_bond_line + n_bonds;
    if block.len() < block_end {
        return Err(SdfError::Parse {
            line: line_of(block.len().saturating_sub(1)),
            kind: SdfParseErrorKind::TruncatedBlock,
        });
    }

    let mut graph = MoleculeGraph::new();

    for offset in first_atom_line..first_bond_line {
        let cols: Vec<&str> = block[offset].split_whitespace().collect();
        if cols.len() < 4 {
            return Err(SdfError::Parse {
                line: line_of(offset),
                kind: SdfParseErrorKind::AtomLineTooShort,
            });
        }

        let mut coords = [0.0f64; 3];
        for (slot, (value, field)) in coords.iter_mut().zip([
            (cols[0], "x"),
            (cols[1], "y"),
            (cols[2], "z"),
        ]) {
            *slot = value.parse().map_err(|_| SdfError::Parse {
                line: line_of(offset),
                kind: SdfParseErrorKind::InvalidFloat {
                    field,
                    value: value.to_string(),
                },
            })?;
        }

        let element =
            Element::from_symbol(cols[3]).ok_or_else(|| SdfError::Parse {
                line: line_of(offset),
                kind: SdfParseErrorKind::UnknownElement {
                    symbol: cols[3].to_string(),
                },
            })?;

        let mut atom = Atom::new(element, Point3::new(coords[0], coords[1], coords[2]));
        if let Some(code_str) = cols.get(5) {
            let code: i32 = code_str.parse().map_err(|_| SdfError::Parse {
                line: line_of(offset),
                kind: SdfParseErrorKind::InvalidInt {
                    field: "charge code",
                    value: code_str.to_string(),
                },
            })?;
            atom.formal_charge = charge_from_code(code);
        }
        graph.add_atom(atom);
    }

    for offset in first_bond_line..block_end {
        let cols: Vec<&str> = block[offset].split_whitespace().collect();
        if cols.len() < 3 {
            return Err(SdfError::Parse {
                line: line_of(offset),
                kind: SdfParseErrorKind::BondLineTooShort,
            });
        }

        let mut endpoints = [0usize; 2];
        for (slot, (value, field)) in endpoints
            .iter_mut()
            .zip([(cols[0], "bond atom 1"), (cols[1], "bond atom 2")])
        {
            let serial: usize = value.parse().map_err(|_| SdfError::Parse {
                line: line_of(offset),
                kind: SdfParseErrorKind::InvalidInt {
                    field,
                    value: value.to_string(),
                },
            })?;
            if serial == 0 || serial > n_atoms {
                return Err(SdfError::Parse {
                    line: line_of(offset),
                    kind: SdfParseErrorKind::BondIndexOutOfRange { index: serial },
                });
            }
            *slot = serial - 1;
        }

        let order: BondOrder = cols[2].parse().map_err(|_| SdfError::Parse {
            line: line_of(offset),
            kind: SdfParseErrorKind::InvalidBondOrder {
                value: cols[2].to_string(),
            },
        })?;

        graph
            .add_bond(endpoints[0], endpoints[1], order)
            .ok_or_else(|| {
                SdfError::Inconsistency(format!(
                    "Bond between atoms {} and {} could not be added",
                    endpoints[0] + 1,
                    endpoints[1] + 1
                ))
            })?;

        if order == BondOrder::Aromatic {
            for &endpoint in &endpoints {
                graph.atom_mut(endpoint).expect("endpoint in range").aromatic = true;
            }
        }
    }

    let mut record = MoleculeRecord::new(graph);

    let title = block[0].trim();
    if !title.is_empty() {
        record.set_annotation(KEY_TITLE, title);
    }

    // Property lines: "M  CHG" overrides, then "> <KEY>" data blocks.
    let mut charge_lines_seen = false;
    let mut offset = block_end;
    while offset < block.len() {
        let line = block[offset].trim_end();
        if line == PROPERTIES_END {
            offset += 1;
            break;
        }
        if line.starts_with(CHARGE_LINE_PREFIX) {
            if !charge_lines_seen {
                // V2000 charge property lines supersede all atom-block
                // charge codes.
                for index in 0..record.graph.atom_count() {
                    record.graph.atom_mut(index).expect("index in range").formal_charge = 0;
                }
                charge_lines_seen = true;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            for pair in tokens.get(3..).unwrap_or(&[]).chunks(2) {
                if let [serial_str, charge_str] = pair {
                    let serial: usize = serial_str.parse().map_err(|_| SdfError::Parse {
                        line: line_of(offset),
                        kind: SdfParseErrorKind::InvalidInt {
                            field: "charge atom",
                            value: serial_str.to_string(),
                        },
                    })?;
                    let charge: i8 = charge_str.parse().map_err(|_| SdfError::Parse {
                        line: line_of(offset),
                        kind: SdfParseErrorKind::InvalidInt {
                            field: "charge value",
                            value: charge_str.to_string(),
                        },
                    })?;
                    if serial == 0 || serial > record.graph.atom_count() {
                        return Err(SdfError::Parse {
                            line: line_of(offset),
                            kind: SdfParseErrorKind::BondIndexOutOfRange { index: serial },
                        });
                    }
                    record
                        .graph
                        .atom_mut(serial - 1)
                        .expect("serial checked")
                        .formal_charge = charge;
                }
            }
        }
        offset += 1;
    }

    while offset < block.len() {
        let line = block[offset].trim_end();
        if line.starts_with('>') {
            if let (Some(l), Some(r)) = (line.find('<'), line.rfind('>')) {
                if r > l + 1 {
                    let key = line[l + 1..r].to_string();
                    offset += 1;
                    let mut values = Vec::new();
                    while offset < block.len() {
                        let value = block[offset].trim_end();
                        if value.is_empty() || value.starts_with("> <") {
                            break;
                        }
                        values.push(value.to_string());
                        offset += 1;
                    }
                    record.set_annotation(key, values.join("\n"));
                    continue;
                }
            }
        }
        offset += 1;
    }

    fill_implicit_hydrogens(&mut record.graph);

    Ok(record)
}

fn write_record(record: &MoleculeRecord, writer: &mut impl Write) -> Result<(), SdfError> {
    let title = record
        .accession()
        .or_else(|| record.annotation(KEY_TITLE))
        .unwrap_or("");
    writeln!(writer, "{}", title)?;
    writeln!(writer, "  pkapair")?;
    writeln!(writer)?;

    let graph = &record.graph;
    writeln!(
        writer,
        "{:>3}{:>3}  0  0  0  0           0999 V2000",
        graph.atom_count(),
        graph.bonds().len()
    )?;

    for (_, atom) in graph.atoms_iter() {
        writeln!(
            writer,
            "{:>10.4}{:>10.4}{:>10.4} {:<2}  0  0  0  0  0  0  0  0  0  0",
            atom.position.x,
            atom.position.y,
            atom.position.z,
            atom.element.symbol()
        )?;
    }

    for bond in graph.bonds() {
        writeln!(
            writer,
            "{:>3}{:>3}{:>3}  0  0  0  0",
            bond.atom1 + 1,
            bond.atom2 + 1,
            bond.order.to_sdf_code()
        )?;
    }

    let charged: Vec<(usize, i8)> = graph
        .atoms_iter()
        .filter(|(_, atom)| atom.formal_charge != 0)
        .map(|(index, atom)| (index, atom.formal_charge))
        .collect();
    for group in charged.chunks(8) {
        write!(writer, "{}{:>3}", CHARGE_LINE_PREFIX, group.len())?;
        for (index, charge) in group {
            write!(writer, "{:>4}{:>4}", index + 1, charge)?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "{}", PROPERTIES_END)?;

    let mut keys: Vec<&String> = record.annotations().keys().collect();
    keys.sort();
    for key in keys {
        if key == KEY_TITLE {
            continue;
        }
        writeln!(writer, "> <{}>", key)?;
        writeln!(writer, "{}", record.annotations()[key])?;
        writeln!(writer)?;
    }

    writeln!(writer, "{}", RECORD_TERMINATOR)?;
    Ok(())
}

/// SDF (MDL V2000) file format support.
pub struct SdfFile;

impl ChemicalFile for SdfFile {
    type Error = SdfError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<MoleculeRecord>, Self::Error> {
        SdfReader::new(reader).collect()
    }

    fn write_to(records: &[MoleculeRecord], writer: &mut impl Write) -> Result<(), Self::Error> {
        for record in records {
            write_record(record, writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    const ACETIC_ACID_SDF: &str = "\
CHEMBL539
  test

  4  3  0  0  0  0           0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0
    2.2000    1.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0
    2.2000   -1.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  2  3  2  0  0  0  0
  2  4  1  0  0  0  0
M  END
> <chembl_id>
CHEMBL539

> <r_epik_pKa_1>
4.54

> <i_epik_pKa_atom_1>
4

$$$$
";

    fn parse_single(text: &str) -> MoleculeRecord {
        let mut reader = BufReader::new(text.as_bytes());
        let mut records = SdfFile::read_from(&mut reader).unwrap();
        assert_eq!(records.len(), 1);
        records.pop().unwrap()
    }

    #[test]
    fn parses_atoms_bonds_and_properties() {
        let record = parse_single(ACETIC_ACID_SDF);
        let graph = &record.graph;

        assert_eq!(graph.atom_count(), 4);
        assert_eq!(graph.bonds().len(), 3);
        assert_eq!(graph.atom(0).unwrap().element, Element::C);
        assert_eq!(graph.atom(3).unwrap().element, Element::O);
        assert_eq!(
            graph.bond_between(1, 2).unwrap().order,
            BondOrder::Double
        );
        assert_eq!(record.annotation("chembl_id"), Some("CHEMBL539"));
        assert_eq!(record.annotation("r_epik_pKa_1"), Some("4.54"));
        assert_eq!(record.annotation(KEY_TITLE), Some("CHEMBL539"));
    }

    #[test]
    fn fills_implicit_hydrogens_from_free_valence() {
        let record = parse_single(ACETIC_ACID_SDF);
        let graph = &record.graph;

        // Methyl carbon: valence 4, one bond -> 3 implicit hydrogens.
        assert_eq!(graph.atom(0).unwrap().implicit_hydrogens, 3);
        // Carboxyl carbon is fully substituted.
        assert_eq!(graph.atom(1).unwrap().implicit_hydrogens, 0);
        // Carbonyl oxygen: double bond -> no hydrogens.
        assert_eq!(graph.atom(2).unwrap().implicit_hydrogens, 0);
        // Hydroxyl oxygen: one single bond -> one hydrogen.
        assert_eq!(graph.atom(3).unwrap().implicit_hydrogens, 1);
    }

    #[test]
    fn charge_property_lines_supersede_atom_block_codes() {
        let text = "\
acetate


  4  3  0  0  0  0           0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0
    2.2000    1.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0
    2.2000   -1.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  2  3  2  0  0  0  0
  2  4  1  0  0  0  0
M  CHG  1   4  -1
M  END
$$$$
";
        let record = parse_single(text);
        assert_eq!(record.graph.atom(3).unwrap().formal_charge, -1);
        // The anionic oxygen accepts no hydrogen.
        assert_eq!(record.graph.atom(3).unwrap().implicit_hydrogens, 0);
    }

    #[test]
    fn reader_yields_every_record_in_a_multi_record_file() {
        let text = format!("{}{}", ACETIC_ACID_SDF, ACETIC_ACID_SDF);
        let mut reader = BufReader::new(text.as_bytes());
        let records = SdfFile::read_from(&mut reader).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn malformed_record_yields_err_but_reader_continues() {
        let broken = "\
broken


  2  1  0  0  0  0           0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0
$$$$
";
        let text = format!("{}{}", broken, ACETIC_ACID_SDF);
        let reader = BufReader::new(text.as_bytes());
        let results: Vec<_> = SdfReader::new(reader).collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
    }

    #[test]
    fn unknown_element_is_a_parse_error() {
        let text = "\
odd


  1  0  0  0  0  0           0999 V2000
    0.0000    0.0000    0.0000 Xq  0  0  0  0  0  0  0  0  0  0
M  END
$$$$
";
        let reader = BufReader::new(text.as_bytes());
        let results: Vec<_> = SdfReader::new(reader).collect();
        assert!(matches!(
            results[0],
            Err(SdfError::Parse {
                kind: SdfParseErrorKind::UnknownElement { .. },
                ..
            })
        ));
    }

    #[test]
    fn write_then_read_round_trips_structure_and_annotations() {
        let mut record = parse_single(ACETIC_ACID_SDF);
        record.graph.atom_mut(3).unwrap().formal_charge = -1;
        record.graph.atom_mut(3).unwrap().implicit_hydrogens = 0;
        record.set_accession("CHEMBL539");

        let mut buffer = Vec::new();
        SdfFile::write_to(std::slice::from_ref(&record), &mut buffer).unwrap();
        let mut reader = BufReader::new(buffer.as_slice());
        let reparsed = SdfFile::read_from(&mut reader).unwrap().pop().unwrap();

        assert_eq!(reparsed.graph.atom_count(), record.graph.atom_count());
        assert_eq!(reparsed.graph.bonds().len(), record.graph.bonds().len());
        assert_eq!(reparsed.graph.atom(3).unwrap().formal_charge, -1);
        assert_eq!(reparsed.accession(), Some("CHEMBL539"));
        assert_eq!(reparsed.annotation("r_epik_pKa_1"), Some("4.54"));
    }

    #[test]
    fn file_without_trailing_terminator_still_parses() {
        let text = ACETIC_ACID_SDF.trim_end_matches("$$$$\n");
        let mut reader = BufReader::new(text.as_bytes());
        let records = SdfFile::read_from(&mut reader).unwrap();
        assert_eq!(records.len(), 1);
    }
}
