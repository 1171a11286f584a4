use super::molecule::MoleculeGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Annotation key for the stable external identifier of the source molecule
/// (e.g. a database accession). Shared by every state derived from it.
pub const KEY_ACCESSION: &str = "accession";
/// Annotation key for the internal sequence id, unique per generated state
/// across the whole run.
pub const KEY_INTERNAL_ID: &str = "internal_id";
/// Annotation key for the pKa value, stored as a numeric string.
pub const KEY_PKA: &str = "pKa";
/// Annotation key for the 0-based index of the titratable site atom.
pub const KEY_SITE_ATOM: &str = "site_atom";
/// Annotation key for the site label (`acid_<n>` / `base_<n>`).
pub const KEY_SITE_LABEL: &str = "site_label";
/// Annotation key for the canonical SMILES of this state.
pub const KEY_SMILES: &str = "smiles";

/// A molecule graph together with its free-form annotation map.
///
/// The graph is what the chemistry operates on; the annotations are the
/// bookkeeping layer the dataset builder reads and writes: input records
/// arrive with predictor properties (which the site parser consumes), and
/// generated states leave with the identifiers, pKa, SMILES, and site index
/// the downstream encoder depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoleculeRecord {
    pub graph: MoleculeGraph,
    annotations: HashMap<String, String>,
}

impl MoleculeRecord {
    pub fn new(graph: MoleculeGraph) -> Self {
        Self {
            graph,
            annotations: HashMap::new(),
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(|s| s.as_str())
    }

    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.annotations.insert(key.into(), value.into());
    }

    pub fn annotations(&self) -> &HashMap<String, String> {
        &self.annotations
    }

    /// Removes every annotation, keeping the graph untouched.
    ///
    /// The driver clears the raw predictor properties off the reference
    /// molecule before any state is derived from it, so generated states
    /// carry only the annotations the generator assigns.
    pub fn clear_annotations(&mut self) {
        self.annotations.clear();
    }

    pub fn accession(&self) -> Option<&str> {
        self.annotation(KEY_ACCESSION)
    }

    pub fn set_accession(&mut self, id: impl Into<String>) {
        self.set_annotation(KEY_ACCESSION, id);
    }

    /// The pKa annotation parsed as a number, if present and parseable.
    pub fn pka(&self) -> Option<f64> {
        self.annotation(KEY_PKA)?.parse().ok()
    }

    /// The raw pKa annotation string, if present.
    pub fn pka_raw(&self) -> Option<&str> {
        self.annotation(KEY_PKA)
    }

    pub fn internal_id(&self) -> Option<u64> {
        self.annotation(KEY_INTERNAL_ID)?.parse().ok()
    }

    /// The 0-based atom index of the titratable site, if annotated.
    pub fn site_atom(&self) -> Option<usize> {
        self.annotation(KEY_SITE_ATOM)?.parse().ok()
    }

    pub fn smiles(&self) -> Option<&str> {
        self.annotation(KEY_SMILES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_round_trip_through_typed_accessors() {
        let mut record = MoleculeRecord::new(MoleculeGraph::new());
        record.set_accession("CHEMBL25");
        record.set_annotation(KEY_PKA, "3.5");
        record.set_annotation(KEY_INTERNAL_ID, "42");
        record.set_annotation(KEY_SITE_ATOM, "7");
        record.set_annotation(KEY_SMILES, "CC(=O)O");

        assert_eq!(record.accession(), Some("CHEMBL25"));
        assert_eq!(record.pka(), Some(3.5));
        assert_eq!(record.pka_raw(), Some("3.5"));
        assert_eq!(record.internal_id(), Some(42));
        assert_eq!(record.site_atom(), Some(7));
        assert_eq!(record.smiles(), Some("CC(=O)O"));
    }

    #[test]
    fn missing_annotations_read_as_none() {
        let record = MoleculeRecord::new(MoleculeGraph::new());
        assert_eq!(record.accession(), None);
        assert_eq!(record.pka(), None);
        assert_eq!(record.site_atom(), None);
    }

    #[test]
    fn unparseable_numeric_annotations_read_as_none() {
        let mut record = MoleculeRecord::new(MoleculeGraph::new());
        record.set_annotation(KEY_PKA, "not-a-number");
        record.set_annotation(KEY_INTERNAL_ID, "-1");
        assert_eq!(record.pka(), None);
        assert_eq!(record.internal_id(), None);
    }

    #[test]
    fn clear_annotations_empties_the_map() {
        let mut record = MoleculeRecord::new(MoleculeGraph::new());
        record.set_accession("CHEMBL25");
        record.set_annotation("r_epik_pKa_1", "4.2");
        record.clear_annotations();
        assert!(record.annotations().is_empty());
    }
}
