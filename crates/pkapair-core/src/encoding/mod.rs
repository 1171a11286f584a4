//! Conversion of validated state pairs into training-ready paired graphs.
//!
//! This is the boundary to the model-training stack: every conjugate pair
//! becomes a [`pair::PairedGraph`] carrying per-atom and per-bond feature
//! matrices for both protonation states plus the reference pKa label. The
//! feature vocabulary is a fixed registry ([`features`]); callers select the
//! active subset by name, mirroring how training configurations pick their
//! input representation.

pub mod features;
pub mod pair;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Unknown feature name: '{0}'")]
    UnknownFeature(String),

    #[error("Pair {pair_index} of '{accession}' is missing annotation '{key}'")]
    MissingAnnotation {
        accession: String,
        pair_index: usize,
        key: &'static str,
    },

    #[error("Pair {pair_index} of '{accession}' has unparseable pKa '{value}'")]
    UnparseablePka {
        accession: String,
        pair_index: usize,
        value: String,
    },

    #[error(
        "Pair {pair_index} of '{accession}' annotates site atom {site} but the graph has only \
         {atom_count} atoms"
    )]
    SiteOutOfBounds {
        accession: String,
        pair_index: usize,
        site: usize,
        atom_count: usize,
    },

    #[error(
        "Pair {pair_index} of '{accession}' has inconsistent site annotations: protonated member \
         says {protonated}, deprotonated member says {deprotonated}"
    )]
    InconsistentSite {
        accession: String,
        pair_index: usize,
        protonated: usize,
        deprotonated: usize,
    },
}
