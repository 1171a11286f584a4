use thiserror::Error;

/// Fatal consistency violations of the enumeration pipeline.
///
/// Every variant signals a logic or data-integrity defect and aborts the
/// whole run. Recoverable conditions (a molecule without predictions, a
/// site whose transformation cannot be applied) are deliberately *not*
/// represented here; they are plain values consumed by the caller's skip
/// counters.
#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error(
        "Classification mismatch for molecule {molecule_index}: partition produced \
         {partitioned_acids} acids / {partitioned_bases} bases, independent recount found \
         {recounted_acids} / {recounted_bases}"
    )]
    ClassificationMismatch {
        molecule_index: usize,
        partitioned_acids: usize,
        partitioned_bases: usize,
        recounted_acids: usize,
        recounted_bases: usize,
    },

    #[error(
        "Pair count mismatch for molecule {molecule_index}: generated {pairs} pairs, expected \
         ({acid_sites} acid sites - {acid_skips} skips) + ({base_sites} base sites - \
         {base_skips} skips); pKa values: {pka_values:?}; SMILES: {smiles:?}"
    )]
    CountMismatch {
        molecule_index: usize,
        pairs: usize,
        acid_sites: usize,
        acid_skips: usize,
        base_sites: usize,
        base_skips: usize,
        pka_values: Vec<f64>,
        smiles: Vec<(String, String)>,
    },

    #[error(
        "pKa mismatch within pair {pair_index} of molecule {molecule_index}: \
         protonated member carries '{protonated}', deprotonated member carries '{deprotonated}'"
    )]
    PkaMismatch {
        molecule_index: usize,
        pair_index: usize,
        protonated: String,
        deprotonated: String,
    },

    #[error("Repeated chemical identifier in output mapping: {id}")]
    DuplicateIdentifier { id: String },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
