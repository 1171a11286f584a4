use super::error::EnumerationError;
use super::site::SiteClassification;
use super::state::{EnumerationOutput, EnumerationRecord, StateAccumulators, StatePair};
use tracing::debug;

/// Validates one molecule's combined pair list and records it in the output
/// mapping.
///
/// Three invariants are enforced, all fatal on violation because they signal
/// a logic defect rather than bad input:
///
/// 1. the combined pair count equals
///    `(acid sites - acid skips) + (base sites - base skips)`,
/// 2. both members of every pair carry the same pKa annotation,
/// 3. the molecule's chemical identifier is new in the output mapping.
///
/// A molecule whose combined list is empty (every site dropped or skipped)
/// records nothing and is not an error.
///
/// # Return
///
/// Returns `Ok(true)` if an enumeration record was inserted, `Ok(false)` if
/// there was nothing to record.
pub fn validate_and_record(
    molecule_index: usize,
    pairs: Vec<StatePair>,
    classification: &SiteClassification,
    acid_skips: usize,
    base_skips: usize,
    accumulators: StateAccumulators,
    output: &mut EnumerationOutput,
) -> Result<bool, EnumerationError> {
    let expected = (classification.acidic.len() - acid_skips)
        + (classification.basic.len() - base_skips);
    if pairs.len() != expected {
        return Err(EnumerationError::CountMismatch {
            molecule_index,
            pairs: pairs.len(),
            acid_sites: classification.acidic.len(),
            acid_skips,
            base_sites: classification.basic.len(),
            base_skips,
            pka_values: accumulators.pka_values,
            smiles: accumulators.smiles,
        });
    }

    if pairs.is_empty() {
        return Ok(false);
    }

    for (pair_index, pair) in pairs.iter().enumerate() {
        let protonated = pair.protonated.pka_raw().unwrap_or_default();
        let deprotonated = pair.deprotonated.pka_raw().unwrap_or_default();
        if protonated.is_empty() || protonated != deprotonated {
            return Err(EnumerationError::PkaMismatch {
                molecule_index,
                pair_index,
                protonated: protonated.to_string(),
                deprotonated: deprotonated.to_string(),
            });
        }

        debug!(
            molecule_index,
            pair_index,
            pka = protonated,
            protonated = pair.protonated.smiles().unwrap_or_default(),
            deprotonated = pair.deprotonated.smiles().unwrap_or_default(),
            site_atom = pair.protonated.site_atom(),
            "Validated conjugate pair"
        );
    }

    let accession = pairs[0]
        .protonated
        .accession()
        .ok_or_else(|| {
            EnumerationError::Internal(format!(
                "Molecule {} produced pairs without a chemical identifier",
                molecule_index
            ))
        })?
        .to_string();

    if output.contains_key(&accession) {
        return Err(EnumerationError::DuplicateIdentifier { id: accession });
    }

    output.insert(
        accession,
        EnumerationRecord {
            pairs,
            pka_values: accumulators.pka_values,
            smiles: accumulators.smiles,
            sequence_ids: accumulators.sequence_ids,
        },
    );
    Ok(true)
}
