use super::site::SitePrediction;
use super::state::{RunCounters, StateAccumulators, StatePair};
use super::transform;
use crate::core::models::record::{
    KEY_INTERNAL_ID, KEY_PKA, KEY_SITE_ATOM, KEY_SITE_LABEL, KEY_SMILES, MoleculeRecord,
};
use crate::core::smiles::write_smiles;
use tracing::debug;

/// Generates the conjugate pairs for one molecule's acidic sites.
///
/// For every acidic site, in list order, a fresh deep copy of the untouched
/// reference molecule is deprotonated at the site atom, moving from the
/// acidic parent toward its deprotonated partner. Taking a fresh copy per
/// site means sites never observe each other's transformations.
///
/// A site whose transformation cannot be applied increments the polarity
/// skip count and the run-level skip tally and is excluded from the output;
/// this is recoverable, never fatal. Successful pairs are annotated (shared
/// identifier, pKa, site atom, site label, SMILES, two fresh sequence ids)
/// and their pKa, SMILES tuple, and sequence ids are appended to the
/// caller-owned accumulators.
///
/// Returns the generated pairs and the number of sites skipped in this call.
pub fn enumerate_acid_states(
    sites: &[SitePrediction],
    molecule_index: usize,
    reference: &MoleculeRecord,
    counters: &mut RunCounters,
    accumulators: &mut StateAccumulators,
) -> (Vec<StatePair>, usize) {
    let mut pairs = Vec::with_capacity(sites.len());
    let mut skipped = 0;

    for (ordinal, site) in sites.iter().enumerate() {
        let mut conjugate = reference.clone();
        if let Err(error) = transform::deprotonate(&mut conjugate.graph, site.atom_index) {
            debug!(
                molecule_index,
                atom_index = site.atom_index,
                pka = site.pka_value,
                %error,
                "Skipping acid site: transformation failed"
            );
            skipped += 1;
            counters.record_skip();
            continue;
        }

        let mut pair = StatePair {
            protonated: reference.clone(),
            deprotonated: conjugate,
        };
        let label = format!("acid_{}", ordinal + 1);
        let (smiles_protonated, smiles_deprotonated) =
            annotate_pair(&mut pair, site, &label, counters, accumulators);
        // Acid branch: the conjugate is the deprotonated member.
        accumulators
            .smiles
            .push((smiles_deprotonated, smiles_protonated));
        pairs.push(pair);
    }

    (pairs, skipped)
}

/// Generates the conjugate pairs for one molecule's basic sites.
///
/// Structurally symmetric to [`enumerate_acid_states`]: every basic site
/// protonates a fresh deep copy of the reference molecule, moving from the
/// basic parent toward its protonated partner.
pub fn enumerate_base_states(
    sites: &[SitePrediction],
    molecule_index: usize,
    reference: &MoleculeRecord,
    counters: &mut RunCounters,
    accumulators: &mut StateAccumulators,
) -> (Vec<StatePair>, usize) {
    let mut pairs = Vec::with_capacity(sites.len());
    let mut skipped = 0;

    for (ordinal, site) in sites.iter().enumerate() {
        let mut conjugate = reference.clone();
        if let Err(error) = transform::protonate(&mut conjugate.graph, site.atom_index) {
            debug!(
                molecule_index,
                atom_index = site.atom_index,
                pka = site.pka_value,
                %error,
                "Skipping base site: transformation failed"
            );
            skipped += 1;
            counters.record_skip();
            continue;
        }

        let mut pair = StatePair {
            protonated: conjugate,
            deprotonated: reference.clone(),
        };
        let label = format!("base_{}", ordinal + 1);
        let (smiles_protonated, smiles_deprotonated) =
            annotate_pair(&mut pair, site, &label, counters, accumulators);
        // Base branch: the conjugate is the protonated member.
        accumulators
            .smiles
            .push((smiles_protonated, smiles_deprotonated));
        pairs.push(pair);
    }

    (pairs, skipped)
}

/// Stamps both members of a pair with their shared bookkeeping annotations
/// and feeds the pKa and sequence-id accumulators.
///
/// The protonated member always draws its sequence id first, so ids within
/// a pair are consecutive and monotonically increasing across the run.
///
/// Returns the canonical SMILES of the (protonated, deprotonated) members.
fn annotate_pair(
    pair: &mut StatePair,
    site: &SitePrediction,
    label: &str,
    counters: &mut RunCounters,
    accumulators: &mut StateAccumulators,
) -> (String, String) {
    accumulators.pka_values.push(site.pka_value);

    let mut emitted = Vec::with_capacity(2);
    for member in [&mut pair.protonated, &mut pair.deprotonated] {
        let sequence_id = counters.next_sequence_id();
        accumulators.sequence_ids.push(sequence_id);

        let smiles = write_smiles(&member.graph);
        member.set_accession(site.source_id.clone());
        member.set_annotation(KEY_INTERNAL_ID, sequence_id.to_string());
        member.set_annotation(KEY_PKA, site.pka_value.to_string());
        member.set_annotation(KEY_SITE_ATOM, site.atom_index.to_string());
        member.set_annotation(KEY_SITE_LABEL, label);
        member.set_annotation(KEY_SMILES, smiles.clone());
        emitted.push(smiles);
    }

    let deprotonated = emitted.pop().expect("two members annotated");
    let protonated = emitted.pop().expect("two members annotated");
    (protonated, deprotonated)
}
