use super::EncodingError;
use super::features::FeatureSelection;
use crate::core::models::record::{
    KEY_ACCESSION, KEY_INTERNAL_ID, KEY_PKA, KEY_SITE_ATOM, KEY_SMILES, MoleculeRecord,
};
use crate::engine::state::{EnumerationRecord, StatePair};
use serde::{Deserialize, Serialize};

/// One protonation state rendered as feature matrices.
///
/// Edges are emitted in both directions, one feature row per direction, the
/// layout graph-learning frameworks expect for undirected molecular graphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedGraph {
    /// One row per atom, `FeatureSelection::node_width()` columns.
    pub node_features: Vec<Vec<f32>>,
    /// Directed edge endpoints, two entries per bond.
    pub edge_index: Vec<(usize, usize)>,
    /// One row per directed edge, `FeatureSelection::edge_width()` columns.
    pub edge_features: Vec<Vec<f32>>,
}

/// A training sample: both conjugate states plus the pKa label and the
/// identity bookkeeping the dataset tooling tracks samples by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedGraph {
    pub protonated: EncodedGraph,
    pub deprotonated: EncodedGraph,
    /// The reference pKa label.
    pub reference_pka: f32,
    /// Internal sequence ids of the (protonated, deprotonated) members.
    pub internal_ids: (u64, u64),
    pub smiles_protonated: String,
    pub smiles_deprotonated: String,
    /// Chemical identifier of the source molecule.
    pub accession: String,
    /// 0-based index of the titratable site atom.
    pub reaction_center: usize,
}

/// Orders a pair's members by the canonical rule: the member with the higher
/// total hydrogen count at the site atom is the protonated one.
///
/// Generated pairs already satisfy this by construction; deserialized or
/// hand-assembled pairs may not, so the encoder normalizes rather than
/// trusts.
pub fn sort_conjugates(pair: &StatePair, site: usize) -> (&MoleculeRecord, &MoleculeRecord) {
    let protonated_count = pair.protonated.graph.total_hydrogens(site).unwrap_or(0);
    let deprotonated_count = pair.deprotonated.graph.total_hydrogens(site).unwrap_or(0);
    if deprotonated_count > protonated_count {
        (&pair.deprotonated, &pair.protonated)
    } else {
        (&pair.protonated, &pair.deprotonated)
    }
}

fn encode_graph(
    record: &MoleculeRecord,
    reaction_center: usize,
    selection: &FeatureSelection,
) -> EncodedGraph {
    let graph = &record.graph;

    let node_features = (0..graph.atom_count())
        .map(|index| {
            let mut row = Vec::with_capacity(selection.node_width());
            for feature in &selection.node {
                feature.encode(graph, index, reaction_center, &mut row);
            }
            row
        })
        .collect();

    let mut edge_index = Vec::with_capacity(graph.bonds().len() * 2);
    let mut edge_features = Vec::with_capacity(graph.bonds().len() * 2);
    for bond in graph.bonds() {
        let mut row = Vec::with_capacity(selection.edge_width());
        for feature in &selection.edge {
            feature.encode(graph, bond, &mut row);
        }
        edge_index.push((bond.atom1, bond.atom2));
        edge_features.push(row.clone());
        edge_index.push((bond.atom2, bond.atom1));
        edge_features.push(row);
    }

    EncodedGraph {
        node_features,
        edge_index,
        edge_features,
    }
}

fn required_annotation<'a>(
    record: &'a MoleculeRecord,
    key: &'static str,
    accession: &str,
    pair_index: usize,
) -> Result<&'a str, EncodingError> {
    record
        .annotation(key)
        .ok_or_else(|| EncodingError::MissingAnnotation {
            accession: accession.to_string(),
            pair_index,
            key,
        })
}

/// Encodes one conjugate pair into a [`PairedGraph`].
///
/// Upholds the core-to-encoder contract: the pKa annotation must parse as a
/// number and the site atom index must be consistent between both members
/// and in bounds for both graphs; violations surface as errors instead of
/// silently dropped samples.
pub fn encode_pair(
    pair: &StatePair,
    pair_index: usize,
    selection: &FeatureSelection,
) -> Result<PairedGraph, EncodingError> {
    let accession = required_annotation(&pair.protonated, KEY_ACCESSION, "?", pair_index)?
        .to_string();

    let pka_text = required_annotation(&pair.protonated, KEY_PKA, &accession, pair_index)?;
    let reference_pka: f64 = pka_text
        .trim()
        .parse()
        .map_err(|_| EncodingError::UnparseablePka {
            accession: accession.clone(),
            pair_index,
            value: pka_text.to_string(),
        })?;

    let site_protonated: usize =
        required_annotation(&pair.protonated, KEY_SITE_ATOM, &accession, pair_index)?
            .parse()
            .map_err(|_| EncodingError::MissingAnnotation {
                accession: accession.clone(),
                pair_index,
                key: KEY_SITE_ATOM,
            })?;
    let site_deprotonated: usize =
        required_annotation(&pair.deprotonated, KEY_SITE_ATOM, &accession, pair_index)?
            .parse()
            .map_err(|_| EncodingError::MissingAnnotation {
                accession: accession.clone(),
                pair_index,
                key: KEY_SITE_ATOM,
            })?;
    if site_protonated != site_deprotonated {
        return Err(EncodingError::InconsistentSite {
            accession,
            pair_index,
            protonated: site_protonated,
            deprotonated: site_deprotonated,
        });
    }
    let site = site_protonated;

    for member in [&pair.protonated, &pair.deprotonated] {
        if site >= member.graph.atom_count() {
            return Err(EncodingError::SiteOutOfBounds {
                accession,
                pair_index,
                site,
                atom_count: member.graph.atom_count(),
            });
        }
    }

    let (protonated, deprotonated) = sort_conjugates(pair, site);

    let internal_id = |member: &MoleculeRecord| -> Result<u64, EncodingError> {
        required_annotation(member, KEY_INTERNAL_ID, &accession, pair_index)?
            .parse()
            .map_err(|_| EncodingError::MissingAnnotation {
                accession: accession.clone(),
                pair_index,
                key: KEY_INTERNAL_ID,
            })
    };
    let internal_ids = (internal_id(protonated)?, internal_id(deprotonated)?);

    let smiles_protonated =
        required_annotation(protonated, KEY_SMILES, &accession, pair_index)?.to_string();
    let smiles_deprotonated =
        required_annotation(deprotonated, KEY_SMILES, &accession, pair_index)?.to_string();

    Ok(PairedGraph {
        protonated: encode_graph(protonated, site, selection),
        deprotonated: encode_graph(deprotonated, site, selection),
        reference_pka: reference_pka as f32,
        internal_ids,
        smiles_protonated,
        smiles_deprotonated,
        accession,
        reaction_center: site,
    })
}

/// Encodes every pair of one per-molecule enumeration record.
pub fn encode_record(
    record: &EnumerationRecord,
    selection: &FeatureSelection,
) -> Result<Vec<PairedGraph>, EncodingError> {
    record
        .pairs
        .iter()
        .enumerate()
        .map(|(pair_index, pair)| encode_pair(pair, pair_index, selection))
        .collect()
}
