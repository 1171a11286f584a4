use crate::core::models::record::MoleculeRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Run-scoped counters owned by the top-level driver.
///
/// The sequence counter and the skip tally are threaded through every
/// classifier and generator call by mutable borrow; there is no process-wide
/// global. Sequence ids increase monotonically across both polarity branches
/// and across all molecules of a run, which keeps identifier assignment
/// deterministic and the pipeline partitionable by counter range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunCounters {
    last_sequence_id: u64,
    skipped: usize,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the next internal sequence id. Ids start at 1 and never repeat.
    pub fn next_sequence_id(&mut self) -> u64 {
        self.last_sequence_id += 1;
        self.last_sequence_id
    }

    /// The most recently drawn sequence id (0 before the first draw).
    pub fn last_sequence_id(&self) -> u64 {
        self.last_sequence_id
    }

    /// Counts one skipped molecule or skipped site.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// The caller-owned output accumulators both generator branches append to.
///
/// Acid-branch entries land before base-branch entries; that insertion order
/// is part of the output contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateAccumulators {
    /// One pKa per generated pair.
    pub pka_values: Vec<f64>,
    /// One `(conjugate, parent)` SMILES tuple per generated pair.
    pub smiles: Vec<(String, String)>,
    /// Two sequence ids per generated pair, in assignment order.
    pub sequence_ids: Vec<u64>,
}

impl StateAccumulators {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A matched conjugate pair for one titratable site.
///
/// Invariant: both members carry identical pKa annotation and identical
/// chemical identifier. The `protonated` member holds the higher total
/// hydrogen count at the site atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePair {
    pub protonated: MoleculeRecord,
    pub deprotonated: MoleculeRecord,
}

/// Everything enumerated for one input molecule, keyed by its chemical
/// identifier in the run's output mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumerationRecord {
    pub pairs: Vec<StatePair>,
    pub pka_values: Vec<f64>,
    pub smiles: Vec<(String, String)>,
    pub sequence_ids: Vec<u64>,
}

/// The run's final output: chemical identifier to enumeration record.
///
/// A `BTreeMap` keeps serialization order deterministic across runs.
pub type EnumerationOutput = BTreeMap<String, EnumerationRecord>;
