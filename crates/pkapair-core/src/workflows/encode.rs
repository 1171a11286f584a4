use crate::encoding::EncodingError;
use crate::encoding::features::FeatureSelection;
use crate::encoding::pair::{PairedGraph, encode_record};
use crate::engine::progress::{ProgressEvent, ProgressReporter};
use crate::engine::state::EnumerationOutput;
use rayon::prelude::*;
use tracing::{info, instrument};

/// Encodes a finished enumeration output into training-ready paired graphs.
///
/// Per-molecule records are independent, so encoding fans out over the
/// rayon worker pool; the flattened result preserves the deterministic
/// iteration order of the output mapping. The enumeration itself stays
/// sequential (it threads run-scoped counters), only this boundary step is
/// parallel.
///
/// # Errors
///
/// Returns [`EncodingError`] when a pair violates the core-to-encoder
/// contract (missing/unparseable pKa, inconsistent or out-of-bounds site).
#[instrument(skip_all, name = "encoding_workflow")]
pub fn run(
    output: &EnumerationOutput,
    selection: &FeatureSelection,
    reporter: &ProgressReporter,
) -> Result<Vec<PairedGraph>, EncodingError> {
    reporter.report(ProgressEvent::PhaseStarted {
        name: "Paired-Graph Encoding",
    });
    info!(
        molecules = output.len(),
        node_width = selection.node_width(),
        edge_width = selection.edge_width(),
        "Encoding enumeration records."
    );

    let records: Vec<_> = output.values().collect();
    let encoded: Result<Vec<Vec<PairedGraph>>, EncodingError> = records
        .par_iter()
        .map(|record| encode_record(record, selection))
        .collect();
    let pairs: Vec<PairedGraph> = encoded?.into_iter().flatten().collect();

    reporter.report(ProgressEvent::Message(format!(
        "Encoded {} paired graphs from {} molecules.",
        pairs.len(),
        output.len()
    )));
    reporter.report(ProgressEvent::PhaseFinished);
    info!(pairs = pairs.len(), "Encoding complete.");
    Ok(pairs)
}
