use crate::core::io::sdf::SdfError;
use crate::core::models::record::MoleculeRecord;
use crate::engine::config::EnumerationConfig;
use crate::engine::error::EnumerationError;
use crate::engine::generator::{enumerate_acid_states, enumerate_base_states};
use crate::engine::progress::{ProgressEvent, ProgressReporter};
use crate::engine::site::{classify_sites, extract_site_predictions};
use crate::engine::state::{EnumerationOutput, RunCounters, StateAccumulators};
use crate::engine::validator::validate_and_record;
use tracing::{debug, info, instrument, warn};

/// End-of-run totals and the output mapping of one enumeration run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumerationSummary {
    /// Chemical identifier to per-molecule enumeration record.
    pub records: EnumerationOutput,
    /// Input records that parsed into molecules.
    pub molecules_read: usize,
    /// Input records the reader could not parse (logged and dropped).
    pub molecules_unreadable: usize,
    /// Skipped molecules plus skipped sites, the run-level skip tally.
    pub skipped: usize,
    /// The highest internal sequence id assigned during the run.
    pub last_sequence_id: u64,
}

/// Runs the protonation-state enumeration over a stream of input records.
///
/// Implements the per-molecule state machine: `received ->
/// annotation-parsed (skip if absent) -> classified -> acid-generated ->
/// base-generated -> validated -> recorded`. Molecules are processed one at
/// a time, single-threaded, with the sequence counter and skip tally
/// threaded through [`RunCounters`]; identifier assignment is therefore
/// deterministic and reproducible for a given input.
///
/// Recoverable conditions (unreadable record, missing or malformed
/// prediction annotations, untransformable sites) are counted and skipped.
/// Consistency violations abort the run with the offending molecule's full
/// diagnostic context.
///
/// # Errors
///
/// Returns [`EnumerationError`] on the fatal count, pKa, or duplicate
/// identifier violations.
#[instrument(skip_all, name = "enumeration_workflow")]
pub fn run<I>(
    records: I,
    config: &EnumerationConfig,
    reporter: &ProgressReporter,
) -> Result<EnumerationSummary, EnumerationError>
where
    I: IntoIterator<Item = Result<MoleculeRecord, SdfError>>,
{
    info!(
        reference_ph = config.reference_ph,
        lower_pka_limit = config.lower_pka_limit,
        upper_pka_limit = config.upper_pka_limit,
        "Starting protonation-state enumeration."
    );
    reporter.report(ProgressEvent::PhaseStarted {
        name: "State Enumeration",
    });

    let mut counters = RunCounters::new();
    let mut output = EnumerationOutput::new();
    let mut molecules_read = 0;
    let mut molecules_unreadable = 0;

    for (ordinal, item) in records.into_iter().enumerate() {
        let mut record = match item {
            Ok(record) => record,
            Err(error) => {
                warn!(ordinal, %error, "Skipping unreadable input record");
                molecules_unreadable += 1;
                reporter.report(ProgressEvent::MoleculeProcessed { ordinal });
                continue;
            }
        };
        molecules_read += 1;

        let predictions = match extract_site_predictions(&record, ordinal) {
            Ok(predictions) => predictions,
            Err(error) => {
                warn!(ordinal, %error, "Skipping molecule with malformed prediction annotations");
                counters.record_skip();
                reporter.report(ProgressEvent::MoleculeProcessed { ordinal });
                continue;
            }
        };
        if predictions.is_empty() {
            debug!(ordinal, "Skipping molecule without pKa predictions");
            counters.record_skip();
            reporter.report(ProgressEvent::MoleculeProcessed { ordinal });
            continue;
        }

        let classification = classify_sites(&predictions, config, ordinal)?;

        // From here on the record is the reference state at the working pH;
        // raw predictor properties must not leak into generated states.
        record.clear_annotations();

        let mut accumulators = StateAccumulators::new();
        let (acid_pairs, acid_skips) = enumerate_acid_states(
            &classification.acidic,
            ordinal,
            &record,
            &mut counters,
            &mut accumulators,
        );
        let (base_pairs, base_skips) = enumerate_base_states(
            &classification.basic,
            ordinal,
            &record,
            &mut counters,
            &mut accumulators,
        );

        let mut combined = acid_pairs;
        combined.extend(base_pairs);
        let recorded = validate_and_record(
            ordinal,
            combined,
            &classification,
            acid_skips,
            base_skips,
            accumulators,
            &mut output,
        )?;
        if recorded {
            debug!(ordinal, "Recorded enumeration result");
        }
        reporter.report(ProgressEvent::MoleculeProcessed { ordinal });
    }

    reporter.report(ProgressEvent::PhaseFinished);
    info!(
        molecules_read,
        molecules_unreadable,
        skipped = counters.skipped(),
        recorded = output.len(),
        "Finished splitting molecules."
    );

    Ok(EnumerationSummary {
        records: output,
        molecules_read,
        molecules_unreadable,
        skipped: counters.skipped(),
        last_sequence_id: counters.last_sequence_id(),
    })
}
