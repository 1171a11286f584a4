use crate::cli::SplitArgs;
use crate::config::resolve_enumeration_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use pkapair::core::io::open_reader;
use pkapair::core::io::sdf::SdfReader;
use pkapair::engine::progress::ProgressReporter;
use pkapair::engine::state::EnumerationOutput;
use pkapair::workflows::enumerate;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

pub fn run(args: SplitArgs) -> Result<()> {
    let config = resolve_enumeration_config(&args)?;
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        reference_ph = config.reference_ph,
        "Starting 'split' run."
    );
    println!("pH splitting used: {}", config.reference_ph);

    let reader = open_reader(&args.input)?;
    let records = SdfReader::new(reader);

    let handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(handler.callback());
    let summary = enumerate::run(records, &config, &reporter)?;

    let file = File::create(&args.output)?;
    serde_json::to_writer(BufWriter::new(file), &summary.records)?;

    if let Some(path) = &args.summary {
        write_summary_table(path, &summary.records)?;
        info!(path = %path.display(), "Wrote per-state summary table.");
    }

    println!(
        "Finished splitting {} molecules ({} unreadable).",
        summary.molecules_read, summary.molecules_unreadable
    );
    println!("Skipped molecules/sites: {}", summary.skipped);
    println!(
        "Recorded {} molecules ({} states).",
        summary.records.len(),
        summary.last_sequence_id
    );
    Ok(())
}

/// One CSV row per generated state, for eyeballing a dataset without
/// deserializing the full mapping.
fn write_summary_table(path: &Path, records: &EnumerationOutput) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "accession",
        "internal_id",
        "pKa",
        "state",
        "site_atom",
        "smiles",
    ])?;

    for (accession, record) in records {
        for pair in &record.pairs {
            for (state, member) in [
                ("protonated", &pair.protonated),
                ("deprotonated", &pair.deprotonated),
            ] {
                writer.write_record([
                    accession.as_str(),
                    &member
                        .internal_id()
                        .map(|id| id.to_string())
                        .unwrap_or_default(),
                    member.pka_raw().unwrap_or_default(),
                    state,
                    &member
                        .site_atom()
                        .map(|site| site.to_string())
                        .unwrap_or_default(),
                    member.smiles().unwrap_or_default(),
                ])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const INPUT_SDF: &str = "\
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

    fn split_args(dir: &tempfile::TempDir) -> SplitArgs {
        let input = dir.path().join("input.sdf");
        let mut file = File::create(&input).unwrap();
        file.write_all(INPUT_SDF.as_bytes()).unwrap();

        SplitArgs {
            input,
            output: dir.path().join("output.json"),
            config: None,
            reference_ph: None,
            lower_pka_limit: None,
            upper_pka_limit: None,
            summary: None,
        }
    }

    #[test]
    fn split_writes_the_enumeration_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let args = split_args(&dir);
        let output_path = args.output.clone();

        run(args).unwrap();

        let text = std::fs::read_to_string(output_path).unwrap();
        let mapping: EnumerationOutput = serde_json::from_str(&text).unwrap();
        assert!(mapping.contains_key("CHEMBL539"));
        assert_eq!(mapping["CHEMBL539"].pairs.len(), 1);
        assert_eq!(mapping["CHEMBL539"].pka_values, vec![4.54]);
    }

    #[test]
    fn split_writes_the_optional_summary_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = split_args(&dir);
        let summary_path: PathBuf = dir.path().join("summary.csv");
        args.summary = Some(summary_path.clone());

        run(args).unwrap();

        let text = std::fs::read_to_string(summary_path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("accession,"));
        // One pair -> two state rows.
        assert_eq!(lines.count(), 2);
        assert!(text.contains("CHEMBL539"));
        assert!(text.contains("protonated"));
        assert!(text.contains("deprotonated"));
    }

    #[test]
    fn split_fails_cleanly_for_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = split_args(&dir);
        args.input = dir.path().join("absent.sdf");

        assert!(run(args).is_err());
    }
}
