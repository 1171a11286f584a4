use crate::cli::EncodeArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use pkapair::encoding::features::{EdgeFeature, FeatureSelection, NodeFeature};
use pkapair::engine::progress::ProgressReporter;
use pkapair::engine::state::EnumerationOutput;
use pkapair::workflows::encode;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use tracing::info;

fn resolve_feature_selection(args: &EncodeArgs) -> Result<FeatureSelection> {
    let node: Vec<String> = args.node_features.clone().unwrap_or_else(|| {
        NodeFeature::ALL
            .iter()
            .map(|feature| feature.name().to_string())
            .collect()
    });
    let edge: Vec<String> = args.edge_features.clone().unwrap_or_else(|| {
        EdgeFeature::ALL
            .iter()
            .map(|feature| feature.name().to_string())
            .collect()
    });
    Ok(FeatureSelection::from_names(&node, &edge)?)
}

pub fn run(args: EncodeArgs) -> Result<()> {
    let selection = resolve_feature_selection(&args)?;
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        node_width = selection.node_width(),
        edge_width = selection.edge_width(),
        "Starting 'encode' run."
    );

    let file = File::open(&args.input)?;
    let mapping: EnumerationOutput = serde_json::from_reader(BufReader::new(file))?;
    println!("Loaded {} enumeration records.", mapping.len());

    let handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(handler.callback());
    let pairs = encode::run(&mapping, &selection, &reporter)?;

    let file = File::create(&args.output)?;
    serde_json::to_writer(BufWriter::new(file), &pairs)?;

    println!(
        "Paired graphs of {} molecules successfully saved ({} samples).",
        mapping.len(),
        pairs.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkapair::encoding::pair::PairedGraph;
    use std::path::PathBuf;

    fn encode_args(dir: &tempfile::TempDir, mapping: &EnumerationOutput) -> EncodeArgs {
        let input = dir.path().join("mapping.json");
        let file = File::create(&input).unwrap();
        serde_json::to_writer(file, mapping).unwrap();

        EncodeArgs {
            input,
            output: dir.path().join("pairs.json"),
            node_features: None,
            edge_features: None,
        }
    }

    fn sample_mapping() -> EnumerationOutput {
        use nalgebra::Point3;
        use pkapair::core::models::atom::Atom;
        use pkapair::core::models::bond::BondOrder;
        use pkapair::core::models::element::Element;
        use pkapair::core::models::molecule::MoleculeGraph;
        use pkapair::core::models::record::MoleculeRecord;
        use pkapair::engine::config::EnumerationConfig;
        use pkapair::engine::progress::ProgressReporter;
        use pkapair::workflows::enumerate;

        let mut graph = MoleculeGraph::new();
        let c = graph.add_atom({
            let mut a = Atom::new(Element::C, Point3::origin());
            a.implicit_hydrogens = 3;
            a
        });
        let o = graph.add_atom({
            let mut a = Atom::new(Element::O, Point3::origin());
            a.implicit_hydrogens = 1;
            a
        });
        graph.add_bond(c, o, BondOrder::Single).unwrap();

        let mut record = MoleculeRecord::new(graph);
        record.set_annotation("chembl_id", "CHEMBL14688");
        record.set_annotation("r_epik_pKa_1", "15.3");
        record.set_annotation("i_epik_pKa_atom_1", "2");

        enumerate::run(
            vec![Ok(record)],
            &EnumerationConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap()
        .records
    }

    #[test]
    fn encode_round_trips_through_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let mapping = sample_mapping();
        let args = encode_args(&dir, &mapping);
        let output_path = args.output.clone();

        run(args).unwrap();

        let text = std::fs::read_to_string(output_path).unwrap();
        let pairs: Vec<PairedGraph> = serde_json::from_str(&text).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].accession, "CHEMBL14688");
        assert_eq!(pairs[0].reference_pka, 15.3);
    }

    #[test]
    fn feature_subsets_narrow_the_matrices() {
        let dir = tempfile::tempdir().unwrap();
        let mapping = sample_mapping();
        let mut args = encode_args(&dir, &mapping);
        args.node_features = Some(vec!["formal_charge".to_string()]);
        args.edge_features = Some(vec!["bond_order".to_string()]);
        let output_path = args.output.clone();

        run(args).unwrap();

        let text = std::fs::read_to_string(output_path).unwrap();
        let pairs: Vec<PairedGraph> = serde_json::from_str(&text).unwrap();
        assert_eq!(pairs[0].protonated.node_features[0].len(), 1);
        assert_eq!(pairs[0].protonated.edge_features[0].len(), 4);
    }

    #[test]
    fn unknown_feature_names_fail_before_any_io() {
        let args = EncodeArgs {
            input: PathBuf::from("never-read.json"),
            output: PathBuf::from("never-written.json"),
            node_features: Some(vec!["chirality".to_string()]),
            edge_features: None,
        };
        assert!(run(args).is_err());
    }
}
