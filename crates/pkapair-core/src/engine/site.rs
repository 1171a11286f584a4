use super::config::EnumerationConfig;
use super::error::EnumerationError;
use crate::core::models::record::MoleculeRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Property key prefix of the predictor's pKa values (`r_epik_pKa_<n>`).
pub const PREDICTOR_PKA_PREFIX: &str = "r_epik_pKa_";
/// Property key prefix of the predictor's 1-based site atoms
/// (`i_epik_pKa_atom_<n>`).
pub const PREDICTOR_ATOM_PREFIX: &str = "i_epik_pKa_atom_";
/// Property key carrying the database accession of the source molecule.
pub const PREDICTOR_ACCESSION_KEY: &str = "chembl_id";
/// Property key of the single-site input variant: the pKa value.
pub const SINGLE_SITE_PKA_KEY: &str = "pKa";
/// Property key of the single-site input variant: the 0-based site atom.
pub const SINGLE_SITE_ATOM_KEY: &str = "marvin_atom";

/// One titratable-site prediction, immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePrediction {
    /// The predicted pKa value of the site.
    pub pka_value: f64,
    /// 0-based index of the site atom in the parent molecule.
    pub atom_index: usize,
    /// Stable external identifier of the source molecule.
    pub source_id: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum SiteParseError {
    #[error("Annotation '{key}' has unparseable value '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Prediction {ordinal} is missing annotation '{key}'")]
    MissingAnnotation { ordinal: usize, key: String },

    #[error("Prediction {ordinal} references 1-based atom index 0")]
    ZeroAtomIndex { ordinal: usize },
}

fn parse_annotation<T: std::str::FromStr>(
    record: &MoleculeRecord,
    key: &str,
    ordinal: usize,
) -> Result<T, SiteParseError> {
    let value = record
        .annotation(key)
        .ok_or_else(|| SiteParseError::MissingAnnotation {
            ordinal,
            key: key.to_string(),
        })?;
    value.trim().parse().map_err(|_| SiteParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Extracts the site predictions annotated on an input record.
///
/// Two historical property conventions are supported: the predictor
/// convention (`r_epik_pKa_<n>` / `i_epik_pKa_atom_<n>` with 1-based atom
/// indices, accession under `chembl_id`) and the single-site convention
/// (`pKa` / `marvin_atom` with a 0-based index, accession synthesized from
/// the molecule ordinal). An empty result means "no prediction available";
/// the caller skips and counts the molecule.
///
/// # Errors
///
/// Returns an error when prediction annotations are present but malformed;
/// the caller treats this the same as a missing prediction (skip, count).
pub fn extract_site_predictions(
    record: &MoleculeRecord,
    molecule_ordinal: usize,
) -> Result<Vec<SitePrediction>, SiteParseError> {
    let predicted_sites = record
        .annotations()
        .keys()
        .filter(|key| key.starts_with(PREDICTOR_PKA_PREFIX))
        .count();

    if predicted_sites > 0 {
        let mut predictions = Vec::with_capacity(predicted_sites);
        for ordinal in 1..=predicted_sites {
            let pka_value: f64 = parse_annotation(
                record,
                &format!("{}{}", PREDICTOR_PKA_PREFIX, ordinal),
                ordinal,
            )?;
            let serial: usize = parse_annotation(
                record,
                &format!("{}{}", PREDICTOR_ATOM_PREFIX, ordinal),
                ordinal,
            )?;
            if serial == 0 {
                return Err(SiteParseError::ZeroAtomIndex { ordinal });
            }
            let source_id: String =
                parse_annotation(record, PREDICTOR_ACCESSION_KEY, ordinal)?;
            predictions.push(SitePrediction {
                pka_value,
                atom_index: serial - 1,
                source_id,
            });
        }
        return Ok(predictions);
    }

    if record.annotation(SINGLE_SITE_PKA_KEY).is_some() {
        let pka_value: f64 = parse_annotation(record, SINGLE_SITE_PKA_KEY, 1)?;
        let atom_index: usize = parse_annotation(record, SINGLE_SITE_ATOM_KEY, 1)?;
        return Ok(vec![SitePrediction {
            pka_value,
            atom_index,
            source_id: format!("mol{}", molecule_ordinal),
        }]);
    }

    Ok(Vec::new())
}

/// The acid/base partition of one molecule's site predictions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteClassification {
    /// Sites with pKa at or below the reference pH (inside the window).
    pub acidic: Vec<SitePrediction>,
    /// Sites with pKa above the reference pH (inside the window).
    pub basic: Vec<SitePrediction>,
}

fn is_acidic(prediction: &SitePrediction, config: &EnumerationConfig) -> bool {
    prediction.pka_value <= config.reference_ph && prediction.pka_value > config.lower_pka_limit
}

fn is_basic(prediction: &SitePrediction, config: &EnumerationConfig) -> bool {
    prediction.pka_value > config.reference_ph && prediction.pka_value < config.upper_pka_limit
}

/// Partitions site predictions into acidic and basic subsets.
///
/// Predictions outside the open validity window are dropped silently as
/// predictor noise. A pKa exactly equal to the reference pH always lands in
/// the acidic subset, never both. The partition sizes are re-derived by an
/// independent recount; a disagreement would mean the partition predicates
/// double-counted a boundary value and is fatal.
pub fn classify_sites(
    predictions: &[SitePrediction],
    config: &EnumerationConfig,
    molecule_index: usize,
) -> Result<SiteClassification, EnumerationError> {
    let recounted_acids = predictions
        .iter()
        .filter(|p| is_acidic(p, config))
        .count();
    let recounted_bases = predictions.iter().filter(|p| is_basic(p, config)).count();

    let acidic: Vec<SitePrediction> = predictions
        .iter()
        .filter(|p| is_acidic(p, config))
        .cloned()
        .collect();
    let basic: Vec<SitePrediction> = predictions
        .iter()
        .filter(|p| is_basic(p, config))
        .cloned()
        .collect();

    if acidic.len() != recounted_acids
        || basic.len() != recounted_bases
        || acidic.len() + basic.len() > predictions.len()
    {
        return Err(EnumerationError::ClassificationMismatch {
            molecule_index,
            partitioned_acids: acidic.len(),
            partitioned_bases: basic.len(),
            recounted_acids,
            recounted_bases,
        });
    }

    Ok(SiteClassification { acidic, basic })
}
