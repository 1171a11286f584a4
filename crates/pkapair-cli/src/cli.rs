use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "pkapair CLI - Builds labeled datasets of molecular protonation-state pairs for training pKa prediction models.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel encoding.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enumerate protonated/deprotonated conjugate pairs for every predicted
    /// titratable site of an SDF input.
    Split(SplitArgs),
    /// Convert an enumeration output into feature-annotated paired graphs.
    Encode(EncodeArgs),
}

/// Arguments for the `split` subcommand.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Path to the input structure file (.sdf or gzip-compressed .sdf.gz).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output enumeration mapping (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to an enumeration configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the reference pH from the config file.
    #[arg(long, value_name = "FLOAT")]
    pub reference_ph: Option<f64>,

    /// Override the lower pKa validity bound (exclusive) from the config file.
    #[arg(long, value_name = "FLOAT")]
    pub lower_pka_limit: Option<f64>,

    /// Override the upper pKa validity bound (exclusive) from the config file.
    #[arg(long, value_name = "FLOAT")]
    pub upper_pka_limit: Option<f64>,

    /// Also write a per-state summary table (CSV) for inspection.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,
}

/// Arguments for the `encode` subcommand.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Path to the enumeration mapping produced by `split` (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the encoded paired-graph list (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Node features to encode (defaults to the full registry).
    /// Example: --node-features element,formal_charge,reaction_center
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub node_features: Option<Vec<String>>,

    /// Edge features to encode (defaults to the full registry).
    /// Example: --edge-features bond_order,rotatable
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub edge_features: Option<Vec<String>>,
}
