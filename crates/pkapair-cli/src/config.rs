use crate::cli::SplitArgs;
use crate::error::Result;
use pkapair::engine::config::{EnumerationConfig, EnumerationConfigBuilder};
use tracing::debug;

/// Resolves the effective enumeration configuration for a `split` run.
///
/// Precedence, lowest to highest: built-in defaults, the TOML configuration
/// file, individual command-line overrides. The merged result goes through
/// the builder so the final window is validated no matter where its values
/// came from.
pub fn resolve_enumeration_config(args: &SplitArgs) -> Result<EnumerationConfig> {
    let base = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "Loading enumeration configuration file");
            EnumerationConfig::from_toml_path(path)?
        }
        None => EnumerationConfig::default(),
    };

    let config = EnumerationConfigBuilder::new()
        .reference_ph(args.reference_ph.unwrap_or(base.reference_ph))
        .lower_pka_limit(args.lower_pka_limit.unwrap_or(base.lower_pka_limit))
        .upper_pka_limit(args.upper_pka_limit.unwrap_or(base.upper_pka_limit))
        .build()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn args(config: Option<PathBuf>) -> SplitArgs {
        SplitArgs {
            input: PathBuf::from("in.sdf"),
            output: PathBuf::from("out.json"),
            config,
            reference_ph: None,
            lower_pka_limit: None,
            upper_pka_limit: None,
            summary: None,
        }
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = resolve_enumeration_config(&args(None)).unwrap();
        assert_eq!(config, EnumerationConfig::default());
    }

    #[test]
    fn config_file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lower_pka_limit = 0.5\nupper_pka_limit = 13.5").unwrap();

        let config =
            resolve_enumeration_config(&args(Some(file.path().to_path_buf()))).unwrap();
        assert_eq!(config.lower_pka_limit, 0.5);
        assert_eq!(config.upper_pka_limit, 13.5);
        assert_eq!(config.reference_ph, 7.4);
    }

    #[test]
    fn cli_flags_override_the_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "upper_pka_limit = 13.5").unwrap();

        let mut split_args = args(Some(file.path().to_path_buf()));
        split_args.upper_pka_limit = Some(12.0);

        let config = resolve_enumeration_config(&split_args).unwrap();
        assert_eq!(config.upper_pka_limit, 12.0);
    }

    #[test]
    fn invalid_merged_windows_are_rejected() {
        let mut split_args = args(None);
        split_args.lower_pka_limit = Some(20.0);

        assert!(resolve_enumeration_config(&split_args).is_err());
    }
}
